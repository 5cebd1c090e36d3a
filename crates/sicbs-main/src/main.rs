// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::Serialize;
use sicbs_model::prelude::*;
use sicbs_solver::{
    config::ConflictSearchConfig,
    conflict::count_conflicts,
    search::{ConflictSearch, SearchStats},
};
use std::{
    fs::{self, File},
    io::BufWriter,
    time::Instant,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

const SOLUTION_FILE: &str = "solution.txt";
const REPORT_FILE: &str = "run_report.json";

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();
}

#[derive(Debug, Clone, Serialize)]
struct InstanceInfo {
    seed: u64,
    width: f64,
    height: f64,
    agent_count: usize,
    obstacle_count: usize,
    radius: f64,
    velocity: f64,
    max_expand_distance: f64,
    goal_threshold: f64,
    iterations: usize,
    goal_sample_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
struct AgentResult {
    id: usize,
    arrival: f64,
    length: f64,
    waypoints: usize,
}

#[derive(Debug, Clone, Serialize)]
struct RunReport {
    description: String,
    instance: InstanceInfo,
    objective: String,
    coordination: String,
    goal_hold: String,
    solved: bool,
    error: Option<String>,
    objective_value: Option<f64>,
    sum_of_costs: Option<f64>,
    makespan: Option<f64>,
    total_distance: Option<f64>,
    expansions: usize,
    generated: usize,
    pruned: usize,
    elapsed_ms: u128,
    agents: Vec<AgentResult>,
}

fn main() {
    enable_tracing();

    let gen_cfg = InstanceGenConfig::default();
    let spec = *gen_cfg.agent_spec();
    let instance = InstanceInfo {
        seed: gen_cfg.seed(),
        width: gen_cfg.bounds().width(),
        height: gen_cfg.bounds().height(),
        agent_count: gen_cfg.amount_agents(),
        obstacle_count: gen_cfg.obstacles().len(),
        radius: spec.radius,
        velocity: spec.velocity,
        max_expand_distance: spec.max_expand_distance,
        goal_threshold: spec.goal_threshold,
        iterations: spec.iterations,
        goal_sample_rate: spec.goal_sample_rate,
    };

    let mut generator: InstanceGenerator = gen_cfg.into();
    let env = generator.generate().expect("instance generation");
    info!(agents = env.num_agents(), bounds = %env.bounds(), "Instance generated");

    let config = ConflictSearchConfig::default();
    let search = ConflictSearch::new(&env, config.clone());
    let t0 = Instant::now();
    let result = search.solve();
    let elapsed = t0.elapsed();

    let mut report = RunReport {
        description: "Continuous-time multi-agent planning: SI-RRT with conflict search on a random instance.".into(),
        instance,
        objective: config.objective.to_string(),
        coordination: format!("{:?}", config.coordination),
        goal_hold: format!("{:?}", config.goal_hold),
        solved: false,
        error: None,
        objective_value: None,
        sum_of_costs: None,
        makespan: None,
        total_distance: None,
        expansions: 0,
        generated: 0,
        pruned: 0,
        elapsed_ms: elapsed.as_millis(),
        agents: Vec::new(),
    };

    match result {
        Ok(outcome) => {
            let SearchStats {
                expansions,
                generated,
                pruned,
            } = outcome.stats();
            let solution = outcome.solution();
            let stats = solution.stats();
            debug_assert_eq!(count_conflicts(&env, solution.paths(), config.goal_hold), 0);

            fs::write(SOLUTION_FILE, solution.to_string()).expect("write solution file");
            let reread: Solution = fs::read_to_string(SOLUTION_FILE)
                .expect("read solution file")
                .parse()
                .expect("parse solution file");
            assert_eq!(reread.num_agents(), solution.num_agents());
            info!(file = SOLUTION_FILE, %stats, "Solution written");

            report.solved = true;
            report.objective_value = Some(outcome.cost().value());
            report.sum_of_costs = Some(stats.sum_of_costs().value());
            report.makespan = Some(stats.makespan().value());
            report.total_distance = Some(stats.total_distance());
            report.expansions = expansions;
            report.generated = generated;
            report.pruned = pruned;
            report.agents = solution
                .iter()
                .map(|(id, path)| AgentResult {
                    id: id.value(),
                    arrival: path.arrival_time().value(),
                    length: path.length(),
                    waypoints: path.len(),
                })
                .collect();
        }
        Err(e) => {
            error!(error = %e, "No solution");
            report.error = Some(e.to_string());
        }
    }

    let file = File::create(REPORT_FILE).expect("create run report");
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).expect("write json report");

    println!();
    println!("=================================================================");
    println!("=========================== Run Done ============================");
    println!("=================================================================");
    println!();
    if report.solved {
        println!("Wrote: {} and {}", SOLUTION_FILE, REPORT_FILE);
    } else {
        println!("Wrote: {}", REPORT_FILE);
    }
}
