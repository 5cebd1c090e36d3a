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

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sicbs_core::{
    geometry::{Bounds, Point},
    time::TimePoint,
};
use sicbs_model::{
    agent::AgentSpec,
    env::{Environment, EnvironmentBuilder},
    id::AgentId,
    path::{Path, Waypoint},
};
use sicbs_solver::{config::GoalHoldPolicy, table::SafeIntervalTable};

// ---------- Scenario knobs ----------
const SEED: u64 = 0x5AFE_1A7E;
const SIDE: f64 = 50.0;
const AGENTS: usize = 40;
const LEGS_PER_PATH: usize = 12;
const QUERIES: usize = 2_000;
// ------------------------------------

fn random_point<R: Rng + ?Sized>(rng: &mut R) -> Point {
    Point::new(rng.random_range(1.0..SIDE - 1.0), rng.random_range(1.0..SIDE - 1.0))
}

fn environment(rng: &mut ChaCha8Rng) -> Environment {
    let spec = AgentSpec::default();
    let mut b = EnvironmentBuilder::new(Bounds::new(SIDE, SIDE));
    for _ in 0..AGENTS {
        let (s, g) = (random_point(rng), random_point(rng));
        b.add_agent(spec.place(s, g)).expect("agent in bounds");
    }
    b.build().expect("valid environment")
}

// Random polyline with unit-ish speed and occasional waits.
fn random_path(rng: &mut ChaCha8Rng) -> Path {
    let mut t = 0.0;
    let mut at = random_point(rng);
    let mut wps = vec![Waypoint::new(at, TimePoint::ZERO)];
    for _ in 0..LEGS_PER_PATH {
        let next = if rng.random_bool(0.2) {
            at
        } else {
            random_point(rng)
        };
        t += at.distance(next).max(1.0);
        wps.push(Waypoint::new(next, TimePoint::new(t)));
        at = next;
    }
    Path::new(wps).expect("increasing times")
}

fn populated_table(env: &Environment, rng: &mut ChaCha8Rng) -> SafeIntervalTable<'_> {
    let mut table = SafeIntervalTable::new(env, GoalHoldPolicy::HoldForever);
    for i in 1..env.num_agents() {
        table.insert_path(AgentId::new(i), random_path(rng));
    }
    table
}

fn bench_point_queries(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let env = environment(&mut rng);
    let table = populated_table(&env, &mut rng);
    c.bench_function("safe_intervals_point_queries", |bch| {
        bch.iter_batched(
            || ChaCha8Rng::seed_from_u64(SEED ^ 0xBEEF),
            |mut qrng| {
                let mut total = 0usize;
                for _ in 0..QUERIES {
                    let p = random_point(&mut qrng);
                    total += table.safe_intervals_for(AgentId::new(0), p).len();
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_edge_queries(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let env = environment(&mut rng);
    let table = populated_table(&env, &mut rng);
    c.bench_function("safe_departures_edge_queries", |bch| {
        bch.iter_batched(
            || ChaCha8Rng::seed_from_u64(SEED ^ 0xF00D),
            |mut qrng| {
                let mut total = 0usize;
                for _ in 0..QUERIES / 4 {
                    let from = random_point(&mut qrng);
                    let to = from.steer_towards(random_point(&mut qrng), 5.0);
                    total += table
                        .safe_departures(AgentId::new(0), from, to, 0.5, 1.0)
                        .len();
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(table, bench_point_queries, bench_edge_queries);
criterion_main!(table);
