//  Copyright 2026 twoq Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! micro benchmark for twoq hit ratio under a zipf workload mixed with sequential scans

use std::sync::Arc;

use rand::{rngs::SmallRng, SeedableRng};
use rand_distr::{Distribution, Zipf};
use twoq_memory::{CachedObject, Order, Position, Region, Result, TwoQueueCache, Writer};

const ITEMS: usize = 10_000;
const ITERATIONS: usize = 2_000_000;
/// Every `SCAN_INTERVAL` requests, a sequential scan of `SCAN_LENGTH` cold positions is injected.
const SCAN_INTERVAL: usize = 50_000;
const SCAN_LENGTH: usize = 5_000;

/*
cargo bench --bench bench_hit_ratio

Prints one row per (zipf exponent, cache size ratio) with the hit ratio of a single fifo region, a single lru
region and the two-queue cache of the same budget.
*/

struct Block(Position);

impl CachedObject for Block {
    fn position(&self) -> Position {
        self.0
    }

    fn memory_cost(&self) -> usize {
        1
    }

    fn is_changed(&self) -> bool {
        false
    }
}

fn writer() -> Arc<dyn Writer<Block>> {
    Arc::new(|_: &Block| -> Result<()> { Ok(()) })
}

fn region_hit(mut region: Region<Block>, keys: &[Position]) -> f64 {
    let mut hit = 0;
    for &key in keys {
        if region.touch_and_get(key).is_some() {
            hit += 1;
        } else {
            region.insert(Block(key)).unwrap();
        }
    }
    hit as f64 / keys.len() as f64
}

fn two_queue_hit(mut cache: TwoQueueCache<Block>, keys: &[Position]) -> f64 {
    let mut hit = 0;
    for &key in keys {
        if cache.get(key).unwrap().is_some() {
            hit += 1;
        } else {
            cache.put(Block(key)).unwrap();
        }
    }
    hit as f64 / keys.len() as f64
}

fn workload(rng: &mut SmallRng, zipf_exp: f64) -> Vec<Position> {
    let zipf = Zipf::new(ITEMS as f64, zipf_exp).unwrap();
    let mut keys = Vec::with_capacity(ITERATIONS + ITERATIONS / SCAN_INTERVAL * SCAN_LENGTH);
    let mut scan_base = ITEMS as Position;
    for i in 0..ITERATIONS {
        if i > 0 && i % SCAN_INTERVAL == 0 {
            keys.extend(scan_base..scan_base + SCAN_LENGTH as Position);
            scan_base += SCAN_LENGTH as Position;
        }
        keys.push(zipf.sample(rng) as Position);
    }
    keys
}

fn bench_one(rng: &mut SmallRng, zipf_exp: f64, cache_size_percent: f64) {
    print!("{zipf_exp:6.2}, {cache_size_percent:6}{:6}", "");
    let budget = (ITEMS as f64 * cache_size_percent) as usize;
    let keys = workload(rng, zipf_exp);

    let fifo = region_hit(Region::new(Order::Fifo, budget, writer()), &keys);
    let lru = region_hit(Region::new(Order::Lru, budget, writer()), &keys);
    let two_queue = two_queue_hit(TwoQueueCache::with_budget(budget, writer()), &keys);

    print!("{:15.2}%", fifo * 100.0);
    print!("{:15.2}%", lru * 100.0);
    print!("{:15.2}%", two_queue * 100.0);
    println!();
}

fn main() {
    let mut rng = SmallRng::seed_from_u64(0);
    println!("{:30}{:16}{:16}{:16}", "zipf_exp, cache_size", "fifo", "lru", "2q");
    for zipf_exp in [0.9, 1.0, 1.05, 1.1, 1.5] {
        for cache_size_percent in [0.005, 0.01, 0.05, 0.1, 0.25] {
            bench_one(&mut rng, zipf_exp, cache_size_percent);
        }
    }
}
