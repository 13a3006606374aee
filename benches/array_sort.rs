//! Benchmarks for each sort strategy, scaled down from production array
//! sizes so the suite runs in CI time. Uses jemalloc as the global
//! allocator, the same choice the crate's own benches make for stable
//! allocation-heavy timing.

use array_ext_sort::{Sort, Strategy};
use benchmark_rs::stopwatch::StopWatch;
use rand::seq::SliceRandom;
use rayon::prelude::*;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const ARRAY_LEN: usize = 100_000;
const BUFFER_ELEMENTS: usize = 1 << 14;

fn shuffled_array(len: usize) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    let mut data: Vec<i64> = (0..len as i64).collect();
    data.shuffle(&mut rng);
    data
}

fn write_array(path: &std::path::Path, data: &[i64]) {
    use std::io::Write;
    let mut file = std::fs::File::create(path).unwrap();
    let bytes: Vec<u8> = data.par_iter().flat_map(|x| x.to_le_bytes()).collect();
    file.write_all(&bytes).unwrap();
}

fn bench_strategy(name: &str, strategy_for: impl Fn() -> Strategy) {
    let tmp_dir = std::env::temp_dir();
    let data = shuffled_array(ARRAY_LEN);
    let input_path = tmp_dir.join(format!("array-ext-sort-bench-{name}-input.bin"));
    let output_path = tmp_dir.join(format!("array-ext-sort-bench-{name}-output.bin"));
    write_array(&input_path, &data);

    let mut sw = StopWatch::new();
    sw.start();
    let report = Sort::<i64>::new(&input_path, &output_path)
        .with_buffer_elements(BUFFER_ELEMENTS)
        .with_strategy(strategy_for())
        .with_tmp_dir(&tmp_dir)
        .sort()
        .expect("sort should succeed");
    sw.stop();
    println!(
        "{name}: {} elements in {}, runs_formed={}",
        ARRAY_LEN,
        sw,
        report.runs_formed
    );

    std::fs::remove_file(&input_path).unwrap();
    std::fs::remove_file(&output_path).unwrap();
}

fn main() {
    bench_strategy("quicksort", || Strategy::Quicksort { heap_elements: BUFFER_ELEMENTS });
    bench_strategy("kway_merge", || Strategy::KWayMerge { heap_elements: BUFFER_ELEMENTS });
    bench_strategy("two_way_merge", || Strategy::TwoWayMerge { heap_elements: BUFFER_ELEMENTS });
}
