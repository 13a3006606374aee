//! Generates a shuffled array of `i64`s, sorts it with each strategy in
//! turn, and checks the result. Run with `cargo run --example sort_array`.

use array_ext_sort::{Sort, Strategy};
use rand::seq::SliceRandom;

fn main() -> Result<(), array_ext_sort::Error> {
    simple_logger::init_with_level(log::Level::Info).expect("logger already initialized");

    let tmp_dir = std::env::temp_dir();
    let mut rng = rand::thread_rng();
    let mut data: Vec<i64> = (0..200_000).collect();
    data.shuffle(&mut rng);

    let input_path = tmp_dir.join("sort_array-input.bin");
    write_array(&input_path, &data);

    for (name, strategy) in [
        ("quicksort", Strategy::Quicksort { heap_elements: 1 << 14 }),
        ("kway merge", Strategy::KWayMerge { heap_elements: 1 << 14 }),
        ("two-way merge", Strategy::TwoWayMerge { heap_elements: 1 << 14 }),
    ] {
        let output_path = tmp_dir.join(format!("sort_array-output-{}.bin", name.replace(' ', "-")));
        let report = Sort::<i64>::new(&input_path, &output_path)
            .with_buffer_elements(1 << 12)
            .with_strategy(strategy)
            .with_tmp_dir(&tmp_dir)
            .sort()?;
        log::info!("{name}: runs_formed={}, elements_written={}", report.runs_formed, report.elements_written);

        let sorted = read_array(&output_path, data.len());
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]), "{name} did not produce a sorted array");
        std::fs::remove_file(&output_path).unwrap();
    }

    std::fs::remove_file(&input_path).unwrap();
    Ok(())
}

fn write_array(path: &std::path::Path, data: &[i64]) {
    use std::io::Write;
    let mut file = std::fs::File::create(path).unwrap();
    for x in data {
        file.write_all(&x.to_le_bytes()).unwrap();
    }
}

fn read_array(path: &std::path::Path, len: usize) -> Vec<i64> {
    use std::io::Read;
    let mut file = std::fs::File::open(path).unwrap();
    let mut raw = vec![0u8; len * 8];
    file.read_exact(&mut raw).unwrap();
    raw.chunks_exact(8).map(|c| i64::from_le_bytes(c.try_into().unwrap())).collect()
}
