use std::path::PathBuf;

/// A scratch file path under a fresh random name, following the teacher's
/// integration-test pattern of hex-encoded random names under a temp dir.
pub fn tmp_file(prefix: &str) -> PathBuf {
    let name = data_encoding::HEXLOWER.encode(&rand::random::<[u8; 16]>());
    let mut path = std::env::temp_dir();
    path.push(format!("{prefix}-{name}.bin"));
    path
}

pub fn write_i64_array(path: &std::path::Path, data: &[i64]) {
    use std::io::Write;
    let mut file = std::fs::File::create(path).unwrap();
    for x in data {
        file.write_all(&x.to_le_bytes()).unwrap();
    }
}

pub fn read_i64_array(path: &std::path::Path, len: usize) -> Vec<i64> {
    use std::io::Read;
    let mut file = std::fs::File::open(path).unwrap();
    let mut raw = vec![0u8; len * 8];
    file.read_exact(&mut raw).unwrap();
    raw.chunks_exact(8)
        .map(|c| i64::from_le_bytes(c.try_into().unwrap()))
        .collect()
}
