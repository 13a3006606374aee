use std::cmp::Ordering;

/// A fixed-width, totally-ordered value stored as a packed byte sequence
/// on disk. Implemented for the integer and floating-point primitives;
/// floating-point ordering goes through `total_cmp` rather than
/// `PartialOrd` so that NaN still participates in a total order the
/// merge/heap/loser-tree code can rely on.
pub trait Element: Copy + Default + Send + Sync + std::fmt::Debug + 'static {
    /// Size in bytes of one encoded element.
    const SIZE: usize;

    fn from_le_bytes(bytes: &[u8]) -> Self;
    fn to_le_bytes_into(&self, bytes: &mut [u8]);
    fn key_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! impl_element_int {
    ($t:ty) => {
        impl Element for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            fn from_le_bytes(bytes: &[u8]) -> Self {
                let arr: [u8; std::mem::size_of::<$t>()] =
                    bytes.try_into().expect("element byte width mismatch");
                <$t>::from_le_bytes(arr)
            }

            fn to_le_bytes_into(&self, bytes: &mut [u8]) {
                bytes.copy_from_slice(&self.to_le_bytes());
            }

            fn key_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    };
}

macro_rules! impl_element_float {
    ($t:ty) => {
        impl Element for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            fn from_le_bytes(bytes: &[u8]) -> Self {
                let arr: [u8; std::mem::size_of::<$t>()] =
                    bytes.try_into().expect("element byte width mismatch");
                <$t>::from_le_bytes(arr)
            }

            fn to_le_bytes_into(&self, bytes: &mut [u8]) {
                bytes.copy_from_slice(&self.to_le_bytes());
            }

            fn key_cmp(&self, other: &Self) -> Ordering {
                self.total_cmp(other)
            }
        }
    };
}

impl_element_int!(i32);
impl_element_int!(i64);
impl_element_int!(u32);
impl_element_int!(u64);
impl_element_float!(f32);
impl_element_float!(f64);
