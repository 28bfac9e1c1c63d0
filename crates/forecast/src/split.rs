use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Split {
    pub fn gather<T: Clone>(indices: &[usize], values: &[T]) -> Vec<T> {
        indices.iter().map(|&i| values[i].clone()).collect()
    }
}

/// Shuffle `0..rows` with a seeded RNG and carve off `ceil(rows * test_percent / 100)`
/// indices as the test partition.
///
/// Returns `None` when either side would be empty. Identical inputs and seed
/// always produce the identical partition.
pub fn train_test_split(rows: usize, test_percent: u32, seed: u64) -> Option<Split> {
    let test_len = (rows * test_percent as usize).div_ceil(100);
    if test_len == 0 || test_len >= rows {
        return None;
    }

    let mut order: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(test_len);
    Some(Split { train, test: order })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn eighty_twenty_partition_sizes() {
        let s = train_test_split(10, 20, 42).unwrap();
        assert_eq!(s.test.len(), 2);
        assert_eq!(s.train.len(), 8);

        let s = train_test_split(7, 20, 42).unwrap();
        assert_eq!(s.test.len(), 2);
        assert_eq!(s.train.len(), 5);
    }

    #[test]
    fn too_few_rows_cannot_be_split() {
        assert!(train_test_split(0, 20, 42).is_none());
        assert!(train_test_split(1, 20, 42).is_none());
        assert!(train_test_split(2, 20, 42).is_some());
    }

    #[test]
    fn same_seed_gives_same_partition() {
        let a = train_test_split(50, 20, 1).unwrap();
        let b = train_test_split(50, 20, 1).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        /// Property: the partition covers every row exactly once and is reproducible.
        #[test]
        fn partition_is_complete_and_deterministic(rows in 2usize..200, seed in any::<u64>()) {
            let a = train_test_split(rows, 20, seed).unwrap();
            let b = train_test_split(rows, 20, seed).unwrap();
            prop_assert_eq!(&a, &b);

            let mut all: Vec<usize> = a.train.iter().chain(a.test.iter()).copied().collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..rows).collect::<Vec<_>>());
            prop_assert!(!a.train.is_empty());
            prop_assert!(!a.test.is_empty());
        }
    }
}
