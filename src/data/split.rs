use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// Training fraction used when a split is requested without a ratio.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.75;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    #[error("train ratio must lie strictly between 0 and 1, got {0}")]
    InvalidRatio(f64),
    #[error("feature matrix has {x_rows} rows but label vector has {y_len} entries")]
    LengthMismatch { x_rows: usize, y_len: usize },
    #[error("ratio {ratio} on {n_samples} samples leaves an empty train or test partition")]
    EmptyPartition { n_samples: usize, ratio: f64 },
    #[error("class {label} has only {count} member(s); stratification needs at least 2")]
    ClassTooSmall { label: f64, count: usize },
    #[error("{partition} partition of {size} rows cannot hold all {n_classes} classes")]
    PartitionTooSmall {
        partition: &'static str,
        size: usize,
        n_classes: usize,
    },
}

/// Parameters of a stratified split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOptions {
    /// Fraction of rows assigned to the training partition.
    pub train_ratio: f64,
    pub seed: u64,
    /// Shuffle rows inside each partition. When off, rows keep file order.
    pub shuffle: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            train_ratio: DEFAULT_TRAIN_RATIO,
            seed: 0,
            shuffle: true,
        }
    }
}

impl SplitOptions {
    /// Options for `ratio`, falling back to [`DEFAULT_TRAIN_RATIO`].
    pub fn with_ratio(ratio: Option<f64>) -> Self {
        Self {
            train_ratio: ratio.unwrap_or(DEFAULT_TRAIN_RATIO),
            ..Self::default()
        }
    }
}

/// The four arrays of a train/test partition plus the source row indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Partition `(x, y)` into train and test sets, stratified by label value.
///
/// `floor(train_ratio * n)` rows go to training, the rest to test. Each
/// class contributes to both partitions in proportion to its frequency.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    options: &SplitOptions,
) -> Result<Split, SplitError> {
    let ratio = options.train_ratio;
    if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
        return Err(SplitError::InvalidRatio(ratio));
    }
    if x.nrows() != y.len() {
        return Err(SplitError::LengthMismatch {
            x_rows: x.nrows(),
            y_len: y.len(),
        });
    }

    let n_samples = y.len();
    let n_train = (ratio * n_samples as f64).floor() as usize;
    let n_test = n_samples - n_train;
    if n_train == 0 || n_test == 0 {
        return Err(SplitError::EmptyPartition { n_samples, ratio });
    }

    let (classes, members) = group_by_label(y);
    for (label, rows) in classes.iter().zip(&members) {
        if rows.len() < 2 {
            return Err(SplitError::ClassTooSmall {
                label: *label,
                count: rows.len(),
            });
        }
    }
    for (partition, size) in [("train", n_train), ("test", n_test)] {
        if size < classes.len() {
            return Err(SplitError::PartitionTooSmall {
                partition,
                size,
                n_classes: classes.len(),
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let counts: Vec<usize> = members.iter().map(Vec::len).collect();
    let train_counts = approximate_mode(&counts, n_train, &mut rng);
    let remaining: Vec<usize> = counts
        .iter()
        .zip(&train_counts)
        .map(|(total, taken)| total - taken)
        .collect();
    let test_counts = approximate_mode(&remaining, n_test, &mut rng);

    let mut train_indices = Vec::with_capacity(n_train);
    let mut test_indices = Vec::with_capacity(n_test);
    for ((mut rows, n_tr), n_te) in members.into_iter().zip(train_counts).zip(test_counts) {
        if options.shuffle {
            rows.shuffle(&mut rng);
        }
        train_indices.extend_from_slice(&rows[..n_tr]);
        test_indices.extend_from_slice(&rows[n_tr..n_tr + n_te]);
    }

    if options.shuffle {
        train_indices.shuffle(&mut rng);
        test_indices.shuffle(&mut rng);
    } else {
        train_indices.sort_unstable();
        test_indices.sort_unstable();
    }

    log::debug!(
        "stratified split: {n_train} train / {n_test} test over {} classes",
        classes.len()
    );

    Ok(Split {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

/// Distinct label values in ascending order and the row indices of each.
fn group_by_label(y: &Array1<f64>) -> (Vec<f64>, Vec<Vec<usize>>) {
    let mut classes: Vec<f64> = y.iter().map(|&v| class_key(v)).collect();
    classes.sort_by(f64::total_cmp);
    classes.dedup_by(|a, b| a.total_cmp(b).is_eq());

    let mut members = vec![Vec::new(); classes.len()];
    for (row, &label) in y.iter().enumerate() {
        let label = class_key(label);
        if let Ok(class) = classes.binary_search_by(|c| c.total_cmp(&label)) {
            members[class].push(row);
        }
    }
    (classes, members)
}

/// `-0.0` and `0.0` are the same class.
fn class_key(label: f64) -> f64 {
    if label == 0.0 {
        0.0
    } else {
        label
    }
}

/// Spread `n_draws` over classes in proportion to `counts`.
///
/// Each class gets the floor of its share; the leftover draws go to the
/// classes with the largest fractional remainder, ties broken at random.
/// Never assigns a class more than its count.
fn approximate_mode(counts: &[usize], n_draws: usize, rng: &mut StdRng) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut allocated = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for &count in counts {
        let share = (count * n_draws) as f64 / total as f64;
        let floored = share.floor();
        allocated.push(floored as usize);
        remainders.push(share - floored);
    }

    let mut need = n_draws.saturating_sub(allocated.iter().sum());
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.shuffle(rng);
    order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]));
    for class in order {
        if need == 0 {
            break;
        }
        if allocated[class] < counts[class] {
            allocated[class] += 1;
            need -= 1;
        }
    }
    allocated
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    /// `per_class` rows for each of `n_classes` labels, features encode the row.
    fn balanced(n_classes: usize, per_class: usize) -> (Array2<f64>, Array1<f64>) {
        let n = n_classes * per_class;
        let x = Array::from_shape_fn((n, 2), |(r, c)| (r * 10 + c) as f64);
        let y = Array::from_shape_fn(n, |r| (r % n_classes) as f64);
        (x, y)
    }

    fn class_count(y: &Array1<f64>, label: f64) -> usize {
        y.iter().filter(|v| **v == label).count()
    }

    #[test]
    fn balanced_split_keeps_class_proportions() {
        let (x, y) = balanced(3, 10);
        let split = train_test_split(&x, &y, &SplitOptions::with_ratio(Some(0.7))).unwrap();

        assert_eq!(split.y_train.len(), 21);
        assert_eq!(split.y_test.len(), 9);
        for label in [0.0, 1.0, 2.0] {
            assert_eq!(class_count(&split.y_train, label), 7);
            assert_eq!(class_count(&split.y_test, label), 3);
        }
    }

    #[test]
    fn rows_stay_aligned_with_labels() {
        let (x, y) = balanced(3, 10);
        let split = train_test_split(&x, &y, &SplitOptions::default()).unwrap();

        for (i, &row) in split.train_indices.iter().enumerate() {
            assert_eq!(split.x_train.row(i), x.row(row));
            assert_eq!(split.y_train[i], y[row]);
        }
        for (i, &row) in split.test_indices.iter().enumerate() {
            assert_eq!(split.x_test.row(i), x.row(row));
            assert_eq!(split.y_test[i], y[row]);
        }
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let (x, y) = balanced(3, 10);
        let split = train_test_split(&x, &y, &SplitOptions::default()).unwrap();

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(&split.test_indices)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn missing_ratio_defaults_to_three_quarters() {
        let (x, y) = balanced(2, 20);
        let split = train_test_split(&x, &y, &SplitOptions::with_ratio(None)).unwrap();
        assert_eq!(split.y_train.len(), 30);
        assert_eq!(split.y_test.len(), 10);
    }

    #[test]
    fn same_seed_gives_same_partition() {
        let (x, y) = balanced(3, 10);
        let options = SplitOptions::with_ratio(Some(0.7));
        let a = train_test_split(&x, &y, &options).unwrap();
        let b = train_test_split(&x, &y, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unshuffled_split_keeps_file_order() {
        let (x, y) = balanced(3, 10);
        let options = SplitOptions {
            shuffle: false,
            ..SplitOptions::with_ratio(Some(0.7))
        };
        let split = train_test_split(&x, &y, &options).unwrap();
        assert!(split.train_indices.windows(2).all(|w| w[0] < w[1]));
        assert!(split.test_indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn uneven_classes_round_by_largest_remainder() {
        // 5 / 3 / 2 rows, half to training: shares 2.5 / 1.5 / 1.0
        let y = Array1::from(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0]);
        let x = Array2::zeros((10, 1));
        let split = train_test_split(&x, &y, &SplitOptions::with_ratio(Some(0.5))).unwrap();

        assert_eq!(split.y_train.len(), 5);
        assert_eq!(class_count(&split.y_train, 2.0), 1);
        let extra = class_count(&split.y_train, 0.0) + class_count(&split.y_train, 1.0);
        assert_eq!(extra, 4);
    }

    #[test]
    fn negative_zero_label_joins_zero_class() {
        let y = Array1::from(vec![0.0, -0.0, 1.0, 1.0, 0.0, 1.0]);
        let x = Array2::zeros((6, 2));
        let split = train_test_split(&x, &y, &SplitOptions::with_ratio(Some(0.5))).unwrap();

        assert_eq!(split.y_train.len(), 3);
        let zeros = split.y_train.iter().filter(|v| **v == 0.0).count();
        assert!(zeros == 1 || zeros == 2);
        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(&split.test_indices)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn rejects_ratios_outside_unit_interval() {
        let (x, y) = balanced(3, 10);
        for ratio in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let err = train_test_split(&x, &y, &SplitOptions::with_ratio(Some(ratio)));
            assert!(matches!(err, Err(SplitError::InvalidRatio(_))));
        }
    }

    #[test]
    fn rejects_singleton_class() {
        let y = Array1::from(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let x = Array2::zeros((7, 1));
        let err = train_test_split(&x, &y, &SplitOptions::default()).unwrap_err();
        assert_eq!(err, SplitError::ClassTooSmall { label: 2.0, count: 1 });
    }

    #[test]
    fn rejects_test_partition_smaller_than_class_count() {
        let (x, y) = balanced(3, 2);
        let err = train_test_split(&x, &y, &SplitOptions::with_ratio(Some(0.8))).unwrap_err();
        assert_eq!(
            err,
            SplitError::PartitionTooSmall {
                partition: "test",
                size: 2,
                n_classes: 3
            }
        );
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let x = Array2::zeros((4, 2));
        let y = Array1::zeros(3);
        let err = train_test_split(&x, &y, &SplitOptions::default()).unwrap_err();
        assert_eq!(err, SplitError::LengthMismatch { x_rows: 4, y_len: 3 });
    }
}
