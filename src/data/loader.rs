use std::path::{Path, PathBuf};

use ndarray::{s, Array2};
use thiserror::Error;

use super::model::{Dataset, DatasetDescriptor, LoadedData, Partition};
use super::split::{train_test_split, SplitError, SplitOptions};

/// Where [`load_data`] looks when no path is given.
pub const DEFAULT_PATH: &str = "./data/iris.csv";

/// Printed when the requested file does not exist.
pub const NOT_FOUND_MESSAGE: &str =
    "This Dataset is currently not supported. Please download via external source";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("opening {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}, column {column}: '{value}' is not a number")]
    Parse {
        line: u64,
        column: usize,
        value: String,
    },
    #[error("line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("{} contains no rows", .0.display())]
    Empty(PathBuf),
    #[error("need at least one feature column and a label column, found {0} column(s)")]
    TooFewColumns(usize),
    #[error("assembling table: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("splitting dataset: {0}")]
    Split(#[from] SplitError),
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Everything a load call can be told.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub path: PathBuf,
    /// Partition into train and test sets.
    pub split: bool,
    /// Training fraction; `None` means [`super::split::DEFAULT_TRAIN_RATIO`].
    pub ratio: Option<f64>,
    pub seed: u64,
    pub descriptor: DatasetDescriptor,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            split: false,
            ratio: None,
            seed: 0,
            descriptor: DatasetDescriptor::iris(),
        }
    }
}

impl LoadOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn split(mut self, ratio: Option<f64>) -> Self {
        self.split = true;
        self.ratio = ratio;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn descriptor(mut self, descriptor: DatasetDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    fn split_options(&self) -> SplitOptions {
        SplitOptions {
            seed: self.seed,
            ..SplitOptions::with_ratio(self.ratio)
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load `path`, optionally splitting it into stratified train/test sets.
///
/// Returns `Ok(None)` after printing a notice when `path` does not exist.
/// Any other failure (unreadable file, malformed rows, bad ratio) is an error.
pub fn load_data(
    split: bool,
    ratio: Option<f64>,
    path: impl AsRef<Path>,
) -> Result<Option<LoadedData>, LoadError> {
    let options = LoadOptions {
        split,
        ratio,
        ..LoadOptions::new(path.as_ref())
    };
    load_with(&options)
}

/// [`load_data`] with every knob exposed.
pub fn load_with(options: &LoadOptions) -> Result<Option<LoadedData>, LoadError> {
    if !options.path.exists() {
        log::warn!("dataset not found at {}", options.path.display());
        println!("{NOT_FOUND_MESSAGE}");
        return Ok(None);
    }

    let Dataset { x, y } = load_dataset(&options.path)?;

    let partition = if options.split {
        let split = train_test_split(&x, &y, &options.split_options())?;
        Partition::Split {
            x_train: split.x_train,
            x_test: split.x_test,
            y_train: split.y_train,
            y_test: split.y_test,
        }
    } else {
        Partition::Full { x, y }
    };

    log::info!(
        "loaded {} ({})",
        options.path.display(),
        if options.split { "split" } else { "full" }
    );

    Ok(Some(LoadedData {
        partition,
        descriptor: options.descriptor.clone(),
    }))
}

/// Parse `path` and slice it into features (all but the last column) and
/// labels (the last column).
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let table = read_table(path)?;
    if table.nrows() == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    if table.ncols() < 2 {
        return Err(LoadError::TooFewColumns(table.ncols()));
    }

    let label_col = table.ncols() - 1;
    let x = table.slice(s![.., ..label_col]).to_owned();
    let y = table.column(label_col).to_owned();
    log::debug!("X shape {:?}, y shape {:?}", x.shape(), y.shape());
    Ok(Dataset { x, y })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Read a header-less, comma-delimited numeric file into a 2-D array.
///
/// Cells are trimmed; blank lines are skipped. Every row must have the same
/// number of columns as the first.
pub fn read_table(path: &Path) -> Result<Array2<f64>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut cells: Vec<f64> = Vec::new();
    let mut n_cols: Option<usize> = None;
    let mut n_rows = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(row_no as u64 + 1);

        let expected = *n_cols.get_or_insert(record.len());
        if record.len() != expected {
            return Err(LoadError::RaggedRow {
                line,
                expected,
                found: record.len(),
            });
        }

        for (column, tok) in record.iter().enumerate() {
            let value = tok.parse::<f64>().map_err(|_| LoadError::Parse {
                line,
                column,
                value: tok.to_string(),
            })?;
            cells.push(value);
        }
        n_rows += 1;
    }

    let shape = (n_rows, n_cols.unwrap_or(0));
    Ok(Array2::from_shape_vec(shape, cells)?)
}
