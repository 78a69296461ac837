use std::fmt;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Dataset – the parsed feature matrix and label vector
// ---------------------------------------------------------------------------

/// A parsed table sliced into features and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature matrix, shape `(n_samples, n_features)`.
    pub x: Array2<f64>,
    /// Label vector, shape `(n_samples,)`. Row-aligned with `x`.
    pub y: Array1<f64>,
}

impl Dataset {
    /// Number of samples (rows).
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

// ---------------------------------------------------------------------------
// DatasetDescriptor – display metadata attached to every result
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Class and feature display names attached to a loaded dataset.
///
/// These are not derived from the file; nothing checks that `features`
/// matches the parsed column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub class_names: Vec<String>,
    pub features: Vec<String>,
}

impl DatasetDescriptor {
    /// The three Iris species and its four measurements.
    pub fn iris() -> Self {
        Self {
            class_names: ["Iris-setosa", "Iris-versicolor", "Iris-virginica"]
                .map(String::from)
                .to_vec(),
            features: ["Sepal Length", "Sepal Width", "Petal Length", "Petal Width"]
                .map(String::from)
                .to_vec(),
        }
    }

    /// Read a descriptor from a JSON document:
    ///
    /// ```json
    /// { "class_names": ["a", "b"], "features": ["f0", "f1", "f2"] }
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self, DescriptorError> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for DatasetDescriptor {
    fn default() -> Self {
        Self::iris()
    }
}

// ---------------------------------------------------------------------------
// LoadedData – the result mapping
// ---------------------------------------------------------------------------

/// Feature/label payload of a [`LoadedData`], depending on split mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Partition {
    Full {
        x: Array2<f64>,
        y: Array1<f64>,
    },
    Split {
        x_train: Array2<f64>,
        x_test: Array2<f64>,
        y_train: Array1<f64>,
        y_test: Array1<f64>,
    },
}

/// The string-keyed result of a load.
///
/// Unsplit results carry `X`, `y`, `class_names`, `features`; split results
/// carry `X_train`, `X_test`, `y_train`, `y_test`, `class_names`, `features`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub partition: Partition,
    pub descriptor: DatasetDescriptor,
}

/// A borrowed value of the result mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Matrix(&'a Array2<f64>),
    Vector(&'a Array1<f64>),
    Names(&'a [String]),
}

impl Field<'_> {
    /// Shape of the value; name lists report their length.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Field::Matrix(m) => m.shape().to_vec(),
            Field::Vector(v) => vec![v.len()],
            Field::Names(n) => vec![n.len()],
        }
    }
}

const FULL_KEYS: [&str; 4] = ["X", "y", "class_names", "features"];
const SPLIT_KEYS: [&str; 6] = [
    "X_train",
    "X_test",
    "y_train",
    "y_test",
    "class_names",
    "features",
];

impl LoadedData {
    /// Keys present in this mapping, in insertion order.
    pub fn keys(&self) -> &'static [&'static str] {
        match self.partition {
            Partition::Full { .. } => &FULL_KEYS,
            Partition::Split { .. } => &SPLIT_KEYS,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys().iter().any(|k| *k == key)
    }

    /// Look a value up by key.
    pub fn get(&self, key: &str) -> Option<Field<'_>> {
        if !self.contains_key(key) {
            return None;
        }
        match key {
            "class_names" => return Some(Field::Names(&self.descriptor.class_names)),
            "features" => return Some(Field::Names(&self.descriptor.features)),
            _ => {}
        }
        match (&self.partition, key) {
            (Partition::Full { x, .. }, "X") => Some(Field::Matrix(x)),
            (Partition::Full { y, .. }, "y") => Some(Field::Vector(y)),
            (Partition::Split { x_train, .. }, "X_train") => Some(Field::Matrix(x_train)),
            (Partition::Split { x_test, .. }, "X_test") => Some(Field::Matrix(x_test)),
            (Partition::Split { y_train, .. }, "y_train") => Some(Field::Vector(y_train)),
            (Partition::Split { y_test, .. }, "y_test") => Some(Field::Vector(y_test)),
            _ => None,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.partition, Partition::Split { .. })
    }

    pub fn x(&self) -> Option<&Array2<f64>> {
        match &self.partition {
            Partition::Full { x, .. } => Some(x),
            Partition::Split { .. } => None,
        }
    }

    pub fn y(&self) -> Option<&Array1<f64>> {
        match &self.partition {
            Partition::Full { y, .. } => Some(y),
            Partition::Split { .. } => None,
        }
    }

    pub fn x_train(&self) -> Option<&Array2<f64>> {
        match &self.partition {
            Partition::Split { x_train, .. } => Some(x_train),
            Partition::Full { .. } => None,
        }
    }

    pub fn x_test(&self) -> Option<&Array2<f64>> {
        match &self.partition {
            Partition::Split { x_test, .. } => Some(x_test),
            Partition::Full { .. } => None,
        }
    }

    pub fn y_train(&self) -> Option<&Array1<f64>> {
        match &self.partition {
            Partition::Split { y_train, .. } => Some(y_train),
            Partition::Full { .. } => None,
        }
    }

    pub fn y_test(&self) -> Option<&Array1<f64>> {
        match &self.partition {
            Partition::Split { y_test, .. } => Some(y_test),
            Partition::Full { .. } => None,
        }
    }

    pub fn class_names(&self) -> &[String] {
        &self.descriptor.class_names
    }

    pub fn features(&self) -> &[String] {
        &self.descriptor.features
    }
}

// -- Serialisation: matrices become row lists, keys keep their order --

struct Rows<'a>(&'a Array2<f64>);

impl Serialize for Rows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.nrows()))?;
        for row in self.0.rows() {
            seq.serialize_element(&row.to_vec())?;
        }
        seq.end()
    }
}

impl Serialize for Field<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Field::Matrix(m) => Rows(m).serialize(serializer),
            Field::Vector(v) => serializer.collect_seq(v.iter()),
            Field::Names(n) => serializer.collect_seq(n.iter()),
        }
    }
}

impl Serialize for LoadedData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            if let Some(field) = self.get(key) {
                map.serialize_entry(key, &field)?;
            }
        }
        map.end()
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Matrix(m) => write!(f, "{m}"),
            Field::Vector(v) => write!(f, "{v}"),
            Field::Names(n) => write!(f, "{n:?}"),
        }
    }
}
