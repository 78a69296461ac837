//! Load the Iris dataset (or any header-less numeric CSV with the label in
//! the last column), optionally split into stratified train/test sets.

pub mod data;

pub use data::loader::{load_data, load_with, LoadError, LoadOptions};
pub use data::model::{
    Dataset, DatasetDescriptor, DescriptorError, Field, LoadedData, Partition,
};
pub use data::split::{train_test_split, Split, SplitError, SplitOptions};
