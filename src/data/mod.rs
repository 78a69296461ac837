/// Data layer: parsing, slicing and splitting.
///
/// Architecture:
/// ```text
///   iris.csv (no header, label last)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset { X, y }
///   └──────────┘
///        │  split?
///        ▼
///   ┌──────────┐
///   │  split    │  stratified, seeded → X_train / X_test / y_train / y_test
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ LoadedData  │  arrays + DatasetDescriptor (class_names, features)
///   └────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod split;
