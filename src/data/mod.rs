/// Data layer: binding raw inputs to a validated dataset and transforming it.
///
/// Architecture:
/// ```text
///   X, y (Value)      cat_cols (Value)
///        │                  │
///        ▼                  ▼
///   ┌──────────┐      ┌──────────┐
///   │  model   │◄─────│ CatCols  │  check shapes/kinds → Dataset
///   └──────────┘      └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   Dataset    │  numeric columns, coded categorical columns, labels
///   └──────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ transform │  rescale, discretize, one-hot design matrix
///   └───────────┘
/// ```

pub mod model;
pub mod transform;

pub use model::{validate_xy, CatCols, Dataset};
pub use transform::{design_matrix, discretize, resolve_rescale, Rescale};
