//! Record schemas: field placement, record sizing and array addressing

pub mod array;
pub mod builder;
pub mod field;

pub use array::RecordArrayLayout;
pub use builder::{LayoutBuilder, RecordLayout};
pub use field::{FieldKind, FieldSpec};
