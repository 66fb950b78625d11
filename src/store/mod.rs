//! Record stores: typed field access over a storage region

pub mod record_store;
pub mod traits;
pub mod value;
pub mod view;

pub use record_store::{RecordStore, StoreState};
pub use traits::RecordReader;
pub use value::FieldValue;
pub use view::RecordView;
