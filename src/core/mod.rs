pub mod etl;
pub mod fetcher;
pub mod normalizer;
pub mod pipeline;
pub mod query;
pub mod summary;

pub use crate::domain::model::{
    Designation, Field, FieldValue, NormalizedRecord, NormalizedTable, RawRecord,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSource, Sleeper, Storage};
pub use crate::utils::error::Result;
