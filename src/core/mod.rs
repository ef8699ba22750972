pub mod etl;
pub mod fetcher;
pub mod pipeline;

pub use crate::domain::model::{
    CampRecord, CampRow, EmailRow, ExportBatch, FetchOutcome, FetchReport, LoadSummary,
    StopReason,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
