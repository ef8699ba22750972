use crate::domain::model::{CampRecord, ExportBatch, FetchReport, LoadSummary};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Where `path` ends up, for reporting.
    fn display_path(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn year(&self) -> u32;
    fn output_path(&self) -> &str;
    fn file_prefix(&self) -> Option<&str>;
    fn page_size(&self) -> usize;
    fn page_delay(&self) -> Duration;
    fn max_pages(&self) -> u32;
    fn request_timeout(&self) -> Duration;

    fn camps_file_name(&self) -> String {
        export_file_name(self.file_prefix(), self.year(), "camps")
    }

    fn emails_file_name(&self) -> String {
        export_file_name(self.file_prefix(), self.year(), "emails")
    }
}

/// `<year>_<kind>.csv`, or `<prefix>_<year>_<kind>.csv` when a prefix is set.
pub fn export_file_name(prefix: Option<&str>, year: u32, kind: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}_{}_{}.csv", prefix, year, kind),
        None => format!("{}_{}.csv", year, kind),
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Never fails outright: a broken fetch is reported in the outcome along
    /// with whatever was gathered before it broke.
    async fn extract(&self) -> FetchReport;
    async fn transform(&self, records: Vec<CampRecord>) -> Result<ExportBatch>;
    async fn load(&self, batch: ExportBatch) -> Result<LoadSummary>;
}
