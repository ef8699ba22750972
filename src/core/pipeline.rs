use crate::core::fetcher::CampFetcher;
use crate::core::{
    CampRecord, CampRow, ConfigProvider, EmailRow, ExportBatch, FetchReport, LoadSummary, Pipeline,
    Storage,
};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde::Serialize;

pub struct CampPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> CampPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("camp-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            storage,
            config,
            client,
        })
    }
}

/// Serialises rows with a header line taken from the row type's field names.
fn to_csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CampPipeline<S, C> {
    async fn extract(&self) -> FetchReport {
        CampFetcher::new(&self.client, &self.config).fetch_all().await
    }

    async fn transform(&self, records: Vec<CampRecord>) -> Result<ExportBatch> {
        // one row per camp, description truncated
        let camp_rows = records.iter().map(CampRow::from).collect();

        // order and duplicates are kept
        let emails = records
            .iter()
            .filter_map(CampRecord::contact_email)
            .map(|email| EmailRow { email })
            .collect();

        Ok(ExportBatch { camp_rows, emails })
    }

    async fn load(&self, batch: ExportBatch) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();

        // no records, no files
        if batch.camp_rows.is_empty() {
            tracing::debug!("Nothing to write");
            return Ok(summary);
        }

        // full export
        let camps_file = self.config.camps_file_name();
        tracing::info!(
            "📝 Writing {} camps to {}...",
            batch.camp_rows.len(),
            self.storage.display_path(&camps_file)
        );
        self.storage
            .write_file(&camps_file, &to_csv_bytes(&batch.camp_rows)?)
            .await?;
        summary.camp_count = batch.camp_rows.len();
        summary.camps_file = Some(self.storage.display_path(&camps_file));

        // email list, only when there is at least one address
        if batch.emails.is_empty() {
            tracing::info!("No contact emails present, skipping email export");
            return Ok(summary);
        }

        let emails_file = self.config.emails_file_name();
        self.storage
            .write_file(&emails_file, &to_csv_bytes(&batch.emails)?)
            .await?;
        summary.email_count = batch.emails.len();
        summary.emails_file = Some(self.storage.display_path(&emails_file));
        tracing::info!(
            "✅ Exported {} email addresses to {}",
            summary.email_count,
            self.storage.display_path(&emails_file)
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn file_count(&self) -> usize {
            self.files.lock().await.len()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn display_path(&self, path: &str) -> String {
            path.to_string()
        }
    }

    fn pipeline(storage: MockStorage) -> CampPipeline<MockStorage, ExportConfig> {
        let config = ExportConfig::new("http://test.com/camp", "test-key", 2025);
        CampPipeline::new(storage, config).unwrap()
    }

    fn records(values: Vec<Value>) -> Vec<CampRecord> {
        values
            .into_iter()
            .filter_map(CampRecord::from_value)
            .collect()
    }

    fn read_rows(data: &[u8]) -> Vec<Vec<String>> {
        csv::Reader::from_reader(data)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    fn read_headers(data: &[u8]) -> Vec<String> {
        csv::Reader::from_reader(data)
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_transform_flattens_in_order() {
        let pipeline = pipeline(MockStorage::new());
        let input = records(vec![
            json!({"name": "Alpha", "contact_email": "a@x.com", "hometown": "Reno",
                   "description": "Tea", "location_string": "9:00 & C"}),
            json!({"name": "Beta"}),
        ]);

        let batch = pipeline.transform(input).await.unwrap();

        assert_eq!(batch.camp_rows.len(), 2);
        assert_eq!(batch.camp_rows[0].name, "Alpha");
        assert_eq!(batch.camp_rows[0].location, "9:00 & C");
        assert_eq!(batch.camp_rows[1].name, "Beta");
        assert_eq!(batch.camp_rows[1].contact_email, "");
    }

    #[tokio::test]
    async fn test_emails_keep_order_and_duplicates() {
        let pipeline = pipeline(MockStorage::new());
        let input = records(vec![
            json!({"contact_email": "a@x.com"}),
            json!({"contact_email": ""}),
            json!({"contact_email": "b@x.com"}),
            json!({"contact_email": "a@x.com"}),
        ]);

        let batch = pipeline.transform(input).await.unwrap();
        let emails: Vec<&str> = batch.emails.iter().map(|e| e.email.as_str()).collect();

        assert_eq!(emails, vec!["a@x.com", "b@x.com", "a@x.com"]);
    }

    #[tokio::test]
    async fn test_non_string_email_lands_in_both_files() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone());
        let batch = pipeline
            .transform(records(vec![
                json!({"name": "Numeric", "contact_email": 12345}),
                json!({"name": "Zero", "contact_email": 0}),
            ]))
            .await
            .unwrap();

        pipeline.load(batch).await.unwrap();

        let camps = read_rows(&storage.get_file("2025_camps.csv").await.unwrap());
        assert_eq!(camps[0][1], "12345");
        let emails = read_rows(&storage.get_file("2025_emails.csv").await.unwrap());
        assert_eq!(emails, vec![vec!["12345".to_string()]]);
    }

    #[tokio::test]
    async fn test_load_writes_both_files() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone());
        let batch = pipeline
            .transform(records(vec![
                json!({"name": "Alpha, Inc", "contact_email": "a@x.com",
                       "description": "Says \"hi\"\nand more"}),
                json!({"name": "Beta"}),
            ]))
            .await
            .unwrap();

        let summary = pipeline.load(batch).await.unwrap();

        assert_eq!(summary.camp_count, 2);
        assert_eq!(summary.email_count, 1);
        assert_eq!(
            summary.written_files(),
            vec!["2025_camps.csv", "2025_emails.csv"]
        );

        let camps = storage.get_file("2025_camps.csv").await.unwrap();
        assert_eq!(
            read_headers(&camps),
            vec!["Name", "Contact Email", "Hometown", "Description", "Location"]
        );
        let rows = read_rows(&camps);
        assert_eq!(rows[0][0], "Alpha, Inc");
        assert_eq!(rows[0][3], "Says \"hi\"\nand more");
        assert_eq!(rows[1], vec!["Beta", "", "", "", ""]);

        let emails = storage.get_file("2025_emails.csv").await.unwrap();
        assert_eq!(read_headers(&emails), vec!["Email"]);
        assert_eq!(read_rows(&emails), vec![vec!["a@x.com".to_string()]]);
    }

    #[tokio::test]
    async fn test_load_skips_email_file_without_emails() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone());
        let batch = pipeline
            .transform(records(vec![json!({"name": "Quiet Camp"})]))
            .await
            .unwrap();

        let summary = pipeline.load(batch).await.unwrap();

        assert_eq!(summary.emails_file, None);
        assert_eq!(storage.file_count().await, 1);
        assert!(storage.get_file("2025_emails.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_load_with_nothing_writes_nothing() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone());

        let summary = pipeline.load(ExportBatch::default()).await.unwrap();

        assert_eq!(summary, LoadSummary::default());
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_description_truncated_in_file() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone());
        let batch = pipeline
            .transform(records(vec![json!({"name": "Long", "description": "z".repeat(600)})]))
            .await
            .unwrap();

        pipeline.load(batch).await.unwrap();

        let rows = read_rows(&storage.get_file("2025_camps.csv").await.unwrap());
        assert_eq!(rows[0][3], "z".repeat(500));
    }
}
