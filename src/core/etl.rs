use crate::core::{FetchOutcome, LoadSummary, Pipeline};
use crate::utils::error::{EtlError, Result};

/// What one run fetched and wrote, and whether the fetch finished cleanly.
#[derive(Debug)]
pub struct RunSummary {
    pub fetch: FetchOutcome,
    pub pages_fetched: u32,
    pub records_fetched: usize,
    pub load: LoadSummary,
}

impl RunSummary {
    /// The error that cut the fetch short, if any. Records gathered before it
    /// were still exported.
    pub fn fetch_error(&self) -> Option<&EtlError> {
        match &self.fetch {
            FetchOutcome::Aborted(e) => Some(e),
            FetchOutcome::Completed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.fetch.is_completed()
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting camp export");

        let report = self.pipeline.extract().await;
        let records_fetched = report.records.len();
        tracing::info!(
            "Fetched {} camps over {} pages",
            records_fetched,
            report.pages_fetched
        );

        if report.records.is_empty() {
            match &report.outcome {
                FetchOutcome::Completed(_) => {
                    tracing::warn!("❌ No camps retrieved. Check the API key and year.")
                }
                FetchOutcome::Aborted(e) => {
                    tracing::error!("❌ No camps retrieved, fetch failed: {}", e)
                }
            }
            return Ok(RunSummary {
                fetch: report.outcome,
                pages_fetched: report.pages_fetched,
                records_fetched,
                load: LoadSummary::default(),
            });
        }

        if let FetchOutcome::Aborted(e) = &report.outcome {
            tracing::warn!(
                "Fetch stopped early ({}); exporting the {} camps gathered so far",
                e,
                records_fetched
            );
        }

        let batch = self.pipeline.transform(report.records).await?;
        tracing::debug!(
            "Transformed {} rows, {} emails",
            batch.camp_rows.len(),
            batch.emails.len()
        );

        let load = self.pipeline.load(batch).await?;

        Ok(RunSummary {
            fetch: report.outcome,
            pages_fetched: report.pages_fetched,
            records_fetched,
            load,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CampRecord, CampRow, ExportBatch, FetchReport, StopReason};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned fetch result; counts how often load runs.
    struct StubPipeline {
        records: Vec<CampRecord>,
        abort: bool,
        loads: AtomicUsize,
    }

    impl StubPipeline {
        fn new(count: usize, abort: bool) -> Self {
            let records = (0..count)
                .filter_map(|i| CampRecord::from_value(json!({"name": format!("Camp {}", i)})))
                .collect();
            Self {
                records,
                abort,
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> FetchReport {
            let outcome = if self.abort {
                FetchOutcome::Aborted(EtlError::PageLimitReached { max_pages: 1 })
            } else {
                FetchOutcome::Completed(StopReason::EmptyPage)
            };
            FetchReport {
                records: self.records.clone(),
                pages_fetched: 1,
                outcome,
            }
        }

        async fn transform(&self, records: Vec<CampRecord>) -> Result<ExportBatch> {
            Ok(ExportBatch {
                camp_rows: records.iter().map(CampRow::from).collect(),
                emails: Vec::new(),
            })
        }

        async fn load(&self, batch: ExportBatch) -> Result<LoadSummary> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(LoadSummary {
                camps_file: Some("camps.csv".to_string()),
                emails_file: None,
                camp_count: batch.camp_rows.len(),
                email_count: 0,
            })
        }
    }

    #[tokio::test]
    async fn test_zero_records_skips_load() {
        let engine = EtlEngine::new(StubPipeline::new(0, false));

        let summary = engine.run().await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.records_fetched, 0);
        assert_eq!(summary.load, LoadSummary::default());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_with_nothing_is_distinguishable() {
        let engine = EtlEngine::new(StubPipeline::new(0, true));

        let summary = engine.run().await.unwrap();

        assert!(!summary.is_success());
        assert!(summary.fetch_error().is_some());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_fetch_still_exports() {
        let engine = EtlEngine::new(StubPipeline::new(3, true));

        let summary = engine.run().await.unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.load.camp_count, 3);
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }
}
