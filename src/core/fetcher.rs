use crate::domain::model::{is_falsy, CampRecord, FetchOutcome, FetchReport, StopReason};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::text::preview;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Keys a wrapping object may hold the records under, highest priority first.
pub const RECORD_KEYS: [&str; 4] = ["data", "camps", "results", "items"];

/// How a parsed page body carries its records.
#[derive(Debug)]
pub enum ResponseShape {
    Sequence(Vec<Value>),
    WrappedMapping {
        key: &'static str,
        records: Vec<Value>,
    },
    Unrecognized(EtlError),
}

impl ResponseShape {
    pub fn classify(body: Value) -> Self {
        match body {
            Value::Array(records) => ResponseShape::Sequence(records),
            Value::Object(mut map) => {
                for key in RECORD_KEYS {
                    if let Some(value) = map.remove(key) {
                        return match value {
                            Value::Array(records) => ResponseShape::WrappedMapping { key, records },
                            // null, {}, "", false and 0 all mean no more data
                            other if is_falsy(&other) => ResponseShape::WrappedMapping {
                                key,
                                records: Vec::new(),
                            },
                            other => ResponseShape::Unrecognized(EtlError::UnexpectedType {
                                kind: format!("{} under '{}'", json_kind(&other), key),
                            }),
                        };
                    }
                }
                ResponseShape::Unrecognized(EtlError::UnexpectedStructure {
                    keys: map.keys().cloned().collect(),
                })
            }
            other => ResponseShape::Unrecognized(EtlError::UnexpectedType {
                kind: json_kind(&other).to_string(),
            }),
        }
    }

    pub fn into_records(self) -> Result<Vec<Value>> {
        match self {
            ResponseShape::Sequence(records) => Ok(records),
            ResponseShape::WrappedMapping { key, records } => {
                tracing::debug!("Records found under '{}'", key);
                Ok(records)
            }
            ResponseShape::Unrecognized(err) => Err(err),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug)]
enum PageOutcome {
    Records(Vec<Value>),
    /// Non-success status past the first page.
    EndOfPages { status: u16 },
}

/// Walks the listing one page at a time, strictly sequentially.
pub struct CampFetcher<'a, C: ConfigProvider> {
    client: &'a Client,
    config: &'a C,
}

impl<'a, C: ConfigProvider> CampFetcher<'a, C> {
    pub fn new(client: &'a Client, config: &'a C) -> Self {
        Self { client, config }
    }

    pub async fn fetch_all(&self) -> FetchReport {
        let page_size = self.config.page_size();
        let max_pages = self.config.max_pages();
        let mut records = Vec::new();
        let mut pages_fetched = 0;
        let mut page: u32 = 1;

        tracing::info!(
            "🚀 Fetching camps for year {} from {}",
            self.config.year(),
            self.config.api_endpoint()
        );

        let outcome = loop {
            tracing::info!("Fetching page {}...", page);

            // a failed later page ends the listing, a failed first page aborts

            let items = match self.fetch_page(page).await {
                Ok(PageOutcome::Records(items)) => items,
                Ok(PageOutcome::EndOfPages { status }) => {
                    tracing::info!("✅ Reached end at page {} (HTTP {})", page - 1, status);
                    break FetchOutcome::Completed(StopReason::EndOfPages {
                        status,
                        last_page: page - 1,
                    });
                }
                Err(e) => {
                    log_abort(page, &e);
                    break FetchOutcome::Aborted(e);
                }
            };

            // empty page: nothing left
            if items.is_empty() {
                tracing::info!("✅ No more pages.");
                break FetchOutcome::Completed(StopReason::EmptyPage);
            }

            let count = items.len();
            pages_fetched += 1;
            tracing::info!("  ✅ Retrieved {} camps", count);

            // non-objects still count toward the page size
            for item in items {
                match CampRecord::from_value(item) {
                    Some(record) => records.push(record),
                    None => tracing::warn!("Skipping non-object entry on page {}", page),
                }
            }

            // short page: assume it was the last one
            if count < page_size {
                tracing::info!("✅ Likely last page ({} < {} items)", count, page_size);
                break FetchOutcome::Completed(StopReason::ShortPage { count });
            }

            page += 1;
            // page cap
            if page > max_pages {
                let e = EtlError::PageLimitReached { max_pages };
                log_abort(page, &e);
                break FetchOutcome::Aborted(e);
            }

            // fixed pause between pages
            tokio::time::sleep(self.config.page_delay()).await;
        };

        FetchReport {
            records,
            pages_fetched,
            outcome,
        }
    }

    async fn fetch_page(&self, page: u32) -> Result<PageOutcome> {
        // page 1 is requested without a page parameter
        let mut query = vec![("year", self.config.year().to_string())];
        if page > 1 {
            query.push(("page", page.to_string()));
        }

        let response = self
            .client
            .get(self.config.api_endpoint())
            .basic_auth(self.config.api_key(), Some(""))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("  Status code: {}", status);

        if !status.is_success() {
            if page > 1 {
                return Ok(PageOutcome::EndOfPages {
                    status: status.as_u16(),
                });
            }

            // diagnostic only, an unreadable body just means no preview
            let body = response.text().await.unwrap_or_default();
            let body_preview = preview(&body);
            return Err(if status == StatusCode::UNAUTHORIZED {
                EtlError::AuthenticationError {
                    status: status.as_u16(),
                    body_preview,
                }
            } else {
                EtlError::HttpStatusError {
                    status: status.as_u16(),
                    body_preview,
                }
            });
        }

        // check content type before parsing
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        let body = response.text().await?;
        let first_page_preview = || if page == 1 { preview(&body) } else { None };

        if !content_type.contains("json") {
            return Err(EtlError::UnexpectedContentType {
                content_type,
                body_preview: first_page_preview(),
            });
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|e| EtlError::JsonParseError {
            message: e.to_string(),
            body_preview: first_page_preview(),
        })?;

        // pull the records out of whatever shape came back
        ResponseShape::classify(parsed)
            .into_records()
            .map(PageOutcome::Records)
    }
}

fn log_abort(page: u32, e: &EtlError) {
    tracing::error!("❌ Page {}: {}", page, e);
    if let Some(body) = e.body_preview() {
        tracing::error!("   Response (first 500 chars): {}", body);
    }
    if matches!(e, EtlError::AuthenticationError { .. }) {
        tracing::warn!("⚠️  {}", e.recovery_suggestion());
    }
}
