use crate::utils::error::EtlError;
use crate::utils::text::truncate_chars;
use serde::Serialize;
use serde_json::{Map, Value};

/// Longest description carried into the full export.
pub const DESCRIPTION_LIMIT: usize = 500;

/// One entry of the camp listing, kept as the untyped JSON object the API sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampRecord {
    pub data: Map<String, Value>,
}

impl CampRecord {
    /// Only JSON objects become records.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => Some(Self { data }),
            _ => None,
        }
    }

    /// Renders a field as CSV cell text: strings as-is, absent or `null` as
    /// empty, anything else as compact JSON.
    pub fn field_text(&self, key: &str) -> String {
        match self.data.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// The contact email as it appears in the camps file, for any value
    /// that is present and not empty, `false` or zero.
    pub fn contact_email(&self) -> Option<String> {
        self.data
            .get("contact_email")
            .filter(|value| !is_falsy(value))
            .map(|_| self.field_text("contact_email"))
    }
}

/// JSON values that count as "nothing here": null, false, zero and empty
/// strings, arrays or objects.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Contact Email")]
    pub contact_email: String,
    #[serde(rename = "Hometown")]
    pub hometown: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Location")]
    pub location: String,
}

impl From<&CampRecord> for CampRow {
    fn from(record: &CampRecord) -> Self {
        let description = record.field_text("description");

        Self {
            name: record.field_text("name"),
            contact_email: record.field_text("contact_email"),
            hometown: record.field_text("hometown"),
            description: truncate_chars(&description, DESCRIPTION_LIMIT).to_string(),
            location: record.field_text("location_string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailRow {
    #[serde(rename = "Email")]
    pub email: String,
}

/// Output of the transform phase, ready to be serialised.
#[derive(Debug, Clone, Default)]
pub struct ExportBatch {
    pub camp_rows: Vec<CampRow>,
    pub emails: Vec<EmailRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back with no records.
    EmptyPage,
    /// A page held fewer records than a full page.
    ShortPage { count: usize },
    /// A later page answered with a non-success status.
    EndOfPages { status: u16, last_page: u32 },
}

#[derive(Debug)]
pub enum FetchOutcome {
    Completed(StopReason),
    Aborted(EtlError),
}

impl FetchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, FetchOutcome::Completed(_))
    }
}

/// Everything the fetch loop gathered, plus why it stopped.
#[derive(Debug)]
pub struct FetchReport {
    pub records: Vec<CampRecord>,
    pub pages_fetched: u32,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub camps_file: Option<String>,
    pub emails_file: Option<String>,
    pub camp_count: usize,
    pub email_count: usize,
}

impl LoadSummary {
    pub fn written_files(&self) -> Vec<&str> {
        self.camps_file
            .iter()
            .chain(self.emails_file.iter())
            .map(String::as_str)
            .collect()
    }
}
