//! Catalog API response models
//!
//! Only the fields that drive export decisions are modelled; everything else
//! in the remote payloads is ignored.

use serde::{Deserialize, Deserializer};

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// 200 response from the range-export endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// Number of records the remote job wrote
    #[serde(default)]
    pub output_records: Option<u64>,

    /// Download URL of the produced artifact
    #[serde(default)]
    pub file: Option<String>,
}

/// Error envelope returned alongside HTTP 500
#[derive(Debug, Deserialize)]
pub struct RemoteError {
    pub name: String,
}

/// One entry of a record listing, or of the last-ID lookup document
#[derive(Debug, Deserialize)]
pub struct RecordEntry {
    #[serde(deserialize_with = "deserialize_record_id")]
    pub id: u64,
}

/// Paged record listing (`bibs/`) and the last-ID lookup document
#[derive(Debug, Deserialize)]
pub struct RecordListing {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub entries: Vec<RecordEntry>,
}

/// Record IDs show up both as JSON numbers and as numeric strings
fn deserialize_record_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("record id '{text}' is not numeric"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_response_empty_range() {
        let resp: ExportResponse = serde_json::from_str(r#"{"outputRecords": 0}"#).unwrap();
        assert_eq!(resp.output_records, Some(0));
        assert!(resp.file.is_none());
    }

    #[test]
    fn test_export_response_with_file() {
        let resp: ExportResponse = serde_json::from_str(
            r#"{"file": "https://catalog.example.edu/files/x.mrc", "outputRecords": 1999, "errors": []}"#,
        )
        .unwrap();
        assert_eq!(resp.file.as_deref(), Some("https://catalog.example.edu/files/x.mrc"));
    }

    #[test]
    fn test_record_id_number_or_string() {
        let listing: RecordListing =
            serde_json::from_str(r#"{"total": 2, "entries": [{"id": 1004000}, {"id": "1004001"}]}"#)
                .unwrap();
        let ids: Vec<u64> = listing.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, [1_004_000, 1_004_001]);
    }

    #[test]
    fn test_record_id_rejects_non_numeric() {
        let result: Result<RecordEntry, _> = serde_json::from_str(r#"{"id": "b1004000"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_response_default_expiry() {
        let resp: TokenResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(resp.expires_in, 3600);
    }
}
