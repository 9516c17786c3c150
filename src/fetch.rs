use crate::config::{CredentialProvider, TOKEN_KEY};
use crate::endpoints::Endpoint;
use crate::errors::FetchError;
use crate::table::{ResultTable, TIME_COLUMN};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::info;

/// Whether outbound requests carry `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    Bearer,
    Anonymous,
}

impl AuthPolicy {
    pub fn from_flag(send_auth: bool) -> Self {
        if send_auth {
            AuthPolicy::Bearer
        } else {
            AuthPolicy::Anonymous
        }
    }
}

pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// GETs one endpoint and turns its `data` array into a table.
pub async fn fetch_table(
    client: &reqwest::Client,
    endpoint: &Endpoint,
    auth: AuthPolicy,
    credentials: &dyn CredentialProvider,
) -> Result<ResultTable, FetchError> {
    let mut request = client.get(&endpoint.url);
    if auth == AuthPolicy::Bearer {
        let token = credentials
            .credential(TOKEN_KEY)
            .ok_or_else(|| FetchError::MissingCredential(TOKEN_KEY.to_string()))?;
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response.bytes().await?;
    let table = parse_payload(&body)?;
    info!(endpoint = %endpoint.role, rows = table.len(), "fetched table");
    Ok(table)
}

/// Parses `{"data": [...]}`. A missing or non-array `data` is an empty table.
pub fn parse_payload(body: &[u8]) -> Result<ResultTable, FetchError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|err| FetchError::Parse(err.to_string()))?;

    let records: Vec<Map<String, Value>> = match payload {
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut table = ResultTable::from_records(records);
    table
        .parse_timestamps(TIME_COLUMN)
        .map_err(FetchError::Parse)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use chrono::{TimeZone, Utc};

    #[test]
    fn edits_payload_parses_hour_and_count() {
        let body = br#"{"data": [{"hour": "2024-01-01T00:00:00Z", "total_edits": 42}]}"#;
        let table = parse_payload(body).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.column("hour")[0].as_timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(table.column("total_edits")[0], &Cell::Int(42));
    }

    #[test]
    fn missing_or_malformed_data_is_empty() {
        for body in [
            r#"{}"#,
            r#"{"data": null}"#,
            r#"{"data": "oops"}"#,
            r#"{"meta": [], "rows": 3}"#,
            r#"[1, 2, 3]"#,
        ] {
            let table = parse_payload(body.as_bytes()).unwrap();
            assert!(table.is_empty(), "{body}");
        }
    }

    #[test]
    fn empty_data_array_is_empty_table() {
        let table = parse_payload(br#"{"data": []}"#).unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        let err = parse_payload(b"<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn auth_policy_follows_flag() {
        assert_eq!(AuthPolicy::from_flag(true), AuthPolicy::Bearer);
        assert_eq!(AuthPolicy::from_flag(false), AuthPolicy::Anonymous);
    }
}
