//! Blocking client for the backend's project and timeline endpoints.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use sitebook_models::{Project, ProjectId, RecordStore, TimelineEntry, TimelineId};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

const PROJECTS: &str = "projects";
const TIMELINES: &str = "timelines";

/// Talks JSON to `/api/projects` and `/api/timelines`.
pub struct BackendClient {
    http: Client,
    config: ClientConfig,
}

impl BackendClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.config.endpoint(segments);
        debug!(%method, %url, "Backend request");
        let request = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and turns failures into errors. A 404 on a record
    /// (`id` set) is `NotFound`; anywhere else it is a plain status error.
    fn send(
        &self,
        request: RequestBuilder,
        kind: &'static str,
        id: Option<&str>,
    ) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();

        if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
            return Err(ClientError::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "Backend request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn get_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        kind: &'static str,
    ) -> Result<Vec<T>> {
        let value = read_value(self.send(request, kind, None)?)?;
        decode_list(value, kind)
    }

    /// Fetches a single record.
    fn get_one<T: DeserializeOwned>(&self, kind: &'static str, segments: &[&str]) -> Result<T> {
        let id = segments.last().copied().unwrap_or_default();
        let response = self.send(self.request(Method::GET, segments), kind, Some(id))?;
        match read_value(response)? {
            Value::Null => Err(ClientError::NotFound {
                kind,
                id: id.to_string(),
            }),
            value => decode_record(value),
        }
    }

    /// POSTs or PUTs a record; an empty reply echoes what was sent.
    fn write_one<T: Serialize + DeserializeOwned + Clone>(
        &self,
        method: Method,
        kind: &'static str,
        segments: &[&str],
        record: &T,
    ) -> Result<T> {
        let id = segments.get(2).copied();
        let response = self.send(self.request(method, segments).json(record), kind, id)?;
        match read_value(response)? {
            Value::Null => Ok(record.clone()),
            value => decode_record(value),
        }
    }

    fn delete_one(&self, kind: &'static str, segments: &[&str]) -> Result<()> {
        self.send(self.request(Method::DELETE, segments), kind, segments.last().copied())?;
        Ok(())
    }

    pub fn get_project(&self, id: &ProjectId) -> Result<Project> {
        self.get_one("project", &["api", PROJECTS, id.as_str()])
    }

    pub fn get_timeline(&self, id: &TimelineId) -> Result<TimelineEntry> {
        self.get_one("timeline entry", &["api", TIMELINES, id.as_str()])
    }

    pub fn update_timeline(&self, entry: &TimelineEntry) -> Result<TimelineEntry> {
        self.write_one(
            Method::PUT,
            "timeline entry",
            &["api", TIMELINES, entry.id.as_str()],
            entry,
        )
    }
}

impl RecordStore for BackendClient {
    type Error = ClientError;

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_list(self.request(Method::GET, &["api", PROJECTS]), "project")
    }

    /// Asks the backend to filter by project, and filters again locally in
    /// case it ignores the query.
    fn list_timelines(&self, project_id: Option<&ProjectId>) -> Result<Vec<TimelineEntry>> {
        let mut request = self.request(Method::GET, &["api", TIMELINES]);
        if let Some(id) = project_id {
            request = request.query(&[("projectId", id.as_str())]);
        }

        let mut entries: Vec<TimelineEntry> = self.get_list(request, "timeline entry")?;
        if let Some(id) = project_id {
            entries.retain(|e| e.belongs_to(id));
        }
        Ok(entries)
    }

    fn create_project(&self, project: &Project) -> Result<Project> {
        self.write_one(Method::POST, "project", &["api", PROJECTS], project)
    }

    fn update_project(&self, project: &Project) -> Result<Project> {
        self.write_one(
            Method::PUT,
            "project",
            &["api", PROJECTS, project.id.as_str()],
            project,
        )
    }

    fn delete_project(&self, id: &ProjectId) -> Result<()> {
        self.delete_one("project", &["api", PROJECTS, id.as_str()])
    }

    fn create_timeline(&self, entry: &TimelineEntry) -> Result<TimelineEntry> {
        self.write_one(Method::POST, "timeline entry", &["api", TIMELINES], entry)
    }

    fn delete_timeline(&self, id: &TimelineId) -> Result<()> {
        self.delete_one("timeline entry", &["api", TIMELINES, id.as_str()])
    }
}

/// Reads a response body as JSON; an empty body is `Null`.
fn read_value(response: Response) -> Result<Value> {
    let text = response.text()?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Strips a `{"data": ...}` envelope if there is one.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data") && !map.contains_key("id") && !map.contains_key("_id") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Keeps one ID field when a record carries both `id` and `_id`.
fn normalize_id(value: &mut Value) {
    if let Value::Object(map) = value {
        if map.contains_key("id") && map.contains_key("_id") {
            map.remove("_id");
        }
    }
}

fn decode_record<T: DeserializeOwned>(value: Value) -> Result<T> {
    let mut value = unwrap_data(value);
    normalize_id(&mut value);
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Decodes a bare array or a `{"data": [...]}` envelope, skipping items
/// that are not records.
fn decode_list<T: DeserializeOwned>(value: Value, kind: &str) -> Result<Vec<T>> {
    let items = match unwrap_data(value) {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(ClientError::Decode(format!(
                "expected a list of {} records, got {}",
                kind,
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, mut item)| {
            normalize_id(&mut item);
            match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(kind, index, error = %e, "Skipping undecodable record");
                    None
                }
            }
        })
        .collect();

    debug!(kind, total, decoded = records.len(), "Decoded list");
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_array() {
        let projects: Vec<Project> =
            decode_list(json!([{"_id": "1", "name": "a"}, {"_id": "2", "name": "b"}]), "project")
                .unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[1].id.as_str(), "2");
    }

    #[test]
    fn test_decode_data_envelope() {
        let entries: Vec<TimelineEntry> = decode_list(
            json!({"data": [{"_id": "t1", "project": "p1", "date": "2024-02-01T00:00:00.000Z"}], "total": 1}),
            "timeline entry",
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project_id.as_ref().map(|p| p.as_str()), Some("p1"));
    }

    #[test]
    fn test_decode_keeps_entries_with_mixed_keys() {
        let entries: Vec<TimelineEntry> = decode_list(
            json!([
                {"_id": "t1", "project": "p1", "projectId": "p1", "expenses": [{"amount": 50}]},
                {"_id": 77, "project": 3}
            ]),
            "timeline entry",
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id.as_str(), "t1");
        assert_eq!(entries[1].id.as_str(), "77");
        assert_eq!(entries[1].project_id.as_ref().map(|p| p.as_str()), Some("3"));
    }

    #[test]
    fn test_decode_skips_non_records() {
        let projects: Vec<Project> =
            decode_list(json!([{"_id": "1"}, 42, "junk", null]), "project").unwrap();
        assert_eq!(projects.len(), 1);
    }

    #[test]
    fn test_decode_rejects_non_lists() {
        let result: Result<Vec<Project>> = decode_list(json!({"message": "hi"}), "project");
        assert!(matches!(result, Err(ClientError::Decode(_))));

        let empty: Vec<Project> = decode_list(Value::Null, "project").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_record_with_both_id_fields() {
        let project: Project =
            decode_record(json!({"_id": "abc", "id": "abc", "name": "Tower"})).unwrap();
        assert_eq!(project.id.as_str(), "abc");
    }

    #[test]
    fn test_record_in_envelope() {
        let project: Project = decode_record(json!({"data": {"_id": "x", "code": "X"}})).unwrap();
        assert_eq!(project.code, "X");
    }
}
