use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use megui_core::{ApiConfig, CrudError, Record, SessionSource, coerce_id, parse_collection, parse_record};
use megui_schema::{EntitySchema, Reference, UniqueCheck, normalize_collection, normalize_inbound};

use crate::api::{ReferenceApi, ResourceApi};

// ── Backend ─────────────────────────────────────────────────────────

/// Shared HTTP plumbing: one connection pool, one base URL, one session.
///
/// Cloning is cheap; every [`ResourceClient`] holds a clone.
#[derive(Clone)]
pub struct Backend {
    http: reqwest::Client,
    config: ApiConfig,
    session: Arc<dyn SessionSource>,
}

impl Backend {
    pub fn new(config: ApiConfig, session: Arc<dyn SessionSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session,
        }
    }

    /// Client for one entity.
    pub fn resource(&self, schema: Arc<EntitySchema>) -> ResourceClient {
        ResourceClient {
            backend: self.clone(),
            schema,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Attach `Authorization: Bearer <token>` when the session has one.
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map transport failures and non-2xx statuses.
    /// Failures are logged here and returned unchanged to the caller.
    async fn send(
        &self,
        op: &'static str,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CrudError> {
        debug!(op, path, "request");
        let resp = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| logged(op, path, CrudError::Network(e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(logged(
                op,
                path,
                CrudError::Server {
                    status: status.as_u16(),
                    message: server_message(&body),
                },
            ));
        }
        Ok(resp)
    }

    /// Read a JSON body. An empty body reads as `null`.
    async fn read_json(op: &'static str, path: &str, resp: reqwest::Response) -> Result<Value, CrudError> {
        let text = resp
            .text()
            .await
            .map_err(|e| logged(op, path, CrudError::Network(e.to_string())))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| logged(op, path, CrudError::Decode(format!("response body: {}", e))))
    }

    async fn get_value(&self, op: &'static str, path: &str, params: &[(String, String)]) -> Result<Value, CrudError> {
        let mut req = self.http.get(self.config.url(path));
        if !params.is_empty() {
            req = req.query(params);
        }
        let resp = self.send(op, path, req).await?;
        Self::read_json(op, path, resp).await
    }

    async fn get_collection(&self, op: &'static str, path: &str, params: &[(String, String)]) -> Result<Vec<Record>, CrudError> {
        let body = self.get_value(op, path, params).await?;
        parse_collection(body).map_err(|e| logged(op, path, CrudError::Decode(e)))
    }
}

#[async_trait]
impl ReferenceApi for Backend {
    /// Reference rows only get their `id` coerced; the page reads nothing
    /// else from them but the display field.
    async fn list_reference(&self, reference: &Reference) -> Result<Vec<Record>, CrudError> {
        let path = reference.path.trim_matches('/').to_string();
        let mut rows = self.get_collection("list_reference", &path, &[]).await?;
        for row in rows.iter_mut() {
            if let Some(id) = row.get("id").and_then(coerce_id) {
                row.insert("id".to_string(), Value::Number(id.into()));
            }
        }
        Ok(rows)
    }
}

// ── ResourceClient ──────────────────────────────────────────────────

/// CRUD client for a single entity schema.
///
/// Paths: `{base_url}/{schema.path}` and `{base_url}/{schema.path}/{id}`.
#[derive(Clone)]
pub struct ResourceClient {
    backend: Backend,
    schema: Arc<EntitySchema>,
}

impl ResourceClient {
    fn collection_path(&self) -> String {
        self.schema.collection_path()
    }

    fn item_path(&self, id: i64) -> String {
        self.schema.item_path(id)
    }

    fn to_record(&self, op: &'static str, path: &str, body: Value) -> Result<Record, CrudError> {
        let mut record = parse_record(body).map_err(|e| logged(op, path, CrudError::Decode(e)))?;
        normalize_inbound(&self.schema, &mut record);
        Ok(record)
    }

    /// Record returned by a write. A 201/204 without a body means the
    /// server accepted the payload as sent.
    fn written(&self, op: &'static str, path: &str, body: Value, payload: &Record, id: Option<i64>) -> Result<Record, CrudError> {
        if !body.is_null() {
            return self.to_record(op, path, body);
        }
        debug!(op, path, "empty response body, echoing payload");
        let mut record = payload.clone();
        if let Some(id) = id {
            record.insert("id".to_string(), Value::Number(id.into()));
        }
        normalize_inbound(&self.schema, &mut record);
        Ok(record)
    }
}

#[async_trait]
impl ResourceApi for ResourceClient {
    fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    async fn list(&self) -> Result<Vec<Record>, CrudError> {
        let path = self.collection_path();
        let mut rows = self.backend.get_collection("list", &path, &[]).await?;
        normalize_collection(&self.schema, &mut rows);
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Record, CrudError> {
        let path = self.item_path(id);
        let body = self.backend.get_value("get", &path, &[]).await?;
        self.to_record("get", &path, body)
    }

    async fn create(&self, payload: &Record) -> Result<Record, CrudError> {
        let path = self.collection_path();
        let req = self.backend.http.post(self.backend.config.url(&path)).json(payload);
        let resp = self.backend.send("create", &path, req).await?;
        let body = Backend::read_json("create", &path, resp).await?;
        self.written("create", &path, body, payload, None)
    }

    async fn update(&self, id: i64, payload: &Record) -> Result<Record, CrudError> {
        let path = self.item_path(id);
        let req = self.backend.http.put(self.backend.config.url(&path)).json(payload);
        let resp = self.backend.send("update", &path, req).await?;
        let body = Backend::read_json("update", &path, resp).await?;
        self.written("update", &path, body, payload, Some(id))
    }

    async fn delete(&self, id: i64) -> Result<(), CrudError> {
        let path = self.item_path(id);
        let req = self.backend.http.delete(self.backend.config.url(&path));
        self.backend.send("delete", &path, req).await?;
        Ok(())
    }

    async fn query(&self, sub_path: &str, params: &[(String, String)]) -> Result<Vec<Record>, CrudError> {
        let path = format!("{}/{}", self.collection_path(), sub_path.trim_matches('/'));
        let mut rows = self.backend.get_collection("query", &path, params).await?;
        normalize_collection(&self.schema, &mut rows);
        Ok(rows)
    }

    async fn check_unique(&self, check: &UniqueCheck, params: &[(String, String)]) -> Result<bool, CrudError> {
        let path = format!("{}/{}", self.collection_path(), check.query_path.trim_matches('/'));
        let body = self.backend.get_value("check_unique", &path, params).await?;
        conflict_reported(&body).map_err(|e| logged("check_unique", &path, CrudError::Decode(e)))
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn logged(op: &'static str, path: &str, err: CrudError) -> CrudError {
    error!(op, path, code = err.error_code(), "{}", err);
    err
}

/// Pull a human-readable message out of an error body: `{"message"}`,
/// then `{"error"}`, then the raw text.
pub(crate) fn server_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "mensaje"] {
            if let Some(msg) = v.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}

/// Interpret a uniqueness-check response: a bare boolean, or an object
/// with `existe` / `exists` / `duplicado`.
pub(crate) fn conflict_reported(body: &Value) -> Result<bool, String> {
    match body {
        Value::Bool(b) => Ok(*b),
        Value::Object(map) => ["existe", "exists", "duplicado"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_bool))
            .ok_or_else(|| format!("uniqueness response has no verdict: {}", body)),
        other => Err(format!("unexpected uniqueness response: {}", other)),
    }
}
