//! In-memory ERP backend used by the golden tests.
//!
//! Generic collections under `/api/{collection}`, numeric ids assigned on
//! create, audit timestamps filled by the server. Every request is
//! recorded so tests can assert exactly what went over the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Map, Value, json};

use megui_core::coerce_id;

pub const TOKEN: &str = "golden-token";

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub auth: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct Store {
    collections: HashMap<String, Vec<Map<String, Value>>>,
    next_id: i64,
    requests: Vec<Seen>,
    /// Serve ids and foreign keys as strings, like the legacy endpoints.
    pub ids_as_strings: bool,
    /// Wrap list responses in `{items, total}`.
    pub envelope: bool,
    /// When set, requests without this bearer token get a 401.
    pub required_token: Option<String>,
    /// Answer POST with a bare 201 and PUT with a bare 204.
    pub bodiless_writes: bool,
    /// Answer every `validar-*` uniqueness route with a 503.
    pub uniqueness_down: bool,
}

type Shared = Arc<Mutex<Store>>;

pub struct TestServer {
    pub base_url: String,
    store: Shared,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut Store)) -> Self {
        let mut store = Store {
            next_id: 1,
            ..Default::default()
        };
        configure(&mut store);
        let store: Shared = Arc::new(Mutex::new(store));

        let app = Router::new()
            .route("/api/{collection}", get(list).post(create))
            .route("/api/{collection}/{id}", get(get_item).put(update).delete(delete_item))
            .with_state(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}/api", addr);
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(format!("{}/ping", base_url)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        store.lock().unwrap().requests.clear();

        Self { base_url, store }
    }

    /// Insert a row directly, bypassing HTTP. Returns its id.
    pub fn seed(&self, collection: &str, row: Value) -> i64 {
        let mut st = self.store.lock().unwrap();
        let mut row = match row {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        };
        let id = match row.get("id").and_then(coerce_id) {
            Some(id) => id,
            None => {
                let id = st.next_id;
                row.insert("id".into(), json!(id));
                id
            }
        };
        st.next_id = st.next_id.max(id + 1);
        st.collections.entry(collection.to_string()).or_default().push(row);
        id
    }

    pub fn rows(&self, collection: &str) -> Vec<Map<String, Value>> {
        self.store
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.store.lock().unwrap().requests.clone()
    }

    /// Requests with the given method, in arrival order.
    pub fn requests_of(&self, method: Method) -> Vec<Seen> {
        self.requests().into_iter().filter(|r| r.method == method).collect()
    }

    pub fn clear_requests(&self) {
        self.store.lock().unwrap().requests.clear();
    }
}

// ── Handlers ──

fn record(st: &mut Store, method: Method, path: String, query: HashMap<String, String>, headers: &HeaderMap, body: Option<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    st.requests.push(Seen {
        method,
        path,
        query,
        auth,
        body,
    });
}

fn authorized(st: &Store, headers: &HeaderMap) -> Result<(), Response> {
    let Some(required) = &st.required_token else {
        return Ok(());
    };
    let sent = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if sent == Some(required.as_str()) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, axum::Json(json!({"message": "Token inválido"}))).into_response())
    }
}

fn outbound(st: &Store, row: &Map<String, Value>) -> Value {
    let mut row = row.clone();
    if st.ids_as_strings {
        for (k, v) in row.iter_mut() {
            let is_key = k == "id" || k.ends_with("Id");
            if is_key && v.is_number() {
                *v = Value::String(v.to_string());
            }
        }
    }
    Value::Object(row)
}

fn not_found(collection: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({"message": format!("{}/{} no existe", collection, id)})),
    )
        .into_response()
}

async fn list(State(store): State<Shared>, Path(collection): Path<String>, headers: HeaderMap) -> Response {
    let mut st = store.lock().unwrap();
    record(&mut st, Method::GET, collection.clone(), HashMap::new(), &headers, None);
    if let Err(resp) = authorized(&st, &headers) {
        return resp;
    }
    let rows: Vec<Value> = st
        .collections
        .get(&collection)
        .map(|rows| rows.iter().map(|r| outbound(&st, r)).collect())
        .unwrap_or_default();
    if st.envelope {
        let total = rows.len();
        axum::Json(json!({"items": rows, "total": total})).into_response()
    } else {
        axum::Json(Value::Array(rows)).into_response()
    }
}

async fn create(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let mut st = store.lock().unwrap();
    record(&mut st, Method::POST, collection.clone(), HashMap::new(), &headers, Some(body.clone()));
    if let Err(resp) = authorized(&st, &headers) {
        return resp;
    }
    let Value::Object(mut row) = body else {
        return (StatusCode::BAD_REQUEST, "body must be an object").into_response();
    };

    if collection == "cargos" {
        let taken = st.collections.get("cargos").is_some_and(|rows| {
            rows.iter()
                .any(|r| r.get("nombre") == row.get("nombre") && r.get("empresaId") == row.get("empresaId"))
        });
        if taken {
            return (
                StatusCode::CONFLICT,
                axum::Json(json!({"message": "Cargo ya existe para la empresa"})),
            )
                .into_response();
        }
    }

    let id = st.next_id;
    st.next_id += 1;
    row.insert("id".into(), json!(id));
    row.insert("creadoEn".into(), json!("2024-05-20T14:00:00.000Z"));
    row.insert("creadoPor".into(), json!("golden"));
    let out = outbound(&st, &row);
    st.collections.entry(collection).or_default().push(row);
    if st.bodiless_writes {
        return StatusCode::CREATED.into_response();
    }
    (StatusCode::CREATED, axum::Json(out)).into_response()
}

async fn get_item(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut st = store.lock().unwrap();
    record(&mut st, Method::GET, format!("{}/{}", collection, id), query.clone(), &headers, None);
    if let Err(resp) = authorized(&st, &headers) {
        return resp;
    }

    if id.starts_with("validar-") {
        if st.uniqueness_down {
            return (StatusCode::SERVICE_UNAVAILABLE, "validation offline").into_response();
        }
        return axum::Json(json!({"existe": value_taken(&st, &collection, &query)})).into_response();
    }

    let wanted = coerce_id(&Value::String(id.clone()));
    if wanted.is_none() {
        // Any other non-numeric segment is a filtered sub-collection.
        let rows: Vec<Value> = st
            .collections
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_query(r, &query))
                    .map(|r| outbound(&st, r))
                    .collect()
            })
            .unwrap_or_default();
        return axum::Json(Value::Array(rows)).into_response();
    }
    let found = st
        .collections
        .get(&collection)
        .and_then(|rows| rows.iter().find(|r| r.get("id").and_then(coerce_id) == wanted));
    match found {
        Some(row) => axum::Json(outbound(&st, row)).into_response(),
        None => not_found(&collection, &id),
    }
}

/// The checked value (`numeroEquipo`, `nombre`, ...) already used within
/// the scope fields sent along, ignoring `excludeId`.
fn value_taken(st: &Store, collection: &str, query: &HashMap<String, String>) -> bool {
    let exclude = query.get("excludeId").and_then(|s| s.parse::<i64>().ok());
    let Some(rows) = st.collections.get(collection) else {
        return false;
    };
    rows.iter()
        .filter(|r| r.get("id").and_then(coerce_id) != exclude)
        .any(|r| matches_query(r, query))
}

/// Every query parameter except `excludeId` equals the row's field.
fn matches_query(row: &Map<String, Value>, query: &HashMap<String, String>) -> bool {
    query.iter().filter(|(k, _)| *k != "excludeId").all(|(k, v)| match row.get(k) {
        Some(Value::String(s)) => s == v,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == *v,
    })
}

async fn update(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let mut st = store.lock().unwrap();
    record(&mut st, Method::PUT, format!("{}/{}", collection, id), HashMap::new(), &headers, Some(body.clone()));
    if let Err(resp) = authorized(&st, &headers) {
        return resp;
    }
    let Value::Object(patch) = body else {
        return (StatusCode::BAD_REQUEST, "body must be an object").into_response();
    };
    let wanted = coerce_id(&Value::String(id.clone()));
    let Some(row) = st
        .collections
        .get_mut(&collection)
        .and_then(|rows| rows.iter_mut().find(|r| r.get("id").and_then(coerce_id) == wanted))
    else {
        return not_found(&collection, &id);
    };
    for (k, v) in patch {
        if k != "id" {
            row.insert(k, v);
        }
    }
    row.insert("actualizadoEn".into(), json!("2024-05-21T09:30:00.000Z"));
    let row = row.clone();
    if st.bodiless_writes {
        return StatusCode::NO_CONTENT.into_response();
    }
    axum::Json(outbound(&st, &row)).into_response()
}

async fn delete_item(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut st = store.lock().unwrap();
    record(&mut st, Method::DELETE, format!("{}/{}", collection, id), HashMap::new(), &headers, None);
    if let Err(resp) = authorized(&st, &headers) {
        return resp;
    }
    let wanted = coerce_id(&Value::String(id.clone()));
    let Some(rows) = st.collections.get_mut(&collection) else {
        return not_found(&collection, &id);
    };
    let before = rows.len();
    rows.retain(|r| r.get("id").and_then(coerce_id) != wanted);
    if rows.len() == before {
        return not_found(&collection, &id);
    }
    StatusCode::NO_CONTENT.into_response()
}
