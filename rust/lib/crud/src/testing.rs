//! In-memory fakes shared by the engine tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use megui_client::{ReferenceApi, ResourceApi};
use megui_core::{CrudError, Record, record_id};
use megui_schema::{DerivedDef, EntitySchema, FieldDef, Reference, UniqueCheck};

pub fn rec(v: Value) -> Record {
    match v {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

pub fn cargo_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new("cargo", "Cargos", "cargos")
            .field(FieldDef::text("nombre", "Nombre").required().searchable().max_len(60))
            .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required().searchable())
            .field(FieldDef::text("descripcion", "Descripción"))
            .field(FieldDef::boolean("activo", "Activo").default_value(json!(true)))
            .audited()
            .reference(Reference::new("empresas", "empresas", "razonSocial")),
    )
}

pub fn cuenta_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new("configuracion-cuenta-contable", "Cuentas contables", "configuracion-cuenta-contable")
            .field(FieldDef::upper("cuentaContableDebe", "Cuenta debe").required().searchable())
            .field(FieldDef::upper("cuentaContableHaber", "Cuenta haber").required())
            .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required())
            .field(FieldDef::foreign_key("monedaId", "Moneda", "monedas"))
            .field(FieldDef::percent("porcentaje", "Porcentaje"))
            .field(FieldDef::money("montoBase", "Monto base"))
            .field(FieldDef::money("montoAfecto", "Monto afecto"))
            .derived(DerivedDef::ratio("ratioAfecto", "% afecto", "montoAfecto", "montoBase").overridable())
            .audited()
            .reference(Reference::new("empresas", "empresas", "razonSocial"))
            .reference(Reference::new("monedas", "monedas", "codigo"))
            .display_field("cuentaContableDebe"),
    )
}

pub fn equipo_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new("equipo", "Equipos", "equipos")
            .field(FieldDef::upper("numeroEquipo", "Número").required().searchable())
            .field(FieldDef::foreign_key("tipoEquipoId", "Tipo de equipo", "tipos-equipo").required())
            .field(FieldDef::text("marca", "Marca").searchable())
            .field(FieldDef::enumeration("propiedad", "Propiedad", &["PROPIO", "ARRENDADO"]))
            .field(FieldDef::date("fechaIngreso", "Fecha de ingreso").required().default_now())
            .unique(
                "numeroEquipo",
                &["tipoEquipoId"],
                "validar-numero",
                "Ya existe un equipo con ese número para el tipo",
            )
            .reference(Reference::new("tipos-equipo", "tipos-equipo", "nombre"))
            .category("propiedad", "PROPIO", "ARRENDADO")
            .display_field("numeroEquipo"),
    )
}

#[derive(Default)]
struct FakeState {
    rows: Vec<Record>,
    next_id: i64,
    calls: Vec<String>,
    last_payload: Option<Record>,
    fail_next: Option<CrudError>,
    taken: HashSet<String>,
    unique_calls: Vec<Vec<(String, String)>>,
}

/// Resource backed by a vector. Records every call in order.
pub struct FakeApi {
    schema: Arc<EntitySchema>,
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            state: Mutex::new(FakeState {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    pub fn seed(&self, record: Record) {
        let mut st = self.state.lock().unwrap();
        if let Some(id) = record_id(&record) {
            st.next_id = st.next_id.max(id + 1);
        }
        st.rows.push(record);
    }

    pub fn rows(&self) -> Vec<Record> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_payload(&self) -> Option<Record> {
        self.state.lock().unwrap().last_payload.clone()
    }

    pub fn fail_next(&self, err: CrudError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    /// Values `check_unique` reports as already used.
    pub fn set_taken(&self, value: &str) {
        self.state.lock().unwrap().taken.insert(value.to_string());
    }

    pub fn unique_calls(&self) -> Vec<Vec<(String, String)>> {
        self.state.lock().unwrap().unique_calls.clone()
    }

    fn begin(&self, call: String) -> Result<(), CrudError> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(call);
        match st.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceApi for FakeApi {
    fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    async fn list(&self) -> Result<Vec<Record>, CrudError> {
        self.begin("list".into())?;
        Ok(self.rows())
    }

    async fn get(&self, id: i64) -> Result<Record, CrudError> {
        self.begin(format!("get:{}", id))?;
        self.rows()
            .into_iter()
            .find(|r| record_id(r) == Some(id))
            .ok_or(CrudError::Server {
                status: 404,
                message: String::new(),
            })
    }

    async fn create(&self, payload: &Record) -> Result<Record, CrudError> {
        self.begin("create".into())?;
        let mut st = self.state.lock().unwrap();
        st.last_payload = Some(payload.clone());
        let mut row = payload.clone();
        row.insert("id".into(), json!(st.next_id));
        st.next_id += 1;
        st.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, payload: &Record) -> Result<Record, CrudError> {
        self.begin(format!("update:{}", id))?;
        let mut st = self.state.lock().unwrap();
        st.last_payload = Some(payload.clone());
        let row = st
            .rows
            .iter_mut()
            .find(|r| record_id(r) == Some(id))
            .ok_or(CrudError::Server {
                status: 404,
                message: String::new(),
            })?;
        for (k, v) in payload {
            row.insert(k.clone(), v.clone());
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), CrudError> {
        self.begin(format!("delete:{}", id))?;
        self.state.lock().unwrap().rows.retain(|r| record_id(r) != Some(id));
        Ok(())
    }

    async fn query(&self, sub_path: &str, _params: &[(String, String)]) -> Result<Vec<Record>, CrudError> {
        self.begin(format!("query:{}", sub_path))?;
        Ok(self.rows())
    }

    async fn check_unique(&self, check: &UniqueCheck, params: &[(String, String)]) -> Result<bool, CrudError> {
        self.begin(format!("unique:{}", check.field))?;
        let mut st = self.state.lock().unwrap();
        st.unique_calls.push(params.to_vec());
        Ok(params
            .iter()
            .any(|(k, v)| *k == check.field && st.taken.contains(v)))
    }
}

/// Reference collections keyed by reference name.
#[derive(Default)]
pub struct FakeRefs {
    collections: Mutex<BTreeMap<String, Vec<Record>>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, rows: Value) -> Self {
        let rows = match rows {
            Value::Array(items) => items.into_iter().map(rec).collect(),
            other => panic!("not an array: {}", other),
        };
        self.collections.lock().unwrap().insert(name.to_string(), rows);
        self
    }

    pub fn fail(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }
}

#[async_trait]
impl ReferenceApi for FakeRefs {
    async fn list_reference(&self, reference: &Reference) -> Result<Vec<Record>, CrudError> {
        if self.failing.lock().unwrap().contains(&reference.name) {
            return Err(CrudError::Server {
                status: 500,
                message: format!("{} unavailable", reference.name),
            });
        }
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(&reference.name)
            .cloned()
            .unwrap_or_default())
    }
}
