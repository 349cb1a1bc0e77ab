//! ERP Megui entity catalog.
//!
//! Every business module of the ERP is one [`EntitySchema`]; the generic
//! engine in `megui-crud` does the rest.

pub mod model;

use std::sync::Arc;

use tracing::debug;

use megui_core::CrudError;
use megui_schema::{EntitySchema, SchemaError, validate_schema};

/// The registered entity schemas, in menu order.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<Arc<EntitySchema>>,
}

impl Catalog {
    pub fn new(entities: Vec<EntitySchema>) -> Self {
        Self {
            entities: entities.into_iter().map(Arc::new).collect(),
        }
    }

    /// Every ERP Megui entity.
    pub fn megui() -> Self {
        Self::new(vec![
            model::empresas(),
            model::monedas(),
            model::cargos(),
            model::personal(),
            model::configuracion_cuenta_contable(),
            model::acceso_instalacion_detalle(),
            model::equipos(),
            model::lista_precios(),
            model::tarifas_ruta(),
            model::liquidaciones_faena(),
            model::tripulantes(),
            model::documentos_personal(),
        ])
    }

    pub fn entities(&self) -> &[Arc<EntitySchema>] {
        &self.entities
    }

    /// Find an entity by singular name, path or alias (case-insensitive).
    pub fn lookup(&self, name: &str) -> Option<Arc<EntitySchema>> {
        let found = self.entities.iter().find(|e| e.answers_to(name.trim())).cloned();
        if found.is_none() {
            debug!(name, "no entity registered under this name");
        }
        found
    }

    /// Like [`lookup`](Self::lookup), as an error for callers that
    /// propagate.
    pub fn resolve(&self, name: &str) -> Result<Arc<EntitySchema>, CrudError> {
        self.lookup(name)
            .ok_or_else(|| CrudError::UnknownEntity(name.to_string()))
    }

    /// Declaration errors across all entities, plus names claimed by more
    /// than one entity.
    pub fn validate(&self) -> Vec<SchemaError> {
        let mut errors: Vec<SchemaError> = self.entities.iter().flat_map(|e| validate_schema(e)).collect();

        let mut claimed: Vec<(&str, &str)> = Vec::new();
        for e in &self.entities {
            let names = std::iter::once(e.name.as_str())
                .chain(std::iter::once(e.path.as_str()))
                .chain(e.aliases.iter().map(String::as_str));
            for n in names {
                match claimed.iter().find(|(c, _)| *c == n) {
                    Some((_, owner)) if *owner != e.name => errors.push(SchemaError {
                        message: format!("name '{}' already used by '{}'", n, owner),
                        context: e.name.clone(),
                    }),
                    Some(_) => {}
                    None => claimed.push((n, e.name.as_str())),
                }
            }
        }
        errors
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::megui()
    }
}
