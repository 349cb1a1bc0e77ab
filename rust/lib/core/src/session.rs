//! Session access for the CRUD engine.
//!
//! The engine does NOT own tokens or users. It only reads them through
//! [`SessionSource`]; the concrete store is injected at startup time.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// The signed-in user as exposed by the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub es_super_usuario: bool,
    #[serde(default)]
    pub es_admin: bool,
}

/// Authorization predicate for destructive actions.
///
/// The only place the super-user / admin rule lives. The server stays
/// the final authority; this only decides what the client offers.
pub fn can_delete(usuario: Option<&Usuario>) -> bool {
    usuario.is_some_and(|u| u.es_super_usuario || u.es_admin)
}

/// Read-only view of the session store. Called before every request.
///
/// Returning `None` from `token` skips the Authorization header.
pub trait SessionSource: Send + Sync + 'static {
    fn token(&self) -> Option<String>;
    fn usuario(&self) -> Option<Usuario>;
}

/// No session. Requests go out without an Authorization header.
pub struct Anonymous;

impl SessionSource for Anonymous {
    fn token(&self) -> Option<String> {
        None
    }

    fn usuario(&self) -> Option<Usuario> {
        None
    }
}

/// A session obtained elsewhere and fixed for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    pub token: Option<String>,
    pub usuario: Option<Usuario>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>, usuario: Usuario) -> Self {
        Self {
            token: Some(token.into()),
            usuario: Some(usuario),
        }
    }
}

impl SessionSource for StaticSession {
    fn token(&self) -> Option<String> {
        self.token.clone().filter(|t| !t.is_empty())
    }

    fn usuario(&self) -> Option<Usuario> {
        self.usuario.clone()
    }
}

/// A session the owning auth layer can swap at any time. Readers always
/// see the latest value.
#[derive(Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<StaticSession>>,
}

impl SharedSession {
    pub fn new(session: StaticSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Replace the current session.
    pub fn replace(&self, session: StaticSession) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = session;
        }
    }
}

impl SessionSource for SharedSession {
    fn token(&self) -> Option<String> {
        self.inner.read().ok().and_then(|s| s.token())
    }

    fn usuario(&self) -> Option<Usuario> {
        self.inner.read().ok().and_then(|s| s.usuario())
    }
}
