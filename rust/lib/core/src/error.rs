use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Callers match on these,
// never on the human-readable message string.

/// Stable error code constants.
pub mod error_code {
    pub const NETWORK: &str = "NETWORK";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const REJECTED: &str = "REJECTED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const DECODE_FAILED: &str = "DECODE_FAILED";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const CONFIG: &str = "CONFIG";
    pub const UNKNOWN_ENTITY: &str = "UNKNOWN_ENTITY";
}

// ── FieldError ──────────────────────────────────────────────────────

/// A client-side validation failure attached to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the offending field (e.g. `nombre`).
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ── ErrorClass ──────────────────────────────────────────────────────

/// The three failure classes a screen can run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// No response was received.
    Transport,
    /// The server answered with a non-2xx status or an unreadable body.
    Http,
    /// Caught before any network call.
    Client,
}

// ── CrudError ───────────────────────────────────────────────────────

/// Unified error type for every CRUD operation.
///
/// Transport and HTTP failures are produced by the resource client and
/// passed through unchanged; validation and authorization failures are
/// produced locally before any request is sent.
#[derive(Error, Debug)]
pub enum CrudError {
    /// The request never got a response. No retry is attempted.
    #[error("network: {0}")]
    Network(String),

    /// The server rejected the request.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("decode: {0}")]
    Decode(String),

    /// One or more fields failed client-side validation.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// The current session may not perform this action.
    #[error("{0}")]
    Forbidden(String),

    /// Missing or malformed configuration.
    #[error("config: {0}")]
    Config(String),

    /// No schema is registered under the given name.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CrudError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            CrudError::Network(_) => error_code::NETWORK,
            CrudError::Server { status, .. } => match *status {
                401 => error_code::UNAUTHENTICATED,
                403 => error_code::PERMISSION_DENIED,
                404 => error_code::NOT_FOUND,
                409 => error_code::CONFLICT,
                400..=499 => error_code::REJECTED,
                _ => error_code::SERVER_ERROR,
            },
            CrudError::Decode(_) => error_code::DECODE_FAILED,
            CrudError::Validation(_) => error_code::VALIDATION_FAILED,
            CrudError::Forbidden(_) => error_code::FORBIDDEN,
            CrudError::Config(_) => error_code::CONFIG,
            CrudError::UnknownEntity(_) => error_code::UNKNOWN_ENTITY,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            CrudError::Network(_) => ErrorClass::Transport,
            CrudError::Server { .. } | CrudError::Decode(_) => ErrorClass::Http,
            CrudError::Validation(_)
            | CrudError::Forbidden(_)
            | CrudError::Config(_)
            | CrudError::UnknownEntity(_) => ErrorClass::Client,
        }
    }

    /// Field errors carried by a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CrudError::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// Text suitable for a toast. Server-supplied messages win over the
    /// generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            CrudError::Network(_) => "No se pudo conectar con el servidor".to_string(),
            CrudError::Server { message, .. } if !message.trim().is_empty() => {
                message.trim().to_string()
            }
            CrudError::Server { status, .. } => format!("El servidor respondió {}", status),
            CrudError::Decode(_) => "Respuesta inválida del servidor".to_string(),
            CrudError::Validation(errors) => match errors.len() {
                1 => format!("Revise el campo {}", errors[0].field),
                n => format!("Revise {} campos del formulario", n),
            },
            CrudError::Forbidden(msg) | CrudError::Config(msg) => msg.clone(),
            CrudError::UnknownEntity(name) => format!("Entidad desconocida: {}", name),
        }
    }
}
