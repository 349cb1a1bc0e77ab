pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod types;

pub use config::{API_URL_ENV, ApiConfig};
pub use error::{CrudError, ErrorClass, FieldError};
pub use notify::{Notification, Notifier, RecordingNotifier, Severity};
pub use session::{Anonymous, SessionSource, SharedSession, StaticSession, Usuario, can_delete};
pub use types::{ListEnvelope, Record, coerce_id, parse_collection, parse_record, record_id};
