pub mod context;
pub mod output;
pub mod resource;
pub mod session;
