pub mod domain;
pub mod errors;
pub mod oracle_reply;
pub mod ports;
pub mod services;

pub use errors::CoreError;
