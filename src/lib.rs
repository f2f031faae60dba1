pub mod cert_errors;
pub mod client;
pub mod config;
pub mod error;
pub mod infra;
pub mod policy;
pub mod report;
pub mod routes;
pub mod shared;

pub use cert_errors::{CertErrorCode, CertErrorTranslator};
pub use client::{HttpClient, Outcome, ReqwestTransport, RequestContext, Transport};
pub use config::Config;
pub use error::{ClientError, TransportError};
pub use policy::{request_timeout, RequestClass, TimeoutPolicy};
pub use report::handle_global_error;
