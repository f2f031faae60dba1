pub mod handler;
pub mod interceptor;
pub mod service;
pub mod transport;
pub mod types;

pub use handler::{http_user_message, timeout_message, ResponseHandler, Settlement};
pub use interceptor::RequestInterceptor;
pub use service::HttpClient;
pub use transport::{BoxFuture, ReqwestTransport, Transport};
pub use types::*;
