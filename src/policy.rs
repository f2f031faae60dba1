//! Per-request timeout policy.
//!
//! Every outgoing request is sorted into a [`RequestClass`] and the class
//! decides how long the transport may wait. Uploads get the longest budget
//! regardless of method.

use serde::Serialize;
use std::time::Duration;

use crate::client::types::HttpMethod;

/// URL fragments that mark a request as a file transfer.
pub const UPLOAD_PATH_MARKERS: [&str; 2] = ["/upload", "/file"];

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Request class used to pick a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestClass {
    Get,
    Post,
    Put,
    Delete,
    Upload,
    Default,
}

impl RequestClass {
    pub const ALL: [RequestClass; 6] = [
        RequestClass::Get,
        RequestClass::Post,
        RequestClass::Put,
        RequestClass::Delete,
        RequestClass::Upload,
        RequestClass::Default,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestClass::Get => "GET",
            RequestClass::Post => "POST",
            RequestClass::Put => "PUT",
            RequestClass::Delete => "DELETE",
            RequestClass::Upload => "UPLOAD",
            RequestClass::Default => "DEFAULT",
        }
    }
}

/// Immutable mapping from request class to timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub get: Duration,
    pub post: Duration,
    pub put: Duration,
    pub delete: Duration,
    pub upload: Duration,
    pub default: Duration,
}

impl TimeoutPolicy {
    pub const STANDARD: TimeoutPolicy = TimeoutPolicy {
        get: Duration::from_secs(10),
        post: Duration::from_secs(15),
        put: Duration::from_secs(20),
        delete: Duration::from_secs(10),
        upload: Duration::from_secs(60),
        default: Duration::from_secs(15),
    };

    /// The timeout configured for `class`.
    pub fn duration(&self, class: RequestClass) -> Duration {
        match class {
            RequestClass::Get => self.get,
            RequestClass::Post => self.post,
            RequestClass::Put => self.put,
            RequestClass::Delete => self.delete,
            RequestClass::Upload => self.upload,
            RequestClass::Default => self.default,
        }
    }

    /// Sorts a request into its class. The upload rule wins over the
    /// method.
    pub fn classify(method: &HttpMethod, url: &str, content_type: Option<&str>) -> RequestClass {
        let is_upload = UPLOAD_PATH_MARKERS.iter().any(|marker| url.contains(marker))
            || content_type.is_some_and(|ct| ct.contains(MULTIPART_FORM_DATA));
        if is_upload {
            return RequestClass::Upload;
        }

        match method {
            HttpMethod::Get => RequestClass::Get,
            HttpMethod::Post => RequestClass::Post,
            HttpMethod::Put => RequestClass::Put,
            HttpMethod::Delete => RequestClass::Delete,
            HttpMethod::Other(_) => RequestClass::Default,
        }
    }

    pub fn timeout_for(
        &self,
        method: &HttpMethod,
        url: &str,
        content_type: Option<&str>,
    ) -> Duration {
        self.duration(Self::classify(method, url, content_type))
    }

    /// The table as `(class, milliseconds)` pairs.
    pub fn table_ms(&self) -> Vec<(RequestClass, u64)> {
        RequestClass::ALL
            .iter()
            .map(|&class| (class, self.duration(class).as_millis() as u64))
            .collect()
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Resolves a timeout with the standard policy, for request sites that do
/// not go through [`HttpClient`](crate::client::HttpClient).
pub fn request_timeout(method: &HttpMethod, url: &str, content_type: Option<&str>) -> Duration {
    TimeoutPolicy::STANDARD.timeout_for(method, url, content_type)
}
