use std::time::{Duration, Instant};

use super::types::RequestContext;
use crate::policy::TimeoutPolicy;
use crate::shared::millis;

/// Stamps outgoing requests with their timeout and start time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestInterceptor {
    policy: TimeoutPolicy,
}

impl RequestInterceptor {
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    /// Computes the request's timeout and records it together with the
    /// start time in `ctx.metadata`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The request about to be sent
    ///
    /// # Returns
    ///
    /// The timeout that was stamped.
    pub fn prepare(&self, ctx: &mut RequestContext) -> Duration {
        let timeout = self
            .policy
            .timeout_for(&ctx.method, &ctx.url, ctx.content_type());
        ctx.metadata.timeout = Some(timeout);
        ctx.metadata.start_time = Some(Instant::now());

        tracing::debug!(
            method = %ctx.method,
            url = %ctx.url,
            timeout_ms = millis(timeout),
            "Dispatching request"
        );
        timeout
    }
}
