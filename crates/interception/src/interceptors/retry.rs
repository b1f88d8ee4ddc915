use std::sync::Arc;

use interpose_container::{Component, ResolveError, ServiceProvider};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CallResult;
use crate::interceptor::Interceptor;
use crate::invocation::Invocation;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

/// Proceeds again when the rest of the chain fails with a retryable error.
#[derive(Debug, Clone, Default)]
pub struct RetryInterceptor {
    policy: RetryPolicy,
}

impl RetryInterceptor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl Component for RetryInterceptor {
    fn create(provider: &ServiceProvider) -> Result<Self, ResolveError> {
        let policy = if provider.is_registered::<RetryPolicy>() {
            provider.resolve::<RetryPolicy>().map(|policy: Arc<RetryPolicy>| *policy)?
        } else {
            RetryPolicy::default()
        };
        Ok(Self::new(policy))
    }
}

impl Interceptor for RetryInterceptor {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        let mut attempt = 0;
        loop {
            match invocation.proceed() {
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    warn!(
                        call_id = %invocation.call_id(),
                        method = %invocation.method(),
                        attempt,
                        error = %err,
                        "retrying failed call"
                    );
                }
                outcome => return outcome,
            }
        }
    }
}
