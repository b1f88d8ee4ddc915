use std::error::Error as StdError;

use thiserror::Error;

use crate::method::MethodInfo;

pub type CallResult<T> = Result<T, InterceptError>;

/// Failure surfaced by a proxied call.
///
/// The pipeline never creates or wraps these on behalf of interceptors; whatever a stage or the
/// implementation returns reaches the caller as is.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error("method selection convention failed for {method}: {reason}")]
    Convention { method: String, reason: String },
    #[error("{method}: {subject} expected {expected}, found {found}")]
    Conversion {
        method: String,
        subject: String,
        expected: &'static str,
        found: String,
    },
    #[error("{contract} has no member named {method}")]
    UnknownMethod {
        contract: &'static str,
        method: &'static str,
    },
    #[error("{0}")]
    Failure(String),
    #[error(transparent)]
    Source(Box<dyn StdError + Send + Sync>),
}

impl InterceptError {
    pub fn failure(message: impl Into<String>) -> Self {
        InterceptError::Failure(message.into())
    }

    pub fn convention(method: &MethodInfo, reason: impl Into<String>) -> Self {
        InterceptError::Convention {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// A value crossing the proxy did not have the type the member declares.
    pub fn conversion<T: ?Sized>(
        method: &MethodInfo,
        subject: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        InterceptError::Conversion {
            method: method.to_string(),
            subject: subject.into(),
            expected: std::any::type_name::<T>(),
            found: found.into(),
        }
    }

    pub fn source<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        InterceptError::Source(Box::new(err))
    }

    /// Whether repeating the call may succeed. Convention and conversion failures are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InterceptError::Failure(_) | InterceptError::Source(_))
    }
}
