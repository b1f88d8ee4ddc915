use interpose_container::{Component, ResolveError, ServiceProvider};
use serde::{Deserialize, Serialize};

use crate::errors::CallResult;
use crate::interceptor::Interceptor;
use crate::invocation::Invocation;
use crate::value::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)+),
            LogLevel::Debug => tracing::debug!($($arg)+),
            LogLevel::Info => tracing::info!($($arg)+),
            LogLevel::Warn => tracing::warn!($($arg)+),
            LogLevel::Error => tracing::error!($($arg)+),
        }
    };
}

/// Logs `Before <method>` and `After <method>` around every intercepted call.
///
/// The level comes from a registered [`LogLevel`] when the provider has one.
#[derive(Debug, Clone, Default)]
pub struct LogInterceptor {
    level: LogLevel,
}

impl LogInterceptor {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl Component for LogInterceptor {
    fn create(provider: &ServiceProvider) -> Result<Self, ResolveError> {
        let level = if provider.is_registered::<LogLevel>() {
            *provider.resolve::<LogLevel>()?
        } else {
            LogLevel::default()
        };
        Ok(Self::new(level))
    }
}

impl Interceptor for LogInterceptor {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        let call_id = invocation.call_id();
        let method = invocation.method();

        log_at!(self.level, %call_id, %method, "Before {}", method.name());
        let outcome = invocation.proceed();
        match &outcome {
            Ok(_) => log_at!(self.level, %call_id, %method, "After {}", method.name()),
            Err(err) => tracing::warn!(%call_id, %method, error = %err, "{} failed", method.name()),
        }
        outcome
    }
}
