use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use interpose_container::{Component, ResolveError, ServiceProvider};
use serde::Serialize;
use tracing::debug;

use crate::errors::CallResult;
use crate::interceptor::Interceptor;
use crate::invocation::Invocation;
use crate::value::Value;

#[derive(Debug, Default, Clone, Copy)]
struct MethodTiming {
    calls: u64,
    failures: u64,
    total: Duration,
}

/// Per-method call statistics collected by [`TimingInterceptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodStats {
    pub method: String,
    pub calls: u64,
    pub failures: u64,
    pub total_micros: u64,
}

impl MethodStats {
    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.total_micros / self.calls)
    }
}

/// Concurrent store of call timings, shareable between interceptor instances.
#[derive(Debug, Default)]
pub struct TimingRecorder {
    methods: DashMap<String, MethodTiming>,
}

impl TimingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, method: &str, elapsed: Duration, failed: bool) {
        let mut entry = self.methods.entry(method.to_string()).or_default();
        entry.calls += 1;
        entry.total += elapsed;
        if failed {
            entry.failures += 1;
        }
    }

    /// Statistics for every recorded method, sorted by method name.
    pub fn snapshot(&self) -> Vec<MethodStats> {
        let mut stats: Vec<MethodStats> = self
            .methods
            .iter()
            .map(|entry| MethodStats {
                method: entry.key().clone(),
                calls: entry.calls,
                failures: entry.failures,
                total_micros: u64::try_from(entry.total.as_micros()).unwrap_or(u64::MAX),
            })
            .collect();
        stats.sort_by(|a, b| a.method.cmp(&b.method));
        stats
    }

    pub fn calls(&self, method: &str) -> u64 {
        self.methods.get(method).map(|entry| entry.calls).unwrap_or(0)
    }
}

/// Measures the remainder of the chain for each call.
///
/// Uses the provider's [`TimingRecorder`] when one is registered so that results can be read back
/// after the calls; otherwise each interceptor keeps a private recorder.
#[derive(Debug, Clone, Default)]
pub struct TimingInterceptor {
    recorder: Arc<TimingRecorder>,
}

impl TimingInterceptor {
    pub fn new(recorder: Arc<TimingRecorder>) -> Self {
        Self { recorder }
    }

    pub fn recorder(&self) -> &Arc<TimingRecorder> {
        &self.recorder
    }
}

impl Component for TimingInterceptor {
    fn create(provider: &ServiceProvider) -> Result<Self, ResolveError> {
        if provider.is_registered::<TimingRecorder>() {
            return provider.resolve::<TimingRecorder>().map(Self::new);
        }
        Ok(Self::default())
    }
}

impl Interceptor for TimingInterceptor {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        let method = invocation.method();
        let started = Instant::now();
        let outcome = invocation.proceed();
        let elapsed = started.elapsed();

        self.recorder
            .record(&method.to_string(), elapsed, outcome.is_err());
        debug!(
            call_id = %invocation.call_id(),
            %method,
            elapsed_us = elapsed.as_micros() as u64,
            ok = outcome.is_ok(),
            "call timed"
        );
        outcome
    }
}
