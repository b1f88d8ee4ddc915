//! Greeter demo wired through the interception pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::ValueEnum;
use interpose_container::TypeKey;
use interpose_interception::prelude::*;
use interpose_interception::{
    FnConvention, InterceptBy, LogInterceptor, MethodStats, RetryInterceptor, RetryPolicy,
    ThenInterceptBy, TimingInterceptor, TimingRecorder,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DemoConfig;

contract! {
    pub trait Greeter {
        fn greet(&self, name: String) -> String;
        fn greeted(&self) -> u64;
    }
}

/// Number of calls that reached the real implementation.
#[derive(Debug, Default)]
pub struct CallCounter(AtomicU64);

impl CallCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct SampleGreeter {
    counter: Arc<CallCounter>,
}

impl Component for SampleGreeter {
    fn create(provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(Self {
            counter: provider.resolve::<CallCounter>()?,
        })
    }
}

impl Greeter for SampleGreeter {
    fn greet(&self, name: String) -> CallResult<String> {
        self.counter.bump();
        if name.trim().is_empty() {
            return Err(InterceptError::failure("cannot greet an empty name"));
        }
        Ok(format!("Hello, {}", name))
    }

    fn greeted(&self) -> CallResult<u64> {
        Ok(self.counter.get())
    }
}

/// Upper-cases string results.
#[derive(Debug, Default)]
pub struct UppercaseInterceptor;

impl Component for UppercaseInterceptor {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(Self)
    }
}

impl Interceptor for UppercaseInterceptor {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        let output = invocation.proceed()?;
        match output.downcast_ref::<String>() {
            Some(text) => Ok(Value::new(text.to_uppercase())),
            None => Ok(output),
        }
    }
}

/// Answers `greet` with `"blocked"` without calling further down the chain.
#[derive(Debug, Default)]
pub struct BlockInterceptor;

impl Component for BlockInterceptor {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(Self)
    }
}

impl Interceptor for BlockInterceptor {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        if invocation.method().name() == "greet" {
            return Ok(Value::new("blocked".to_string()));
        }
        invocation.proceed()
    }
}

/// Convention that lets one first-argument value bypass every stage but logging.
pub fn skip_argument_convention(
    argument: Option<String>,
) -> FnConvention<impl Fn(&Invocation<'_>) -> CallResult<bool> + Send + Sync> {
    FnConvention::new(move |invocation: &Invocation<'_>| -> CallResult<bool> {
        let Some(skip) = argument.as_deref() else {
            return Ok(true);
        };
        if invocation.interceptor() == Some(TypeKey::of::<LogInterceptor>()) {
            return Ok(true);
        }
        let matches = invocation
            .argument_ref::<String>(0)
            .map_or(false, |first| first == skip);
        Ok(!matches)
    })
}

/// Interceptors selectable from configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterceptorName {
    Log,
    Timing,
    Retry,
    Uppercase,
    Block,
}

impl InterceptorName {
    pub fn description(self) -> &'static str {
        match self {
            InterceptorName::Log => "logs Before/After events around each call",
            InterceptorName::Timing => "records call counts and durations",
            InterceptorName::Retry => "proceeds again after retryable failures",
            InterceptorName::Uppercase => "upper-cases string results",
            InterceptorName::Block => "answers greet with \"blocked\"",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InterceptorName::Log => "log",
            InterceptorName::Timing => "timing",
            InterceptorName::Retry => "retry",
            InterceptorName::Uppercase => "uppercase",
            InterceptorName::Block => "block",
        }
    }

    fn start<'a>(self, by: &'a mut InterceptBy<'_>) -> ThenInterceptBy<'a> {
        match self {
            InterceptorName::Log => by.intercept_by::<LogInterceptor>(),
            InterceptorName::Timing => by.intercept_by::<TimingInterceptor>(),
            InterceptorName::Retry => by.intercept_by::<RetryInterceptor>(),
            InterceptorName::Uppercase => by.intercept_by::<UppercaseInterceptor>(),
            InterceptorName::Block => by.intercept_by::<BlockInterceptor>(),
        }
    }

    fn append(self, chain: ThenInterceptBy<'_>) -> ThenInterceptBy<'_> {
        match self {
            InterceptorName::Log => chain.then_by::<LogInterceptor>(),
            InterceptorName::Timing => chain.then_by::<TimingInterceptor>(),
            InterceptorName::Retry => chain.then_by::<RetryInterceptor>(),
            InterceptorName::Uppercase => chain.then_by::<UppercaseInterceptor>(),
            InterceptorName::Block => chain.then_by::<BlockInterceptor>(),
        }
    }
}

/// Everything `interpose run` reports.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub chain: Vec<InterceptorName>,
    pub greetings: Vec<String>,
    pub implementation_calls: u64,
    pub timings: Vec<MethodStats>,
}

/// A resolved demo: the proxied greeter plus the shared state it reports from.
pub struct Demo {
    greeter: Arc<dyn Greeter>,
    counter: Arc<CallCounter>,
    recorder: Arc<TimingRecorder>,
    chain: Vec<InterceptorName>,
}

impl Demo {
    pub fn build(config: &DemoConfig) -> Result<Self, ResolveError> {
        let counter = Arc::new(CallCounter::default());
        let recorder = Arc::new(TimingRecorder::new());

        let mut services = ServiceCollection::new();
        services
            .add_instance(Arc::clone(&counter))
            .add_instance(Arc::clone(&recorder))
            .add_instance(Arc::new(config.interceptor_log_level))
            .add_instance(Arc::new(RetryPolicy {
                max_retries: config.retry_attempts,
            }));

        let chain = config.chain.clone();
        let convention = skip_argument_convention(config.skip_argument.clone());
        let names = chain.clone();
        services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(move |by| {
            let mut names = names.into_iter();
            if let Some(first) = names.next() {
                let mut then = first.start(by);
                for name in names {
                    then = name.append(then);
                }
                then.with_convention(convention);
            }
        });

        let provider = services.build();
        let greeter = provider.resolve::<dyn Greeter>()?;
        info!(
            interceptors = chain.len(),
            level = ?config.interceptor_log_level,
            "demo greeter resolved"
        );
        Ok(Self {
            greeter,
            counter,
            recorder,
            chain,
        })
    }

    pub fn greeter(&self) -> &Arc<dyn Greeter> {
        &self.greeter
    }

    /// Greet `name` `repeat` times through the proxy.
    pub fn run(&self, name: &str, repeat: u64) -> CallResult<DemoReport> {
        let greetings = (0..repeat)
            .map(|_| self.greeter.greet(name.to_string()))
            .collect::<CallResult<Vec<_>>>()?;
        Ok(DemoReport {
            chain: self.chain.clone(),
            greetings,
            implementation_calls: self.counter.get(),
            timings: self.recorder.snapshot(),
        })
    }
}
