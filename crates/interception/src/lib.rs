//! Interception pipeline for the interpose kernel
//!
//! A contract declared with [`contract!`] can be registered against a
//! [`ServiceCollection`](interpose_container::ServiceCollection) together with an ordered chain of
//! [`Interceptor`]s. Resolving the contract yields a generated proxy; every call on it walks the
//! chain, outermost interceptor first, before reaching the implementation. A
//! [`MethodSelectionConvention`] decides per call and per stage whether an interceptor runs.

pub mod contract;
pub mod convention;
pub mod errors;
pub mod factory;
pub mod interceptor;
pub mod interceptors;
pub mod invocation;
pub mod method;
pub mod options;
pub mod pipeline;
pub mod prelude;
pub mod registration;
pub mod value;

pub use contract::{Contract, InvocationHandler, Upcast};
pub use convention::{DefaultMethodSelectionConvention, FnConvention, MethodSelectionConvention};
pub use errors::{CallResult, InterceptError};
pub use factory::{build_proxy, build_registration};
pub use interceptor::Interceptor;
pub use interceptors::{
    LogInterceptor, LogLevel, MethodStats, RetryInterceptor, RetryPolicy, TimingInterceptor,
    TimingRecorder,
};
pub use invocation::Invocation;
pub use method::MethodInfo;
pub use options::{InterceptBy, InterceptionOptions, InterceptorBinding, ThenInterceptBy};
pub use pipeline::{InterceptorChain, Pipeline, Target};
pub use registration::InterceptionServiceCollectionExt;
pub use value::Value;
