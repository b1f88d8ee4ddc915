use crate::errors::CallResult;
use crate::invocation::Invocation;
use crate::value::Value;

/// A stage of cross-cutting behaviour around contract calls.
///
/// Call [`Invocation::proceed`] to continue down the chain; returning without it short-circuits
/// the call and the returned value becomes the result. Instances are shared by concurrent calls
/// on the same proxy, so any state must carry its own synchronisation.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value>;
}
