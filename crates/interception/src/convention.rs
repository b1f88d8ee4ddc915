//! Method-selection conventions decide, per call and per stage, whether an interceptor runs.

use crate::errors::CallResult;
use crate::invocation::Invocation;

/// Predicate consulted before every stage of every call.
///
/// Implementations must be pure: the result is never cached and the same instance serves
/// concurrent calls. An `Err` fails the call; it is not read as "skip".
pub trait MethodSelectionConvention: Send + Sync {
    fn has_support(&self, invocation: &Invocation<'_>) -> CallResult<bool>;
}

/// Intercepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMethodSelectionConvention;

impl MethodSelectionConvention for DefaultMethodSelectionConvention {
    fn has_support(&self, _invocation: &Invocation<'_>) -> CallResult<bool> {
        Ok(true)
    }
}

/// Convention backed by a closure.
pub struct FnConvention<F> {
    predicate: F,
}

impl<F> FnConvention<F> {
    pub fn new(predicate: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> CallResult<bool> + Send + Sync,
    {
        Self { predicate }
    }
}

impl<F> MethodSelectionConvention for FnConvention<F>
where
    F: Fn(&Invocation<'_>) -> CallResult<bool> + Send + Sync,
{
    fn has_support(&self, invocation: &Invocation<'_>) -> CallResult<bool> {
        (self.predicate)(invocation)
    }
}
