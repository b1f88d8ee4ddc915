use std::sync::Arc;

use interpose_container::TypeKey;
use tracing::trace;
use uuid::Uuid;

use crate::contract::{Contract, InvocationHandler};
use crate::convention::MethodSelectionConvention;
use crate::errors::CallResult;
use crate::interceptor::Interceptor;
use crate::invocation::Invocation;
use crate::method::MethodInfo;
use crate::value::Value;

/// The real member call at the end of a chain.
pub type Target<'a> = dyn Fn(&'static MethodInfo, Vec<Value>) -> CallResult<Value> + 'a;

struct Stage {
    key: TypeKey,
    interceptor: Arc<dyn Interceptor>,
}

/// Ordered interceptors plus the convention that gates each of them.
pub struct InterceptorChain {
    stages: Vec<Stage>,
    convention: Arc<dyn MethodSelectionConvention>,
}

impl InterceptorChain {
    pub fn new(convention: Arc<dyn MethodSelectionConvention>) -> Self {
        Self {
            stages: Vec::new(),
            convention,
        }
    }

    /// Append a stage; stages run in the order they are pushed, outermost first.
    pub fn push(&mut self, key: TypeKey, interceptor: Arc<dyn Interceptor>) {
        self.stages.push(Stage { key, interceptor });
    }

    pub fn with_stage(mut self, key: TypeKey, interceptor: Arc<dyn Interceptor>) -> Self {
        self.push(key, interceptor);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run one call through the chain and into `target`.
    pub fn run(
        &self,
        method: &'static MethodInfo,
        arguments: Vec<Value>,
        target: &Target<'_>,
    ) -> CallResult<Value> {
        self.dispatch(Uuid::new_v4(), method, arguments, 0, target)
    }

    pub(crate) fn dispatch<'a>(
        &'a self,
        call_id: Uuid,
        method: &'static MethodInfo,
        arguments: Vec<Value>,
        from: usize,
        target: &'a Target<'a>,
    ) -> CallResult<Value> {
        let mut invocation = Invocation {
            call_id,
            method,
            arguments,
            stage: None,
            next: from,
            chain: self,
            target,
        };

        while let Some(stage) = self.stages.get(invocation.next) {
            invocation.next += 1;
            invocation.stage = Some(stage.key);
            if self.convention.has_support(&invocation)? {
                trace!(%call_id, %method, interceptor = stage.key.short_name(), "intercepting");
                return stage.interceptor.intercept(&mut invocation);
            }
            trace!(
                %call_id,
                %method,
                interceptor = stage.key.short_name(),
                "skipped by method selection convention"
            );
        }

        trace!(%call_id, %method, "invoking target");
        target(method, invocation.arguments)
    }
}

/// Invocation handler behind a generated proxy: a chain in front of one implementation.
pub struct Pipeline<C: ?Sized + Contract> {
    chain: InterceptorChain,
    target: Arc<C>,
}

impl<C: ?Sized + Contract> Pipeline<C> {
    pub fn new(chain: InterceptorChain, target: Arc<C>) -> Self {
        Self { chain, target }
    }

    pub fn into_proxy(self) -> Arc<C> {
        C::create_proxy(Arc::new(self))
    }
}

impl<C: ?Sized + Contract> InvocationHandler for Pipeline<C> {
    fn invoke(&self, method: &'static MethodInfo, arguments: Vec<Value>) -> CallResult<Value> {
        let target = |method: &'static MethodInfo, arguments: Vec<Value>| {
            self.target.dispatch(method, arguments)
        };
        self.chain.run(method, arguments, &target)
    }
}
