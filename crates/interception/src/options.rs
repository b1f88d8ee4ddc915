//! Declarative interception settings for one contract.
//!
//! The builder is staged: registration code receives an [`InterceptBy`], which can only start a
//! chain. Starting a chain yields a [`ThenInterceptBy`], which can only extend that chain or pick
//! the method-selection convention.

use std::fmt;
use std::sync::Arc;

use interpose_container::{Component, ResolveError, ServiceCollection, ServiceProvider, TypeKey};
use tracing::warn;

use crate::convention::{DefaultMethodSelectionConvention, MethodSelectionConvention};
use crate::interceptor::Interceptor;

/// How to register and resolve one interceptor type.
#[derive(Clone, Copy)]
pub struct InterceptorBinding {
    key: TypeKey,
    register: fn(&mut ServiceCollection),
    resolve: fn(&ServiceProvider) -> Result<Arc<dyn Interceptor>, ResolveError>,
}

impl InterceptorBinding {
    pub fn of<I>() -> Self
    where
        I: Interceptor + Component,
    {
        Self {
            key: TypeKey::of::<I>(),
            register: register_interceptor::<I>,
            resolve: resolve_interceptor::<I>,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Register the interceptor as a transient component unless the caller already did.
    pub fn register(&self, services: &mut ServiceCollection) {
        (self.register)(services)
    }

    pub fn resolve(
        &self,
        provider: &ServiceProvider,
    ) -> Result<Arc<dyn Interceptor>, ResolveError> {
        (self.resolve)(provider)
    }
}

impl fmt::Debug for InterceptorBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InterceptorBinding")
            .field(&self.key.name())
            .finish()
    }
}

fn register_interceptor<I: Interceptor + Component>(services: &mut ServiceCollection) {
    services.try_add_transient::<I>();
}

fn resolve_interceptor<I: Interceptor + Component>(
    provider: &ServiceProvider,
) -> Result<Arc<dyn Interceptor>, ResolveError> {
    provider
        .resolve::<I>()
        .map(|interceptor| interceptor as Arc<dyn Interceptor>)
}

/// Ordered, duplicate-free interceptor types plus one convention.
#[derive(Clone)]
pub struct InterceptionOptions {
    interceptors: Vec<InterceptorBinding>,
    convention: Arc<dyn MethodSelectionConvention>,
}

impl Default for InterceptionOptions {
    fn default() -> Self {
        Self {
            interceptors: Vec::new(),
            convention: Arc::new(DefaultMethodSelectionConvention),
        }
    }
}

impl InterceptionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options by running a registration action against the staged builder.
    pub fn configure<F>(action: F) -> Self
    where
        F: FnOnce(&mut InterceptBy<'_>),
    {
        let mut options = Self::new();
        action(&mut InterceptBy {
            options: &mut options,
        });
        options
    }

    pub fn bindings(&self) -> &[InterceptorBinding] {
        &self.interceptors
    }

    pub fn interceptor_types(&self) -> Vec<TypeKey> {
        self.interceptors.iter().map(InterceptorBinding::key).collect()
    }

    pub fn convention(&self) -> &Arc<dyn MethodSelectionConvention> {
        &self.convention
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    fn start(&mut self, binding: InterceptorBinding) {
        self.interceptors.clear();
        self.interceptors.push(binding);
    }

    fn append(&mut self, binding: InterceptorBinding) {
        if self.interceptors.iter().any(|bound| bound.key == binding.key) {
            warn!(
                interceptor = binding.key.name(),
                "interceptor already present in chain; ignoring duplicate"
            );
            return;
        }
        self.interceptors.push(binding);
    }
}

impl fmt::Debug for InterceptionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionOptions")
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}

/// Entry stage of the builder.
pub struct InterceptBy<'a> {
    options: &'a mut InterceptionOptions,
}

impl InterceptBy<'_> {
    /// Discard any chain declared so far and start a new one with `I`.
    pub fn intercept_by<I>(&mut self) -> ThenInterceptBy<'_>
    where
        I: Interceptor + Component,
    {
        self.options.start(InterceptorBinding::of::<I>());
        ThenInterceptBy {
            options: &mut *self.options,
        }
    }
}

/// Chain-extension stage of the builder.
pub struct ThenInterceptBy<'a> {
    options: &'a mut InterceptionOptions,
}

impl ThenInterceptBy<'_> {
    /// Append `I` to the chain. A type already in the chain is ignored.
    pub fn then_by<I>(self) -> Self
    where
        I: Interceptor + Component,
    {
        self.options.append(InterceptorBinding::of::<I>());
        self
    }

    /// Replace the convention with a default-constructed `C`.
    pub fn use_method_selection_convention<C>(self)
    where
        C: MethodSelectionConvention + Default + 'static,
    {
        self.options.convention = Arc::new(C::default());
    }

    /// Replace the convention with a prepared instance.
    pub fn with_convention<C>(self, convention: C)
    where
        C: MethodSelectionConvention + 'static,
    {
        self.options.convention = Arc::new(convention);
    }
}
