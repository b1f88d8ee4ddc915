use std::any::Any;
use std::sync::Arc;

use crate::errors::ResolveError;
use crate::key::TypeKey;
use crate::provider::ServiceProvider;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifetime {
    /// A new instance on every resolution.
    #[default]
    Transient,
    /// One instance per provider, created on first resolution.
    Singleton,
}

/// Type-erased instance; the payload is always an `Arc<T>` for the registered `T`.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type Factory =
    Arc<dyn Fn(&ServiceProvider) -> Result<Instance, ResolveError> + Send + Sync + 'static>;

#[derive(Clone)]
pub(crate) struct ServiceDescriptor {
    pub key: TypeKey,
    pub lifetime: Lifetime,
    pub factory: Factory,
}
