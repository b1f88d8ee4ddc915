use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::errors::ResolveError;
use crate::key::TypeKey;
use crate::model::{Instance, Lifetime, ServiceDescriptor};

/// A concrete type the container can build by type alone.
///
/// Dependencies are pulled from the provider passed to [`Component::create`].
pub trait Component: Sized + Send + Sync + 'static {
    fn create(provider: &ServiceProvider) -> Result<Self, ResolveError>;
}

struct ProviderEntry {
    descriptor: ServiceDescriptor,
    singleton: OnceCell<Instance>,
}

/// Frozen registrations. Safe to share across threads.
///
/// A singleton factory that resolves its own type blocks forever; registrations must be acyclic.
pub struct ServiceProvider {
    entries: HashMap<TypeKey, ProviderEntry>,
}

impl ServiceProvider {
    pub(crate) fn from_descriptors(
        descriptors: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> Self {
        let entries = descriptors
            .into_iter()
            .map(|descriptor| {
                (
                    descriptor.key,
                    ProviderEntry {
                        descriptor,
                        singleton: OnceCell::new(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn resolve<T>(&self) -> Result<Arc<T>, ResolveError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        let entry = self
            .entries
            .get(&key)
            .ok_or_else(|| ResolveError::not_registered(key))?;

        let instance = match entry.descriptor.lifetime {
            Lifetime::Transient => (entry.descriptor.factory)(self)?,
            Lifetime::Singleton => Arc::clone(
                entry
                    .singleton
                    .get_or_try_init(|| (entry.descriptor.factory)(self))?,
            ),
        };
        trace!(service = key.name(), lifetime = ?entry.descriptor.lifetime, "resolved service");

        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ResolveError::TypeMismatch {
                type_name: key.name(),
            })
    }

    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
