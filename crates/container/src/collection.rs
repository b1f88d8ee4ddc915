use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::errors::ResolveError;
use crate::key::TypeKey;
use crate::model::{Instance, Lifetime, ServiceDescriptor};
use crate::provider::{Component, ServiceProvider};

/// Mutable set of registrations, frozen by [`ServiceCollection::build`].
#[derive(Default)]
pub struct ServiceCollection {
    descriptors: HashMap<TypeKey, ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `T`, replacing any earlier registration of the same type.
    pub fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, ResolveError> + Send + Sync + 'static,
    {
        let descriptor = describe::<T, F>(lifetime, factory);
        let key = descriptor.key;
        if self.descriptors.insert(key, descriptor).is_some() {
            debug!(service = key.name(), "replaced existing registration");
        } else {
            debug!(service = key.name(), ?lifetime, "registered service");
        }
        self
    }

    /// Register a factory for `T` unless `T` is already registered.
    pub fn try_add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, ResolveError> + Send + Sync + 'static,
    {
        if self.contains::<T>() {
            debug!(
                service = TypeKey::of::<T>().name(),
                "registration already present; keeping it"
            );
            return self;
        }
        self.add_factory::<T, F>(lifetime, factory)
    }

    pub fn add_transient<T: Component>(&mut self) -> &mut Self {
        self.add_factory::<T, _>(Lifetime::Transient, component_factory::<T>)
    }

    pub fn add_singleton<T: Component>(&mut self) -> &mut Self {
        self.add_factory::<T, _>(Lifetime::Singleton, component_factory::<T>)
    }

    pub fn try_add_transient<T: Component>(&mut self) -> &mut Self {
        self.try_add_factory::<T, _>(Lifetime::Transient, component_factory::<T>)
    }

    pub fn try_add_singleton<T: Component>(&mut self) -> &mut Self {
        self.try_add_factory::<T, _>(Lifetime::Singleton, component_factory::<T>)
    }

    /// Register an already constructed instance; every resolution returns it.
    pub fn add_instance<T>(&mut self, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_factory::<T, _>(Lifetime::Singleton, move |_| Ok(Arc::clone(&instance)))
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.descriptors.contains_key(&TypeKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn build(self) -> ServiceProvider {
        ServiceProvider::from_descriptors(self.descriptors.into_values())
    }
}

fn component_factory<T: Component>(provider: &ServiceProvider) -> Result<Arc<T>, ResolveError> {
    T::create(provider).map(Arc::new)
}

fn describe<T, F>(lifetime: Lifetime, factory: F) -> ServiceDescriptor
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ServiceProvider) -> Result<Arc<T>, ResolveError> + Send + Sync + 'static,
{
    ServiceDescriptor {
        key: TypeKey::of::<T>(),
        lifetime,
        factory: Arc::new(move |provider| {
            factory(provider).map(|instance| Arc::new(instance) as Instance)
        }),
    }
}
