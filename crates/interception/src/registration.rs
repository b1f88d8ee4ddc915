//! `ServiceCollection` extensions that wire a contract, its implementation and an interception
//! chain together.

use interpose_container::{Component, Lifetime, ServiceCollection};

use crate::contract::{Contract, Upcast};
use crate::factory::build_registration;
use crate::interceptors::LogInterceptor;
use crate::options::{InterceptBy, InterceptionOptions};

pub trait InterceptionServiceCollectionExt {
    /// Register `C`, backed by `I` and intercepted as configured by `action`; a new proxy is built
    /// on every resolution.
    fn add_transient_with_interception<C, I, F>(&mut self, action: F) -> &mut Self
    where
        C: ?Sized + Contract + Upcast<I>,
        I: Component,
        F: FnOnce(&mut InterceptBy<'_>);

    /// Like [`add_transient_with_interception`](Self::add_transient_with_interception), but the
    /// proxy is built once per provider.
    fn add_singleton_with_interception<C, I, F>(&mut self, action: F) -> &mut Self
    where
        C: ?Sized + Contract + Upcast<I>,
        I: Component,
        F: FnOnce(&mut InterceptBy<'_>);

    /// Register `C` intercepted by [`LogInterceptor`] only.
    fn add_transient_with_instrumentation<C, I>(&mut self) -> &mut Self
    where
        C: ?Sized + Contract + Upcast<I>,
        I: Component;
}

impl InterceptionServiceCollectionExt for ServiceCollection {
    fn add_transient_with_interception<C, I, F>(&mut self, action: F) -> &mut Self
    where
        C: ?Sized + Contract + Upcast<I>,
        I: Component,
        F: FnOnce(&mut InterceptBy<'_>),
    {
        register::<C, I>(self, Lifetime::Transient, InterceptionOptions::configure(action))
    }

    fn add_singleton_with_interception<C, I, F>(&mut self, action: F) -> &mut Self
    where
        C: ?Sized + Contract + Upcast<I>,
        I: Component,
        F: FnOnce(&mut InterceptBy<'_>),
    {
        register::<C, I>(self, Lifetime::Singleton, InterceptionOptions::configure(action))
    }

    fn add_transient_with_instrumentation<C, I>(&mut self) -> &mut Self
    where
        C: ?Sized + Contract + Upcast<I>,
        I: Component,
    {
        self.add_transient_with_interception::<C, I, _>(|m| {
            m.intercept_by::<LogInterceptor>();
        })
    }
}

fn register<C, I>(
    services: &mut ServiceCollection,
    lifetime: Lifetime,
    options: InterceptionOptions,
) -> &mut ServiceCollection
where
    C: ?Sized + Contract + Upcast<I>,
    I: Component,
{
    services.try_add_transient::<I>();
    build_registration::<C, I>(services, lifetime, options);
    services
}
