use std::sync::Arc;

use interpose_container::{Lifetime, ResolveError, ServiceCollection, ServiceProvider, TypeKey};
use tracing::{debug, info};

use crate::contract::{Contract, Upcast};
use crate::options::InterceptionOptions;
use crate::pipeline::{InterceptorChain, Pipeline};

/// Register a deferred recipe that resolves `C` as a proxy around `I`.
///
/// Interceptor types named by `options` are registered as transient components when absent. The
/// implementation type must be resolvable from the provider by the time `C` is resolved.
pub fn build_registration<C, I>(
    services: &mut ServiceCollection,
    lifetime: Lifetime,
    options: InterceptionOptions,
) where
    C: ?Sized + Contract + Upcast<I>,
    I: Send + Sync + 'static,
{
    for binding in options.bindings() {
        binding.register(services);
    }

    info!(
        contract = C::NAME,
        implementation = TypeKey::of::<I>().short_name(),
        members = C::methods().len(),
        interceptors = options.len(),
        ?lifetime,
        "registered intercepted contract"
    );

    services.add_factory::<C, _>(lifetime, move |provider| {
        build_proxy::<C, I>(provider, &options)
    });
}

/// Resolve the implementation and every interceptor, then wrap them in a proxy.
///
/// Nothing is returned unless every resolution succeeds.
pub fn build_proxy<C, I>(
    provider: &ServiceProvider,
    options: &InterceptionOptions,
) -> Result<Arc<C>, ResolveError>
where
    C: ?Sized + Contract + Upcast<I>,
    I: Send + Sync + 'static,
{
    let implementation = provider.resolve::<I>()?;

    let mut chain = InterceptorChain::new(Arc::clone(options.convention()));
    for binding in options.bindings() {
        chain.push(binding.key(), binding.resolve(provider)?);
    }

    debug!(
        contract = C::NAME,
        stages = chain.len(),
        "built interception proxy"
    );
    Ok(Pipeline::new(chain, C::upcast(implementation)).into_proxy())
}
