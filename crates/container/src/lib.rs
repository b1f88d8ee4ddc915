//! Service container for the interpose kernel
//!
//! Registrations are collected in a [`ServiceCollection`] keyed by [`TypeKey`] and frozen into a
//! [`ServiceProvider`], which resolves `Arc<T>` instances (including trait objects) on demand.

pub mod collection;
pub mod errors;
pub mod key;
pub mod model;
pub mod provider;

pub use collection::ServiceCollection;
pub use errors::ResolveError;
pub use key::TypeKey;
pub use model::Lifetime;
pub use provider::{Component, ServiceProvider};
