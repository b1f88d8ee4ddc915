pub use crate::contract;
pub use crate::{
    CallResult, Contract, InterceptError, InterceptionServiceCollectionExt, Interceptor,
    Invocation, MethodInfo, MethodSelectionConvention, Value,
};
pub use interpose_container::{Component, ResolveError, ServiceCollection, ServiceProvider};
