use std::any::Any;

use interpose_container::TypeKey;
use uuid::Uuid;

use crate::errors::CallResult;
use crate::method::MethodInfo;
use crate::pipeline::{InterceptorChain, Target};
use crate::value::{self, Value};

/// Call descriptor handed to conventions and interceptors.
///
/// A fresh descriptor is created for every call and for every descent into the chain through
/// [`Invocation::proceed`]; nothing in it outlives the call.
pub struct Invocation<'a> {
    pub(crate) call_id: Uuid,
    pub(crate) method: &'static MethodInfo,
    pub(crate) arguments: Vec<Value>,
    pub(crate) stage: Option<TypeKey>,
    pub(crate) next: usize,
    pub(crate) chain: &'a InterceptorChain,
    pub(crate) target: &'a Target<'a>,
}

impl<'a> Invocation<'a> {
    /// Identifier shared by every stage of one proxied call.
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn method(&self) -> &'static MethodInfo {
        self.method
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    /// Borrow argument `index` if it holds a `T`.
    pub fn argument_ref<T: Any>(&self, index: usize) -> Option<&T> {
        self.arguments.get(index).and_then(Value::downcast_ref::<T>)
    }

    /// Arguments as they will be passed on by the next [`Invocation::proceed`].
    pub fn arguments_mut(&mut self) -> &mut [Value] {
        &mut self.arguments
    }

    /// Copy out the argument bound to `parameter` as a `T`.
    pub fn argument_as<T>(&self, parameter: &str) -> CallResult<T>
    where
        T: Any + Send + Sync + Clone,
    {
        let argument = self
            .method
            .parameters()
            .iter()
            .position(|name| *name == parameter)
            .and_then(|index| self.arguments.get(index))
            .cloned();
        value::from_argument(self.method, parameter, argument)
    }

    /// Interceptor type being considered by the convention, or executing.
    pub fn interceptor(&self) -> Option<TypeKey> {
        self.stage
    }

    /// Run the rest of the chain, ending in the real member.
    ///
    /// May be called more than once; each call starts from the next stage with the current
    /// arguments.
    pub fn proceed(&mut self) -> CallResult<Value> {
        self.chain.dispatch(
            self.call_id,
            self.method,
            self.arguments.clone(),
            self.next,
            self.target,
        )
    }
}
