//! Type-erased values carried through the pipeline.
//!
//! Arguments and results keep their concrete Rust type; nothing is re-encoded on the way through a
//! proxy, so a chain without interceptors behaves exactly like a direct call.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::errors::{CallResult, InterceptError};
use crate::method::MethodInfo;

/// A shared, type-erased argument or return value.
///
/// Cloning is cheap; clones share the payload.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn unit() -> Self {
        Self::new(())
    }

    /// Name of the payload's type, for logs and errors.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Move the payload out, cloning only when another clone still shares it.
    pub fn take<T>(self) -> Result<T, Value>
    where
        T: Any + Send + Sync + Clone,
    {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(shared) => Ok(Arc::try_unwrap(shared).unwrap_or_else(|shared| T::clone(&shared))),
            Err(inner) => Err(Value { inner, type_name }),
        }
    }

    /// Move the payload out; fails if the type differs or another clone still shares it.
    pub fn into_inner<T>(self) -> Result<T, Value>
    where
        T: Any + Send + Sync,
    {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(shared) => Arc::try_unwrap(shared).map_err(|shared| Value {
                inner: shared,
                type_name,
            }),
            Err(inner) => Err(Value { inner, type_name }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.type_name).finish()
    }
}

pub fn into_argument<T: Any + Send + Sync>(value: T) -> Value {
    Value::new(value)
}

pub fn from_argument<T>(method: &MethodInfo, parameter: &str, value: Option<Value>) -> CallResult<T>
where
    T: Any + Send + Sync + Clone,
{
    let subject = || format!("argument `{}`", parameter);
    let value =
        value.ok_or_else(|| InterceptError::conversion::<T>(method, subject(), "nothing"))?;
    value
        .take::<T>()
        .map_err(|value| InterceptError::conversion::<T>(method, subject(), value.type_name()))
}

pub fn into_return<T: Any + Send + Sync>(value: T) -> Value {
    Value::new(value)
}

pub fn from_return<T>(method: &MethodInfo, value: Value) -> CallResult<T>
where
    T: Any + Send + Sync,
{
    value.into_inner::<T>().map_err(|value| {
        let found = if value.is::<T>() {
            "a value still shared by an interceptor"
        } else {
            value.type_name()
        };
        InterceptError::conversion::<T>(method, "return value", found)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    static METHOD: MethodInfo = MethodInfo::new("Greeter", "greet", &["name"]);

    #[test]
    fn values_keep_their_exact_payload() {
        let nan = from_return::<f64>(&METHOD, into_return(f64::NAN)).unwrap();
        assert!(nan.is_nan());

        let nested: Option<Option<u8>> = Some(None);
        let echoed: Option<Option<u8>> =
            from_argument(&METHOD, "name", Some(into_argument(nested))).unwrap();
        assert_eq!(echoed, Some(None));
    }

    #[test]
    fn shared_arguments_are_cloned_out() {
        let value = Value::new("Ann".to_string());
        let retained = value.clone();
        assert_eq!(value.take::<String>().unwrap(), "Ann");
        assert_eq!(retained.downcast_ref::<String>().map(String::as_str), Some("Ann"));
    }

    #[test]
    fn missing_argument_names_parameter() {
        let err = from_argument::<String>(&METHOD, "name", None).unwrap_err();
        assert!(err.to_string().contains("argument `name`"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn mismatched_return_is_reported() {
        let err = from_return::<u64>(&METHOD, Value::new("blocked".to_string())).unwrap_err();
        assert!(matches!(err, InterceptError::Conversion { .. }));
        assert!(err.to_string().contains("alloc::string::String"));
    }

    #[test]
    fn shared_return_cannot_be_moved_out() {
        let value = Value::new(7u64);
        let _kept = value.clone();
        let err = from_return::<u64>(&METHOD, value).unwrap_err();
        assert!(err.to_string().contains("still shared"));
    }
}
