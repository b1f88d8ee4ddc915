//! Contracts and the proxies generated for them.
//!
//! A contract is a trait declared through [`contract!`](crate::contract). The macro implements
//! [`Contract`] for the trait object type, which gives the rest of the crate three things it
//! cannot obtain from a plain trait: a dispatcher from [`MethodInfo`] to the real member, a way to
//! fabricate a same-shaped proxy around an [`InvocationHandler`], and [`Upcast`] from any
//! implementation type.

use std::sync::Arc;

use crate::errors::CallResult;
use crate::method::MethodInfo;
use crate::value::Value;

/// Receives every call made on a generated proxy.
pub trait InvocationHandler: Send + Sync {
    fn invoke(&self, method: &'static MethodInfo, arguments: Vec<Value>) -> CallResult<Value>;
}

/// Implemented for `dyn Trait` of every trait declared with [`contract!`](crate::contract).
pub trait Contract: Send + Sync + 'static {
    const NAME: &'static str;

    fn methods() -> &'static [MethodInfo];

    /// Call the member named by `method` on `self`.
    fn dispatch(&self, method: &'static MethodInfo, arguments: Vec<Value>) -> CallResult<Value>;

    fn create_proxy(handler: Arc<dyn InvocationHandler>) -> Arc<Self>;
}

/// Conversion from an implementation to the contract's trait object.
pub trait Upcast<I>: Contract {
    fn upcast(implementation: Arc<I>) -> Arc<Self>;
}

/// Declare a contract trait together with its dispatcher and proxy.
///
/// Members take `&self` plus arguments that are `Clone + Send + Sync + 'static`; return types must
/// be `Send + Sync + 'static`. Values keep their concrete type through the pipeline. The declared
/// return type `T` (or `()` when omitted) becomes [`CallResult<T>`](crate::CallResult) in the
/// generated trait.
///
/// ```ignore
/// interpose_interception::contract! {
///     pub trait Greeter {
///         fn greet(&self, name: String) -> String;
///         fn reset(&self);
///     }
/// }
/// ```
#[macro_export]
macro_rules! contract {
    (
        $(#[$attr:meta])*
        $vis:vis trait $name:ident {
            $(
                $(#[$mattr:meta])*
                fn $method:ident(&self $(, $arg:ident : $argty:ty)* $(,)?) $(-> $ret:ty)?;
            )*
        }
    ) => {
        $(#[$attr])*
        $vis trait $name: ::core::marker::Send + ::core::marker::Sync {
            $(
                $(#[$mattr])*
                fn $method(&self $(, $arg: $argty)*)
                    -> $crate::CallResult<$crate::__contract_return!($($ret)?)>;
            )*
        }

        impl $crate::Contract for dyn $name {
            const NAME: &'static str = ::core::stringify!($name);

            fn methods() -> &'static [$crate::MethodInfo] {
                const METHODS: &[$crate::MethodInfo] = &[
                    $(
                        $crate::MethodInfo::new(
                            ::core::stringify!($name),
                            ::core::stringify!($method),
                            &[$(::core::stringify!($arg)),*],
                        ),
                    )*
                ];
                METHODS
            }

            #[allow(unused_mut, unused_variables)]
            fn dispatch(
                &self,
                method: &'static $crate::MethodInfo,
                arguments: ::std::vec::Vec<$crate::Value>,
            ) -> $crate::CallResult<$crate::Value> {
                $(
                    if method.name() == ::core::stringify!($method) {
                        let mut arguments = arguments.into_iter();
                        $(
                            let $arg: $argty = $crate::value::from_argument(
                                method,
                                ::core::stringify!($arg),
                                arguments.next(),
                            )?;
                        )*
                        let output = $name::$method(self $(, $arg)*)?;
                        return ::core::result::Result::Ok($crate::value::into_return(output));
                    }
                )*
                ::core::result::Result::Err($crate::InterceptError::UnknownMethod {
                    contract: ::core::stringify!($name),
                    method: method.name(),
                })
            }

            fn create_proxy(
                handler: ::std::sync::Arc<dyn $crate::InvocationHandler>,
            ) -> ::std::sync::Arc<Self> {
                struct Proxy {
                    handler: ::std::sync::Arc<dyn $crate::InvocationHandler>,
                }

                impl $name for Proxy {
                    $(
                        fn $method(&self $(, $arg: $argty)*)
                            -> $crate::CallResult<$crate::__contract_return!($($ret)?)>
                        {
                            static METHOD: $crate::MethodInfo = $crate::MethodInfo::new(
                                ::core::stringify!($name),
                                ::core::stringify!($method),
                                &[$(::core::stringify!($arg)),*],
                            );
                            let arguments = ::std::vec![$($crate::value::into_argument($arg)),*];
                            let output = self.handler.invoke(&METHOD, arguments)?;
                            $crate::value::from_return(&METHOD, output)
                        }
                    )*
                }

                ::std::sync::Arc::new(Proxy { handler })
            }
        }

        impl<I: $name + 'static> $crate::Upcast<I> for dyn $name {
            fn upcast(implementation: ::std::sync::Arc<I>) -> ::std::sync::Arc<Self> {
                implementation
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __contract_return {
    () => {
        ()
    };
    ($ret:ty) => {
        $ret
    };
}
