use thiserror::Error;

use crate::key::TypeKey;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("service not registered: {type_name}")]
    NotRegistered { type_name: &'static str },
    #[error("failed to construct {type_name}: {reason}")]
    Construction {
        type_name: &'static str,
        reason: String,
    },
    #[error("registration for {type_name} produced an instance of another type")]
    TypeMismatch { type_name: &'static str },
}

impl ResolveError {
    pub fn not_registered(key: TypeKey) -> Self {
        ResolveError::NotRegistered {
            type_name: key.name(),
        }
    }

    /// Construction failure attributed to `T`.
    pub fn construction<T: ?Sized + 'static>(reason: impl Into<String>) -> Self {
        ResolveError::Construction {
            type_name: TypeKey::of::<T>().name(),
            reason: reason.into(),
        }
    }

    /// Name of the type whose resolution failed.
    pub fn type_name(&self) -> &'static str {
        match self {
            ResolveError::NotRegistered { type_name }
            | ResolveError::Construction { type_name, .. }
            | ResolveError::TypeMismatch { type_name } => type_name,
        }
    }
}
