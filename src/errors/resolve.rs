use alloc::borrow::Cow;
use core::any::TypeId;

use super::instantiate::InstantiateErrorKind;
use crate::key::BindingKey;

/// Failures raised by the resolution engine. All of them are fatal to the
/// resolution call that triggered them; fields already assigned on the target
/// instance stay assigned.
#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding registered for key `{key}` (requested by `{context}`)")]
    UnresolvedBinding { key: BindingKey, context: &'static str },
    #[error("No configuration value for key `{key}` targeting field `{field}` (requested by `{context}`)")]
    UnresolvedConfiguration {
        key: Cow<'static, str>,
        field: &'static str,
        context: &'static str,
    },
    #[error("Type `{type_name}` is not registered")]
    NotRegistered { type_name: &'static str },
    #[error("Type `{type_name}` has no registered constructor")]
    NoConstructor { type_name: &'static str },
    #[error("Incorrect resolved type. Actual: {actual:?}, expected: {expected:?}")]
    IncorrectType { expected: TypeId, actual: TypeId },
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
}
