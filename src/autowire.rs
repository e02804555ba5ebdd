use alloc::sync::Arc;
use core::{any::TypeId, fmt, ops::Deref};

use crate::{any::TypeInfo, constructor::ConstructorArgs, container::Container, errors::ResolveErrorKind};

/// Construction shim for a wired type: lets a consumer build a fully injected
/// `T` outside the container's `get`/`create_instance` entry points, while
/// resolution still runs exactly once per construction.
///
/// The wrapper's type id is the marker recorded by
/// [`crate::TypeRegistryBuilder::register_autowired`]; the engine unwraps it
/// back to `T` before constructing, so no path resolves twice.
pub struct AutoWired<T> {
    instance: Arc<T>,
}

impl<T: Send + Sync + 'static> AutoWired<T> {
    /// Constructs `T` with no constructor parameters and resolves its
    /// injection points, configuration points and initializers once.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NotRegistered`] if `T` was not registered through
    ///   [`crate::TypeRegistryBuilder::register_autowired`]
    /// - any error the resolution pass produces
    pub fn construct(container: &Container) -> Result<Self, ResolveErrorKind> {
        let value = container.create_value(TypeInfo::of::<Self>(), ConstructorArgs::new())?;
        match value.downcast::<T>() {
            Ok(instance) => Ok(Self { instance }),
            Err(value) => Err(ResolveErrorKind::IncorrectType {
                expected: TypeId::of::<T>(),
                actual: (*value).type_id(),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Arc<T> {
        self.instance
    }
}

impl<T> Deref for AutoWired<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl<T> fmt::Debug for AutoWired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoWired").finish_non_exhaustive()
    }
}

impl<T> Clone for AutoWired<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
        }
    }
}
