use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::any::Any;

use crate::{
    any::Value,
    errors::InstantiateErrorKind,
    service::{service_fn, BoxCloneService},
};

/// Trailing constructor parameters: captured once at binding time and
/// forwarded verbatim to every construction of the target type.
#[derive(Clone, Default)]
pub struct ConstructorArgs {
    values: Vec<Value>,
}

impl ConstructorArgs {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    /// Typed positional access for registered constructors.
    ///
    /// # Errors
    /// - [`InstantiateErrorKind::MissingArgument`] if `index` is out of range
    /// - [`InstantiateErrorKind::ArgumentType`] if the argument is not a `T`
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>, InstantiateErrorKind> {
        let value = self.values.get(index).ok_or(InstantiateErrorKind::MissingArgument { index })?;
        value.clone().downcast::<T>().map_err(|_| InstantiateErrorKind::ArgumentType { index })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub(crate) type BoxedCloneConstructor = BoxCloneService<ConstructorArgs, Box<dyn Any + Send + Sync>, InstantiateErrorKind>;

#[must_use]
pub(crate) fn boxed_constructor<Ctor, Dep>(mut constructor: Ctor) -> BoxedCloneConstructor
where
    Ctor: FnMut(&ConstructorArgs) -> Result<Dep, InstantiateErrorKind> + Clone + Send + Sync + 'static,
    Dep: Send + Sync + 'static,
{
    BoxCloneService(Box::new(service_fn(move |args: ConstructorArgs| {
        let dependency = constructor(&args)?;
        Ok(Box::new(dependency) as _)
    })))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{boxed_constructor, ConstructorArgs};
    use crate::{errors::InstantiateErrorKind, service::Service as _};

    use alloc::string::{String, ToString as _};

    #[test]
    fn test_typed_access() {
        let args = ConstructorArgs::new().with(7u32).with("db".to_string());

        assert_eq!(args.len(), 2);
        assert_eq!(*args.get::<u32>(0).unwrap(), 7);
        assert_eq!(*args.get::<String>(1).unwrap(), "db");
    }

    #[test]
    fn test_missing_argument() {
        let args = ConstructorArgs::new();

        assert!(args.is_empty());
        assert!(matches!(
            args.get::<u32>(0),
            Err(InstantiateErrorKind::MissingArgument { index: 0 })
        ));
    }

    #[test]
    fn test_argument_type_mismatch() {
        let args = ConstructorArgs::new().with(7u32);

        assert!(matches!(args.get::<i64>(0), Err(InstantiateErrorKind::ArgumentType { index: 0 })));
    }

    #[test]
    fn test_boxed_constructor_forwards_args() {
        struct Pool(u32);

        let mut constructor = boxed_constructor(|args: &ConstructorArgs| Ok(Pool(*args.get::<u32>(0)?)));

        let instance = constructor.call(ConstructorArgs::new().with(4u32)).unwrap();
        assert_eq!(instance.downcast::<Pool>().unwrap().0, 4);

        assert!(matches!(
            constructor.call(ConstructorArgs::new()),
            Err(InstantiateErrorKind::MissingArgument { index: 0 })
        ));
    }
}
