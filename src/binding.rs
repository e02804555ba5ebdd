use alloc::{boxed::Box, sync::Arc};
use core::marker::PhantomData;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    any::{TypeInfo, Value},
    constructor::ConstructorArgs,
    container::Container,
    context::BindContext,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    key::BindingKey,
    service::{service_fn, BoxCloneService},
};

/// Request passed to a binding when it is asked to produce a value. The
/// container handle lets singleton and instance bindings re-enter the
/// resolution engine for nested construction.
pub(crate) struct BindRequest {
    pub(crate) container: Container,
    pub(crate) context: BindContext,
}

pub(crate) type BoxedCloneBinding = BoxCloneService<BindRequest, Value, ResolveErrorKind>;

/// Binding that holds a precomputed value and returns it unchanged.
#[must_use]
pub(crate) fn value_binding<T: Send + Sync + 'static>(value: T) -> BoxedCloneBinding {
    let value: Value = Arc::new(value);
    BoxCloneService(Box::new(service_fn(move |_request: BindRequest| Ok(value.clone()))))
}

/// Binding that calls the user factory freshly on every resolution.
#[must_use]
pub(crate) fn factory_binding<F, Dep>(mut factory: F) -> BoxedCloneBinding
where
    F: FnMut(&BindContext) -> Result<Dep, InstantiateErrorKind> + Clone + Send + Sync + 'static,
    Dep: Send + Sync + 'static,
{
    BoxCloneService(Box::new(service_fn(move |request: BindRequest| {
        let dependency = factory(&request.context).map_err(ResolveErrorKind::Instantiate)?;
        debug!(requester = request.context.requester, "Factory produced a value");
        let value: Value = Arc::new(dependency);
        Ok(value)
    })))
}

/// Binding that lazily constructs the target type once and caches it.
///
/// The cache cell is checked under a short lock and construction runs outside
/// it: two concurrent first accesses may each construct an instance, last
/// write wins, and every caller observes some fully-resolved instance.
#[must_use]
pub(crate) fn singleton_binding(target: TypeInfo, args: ConstructorArgs) -> BoxedCloneBinding {
    let cell: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    BoxCloneService(Box::new(service_fn(move |request: BindRequest| {
        let cached = cell.lock().clone();
        if let Some(value) = cached {
            debug!(dependency = target.short_name(), "Singleton found in cache");
            return Ok(value);
        }

        let value = request.container.create_value(target, args.clone())?;
        *cell.lock() = Some(value.clone());
        debug!(dependency = target.short_name(), "Singleton cached");
        Ok(value)
    })))
}

/// Binding that constructs a fresh, fully-resolved instance on every call.
#[must_use]
pub(crate) fn instance_binding(target: TypeInfo, args: ConstructorArgs) -> BoxedCloneBinding {
    BoxCloneService(Box::new(service_fn(move |request: BindRequest| {
        request.container.create_value(target, args.clone())
    })))
}

/// Untyped builder returned by [`Container::bind_key`]: values registered
/// through it are unchecked at the type level.
pub struct BindingBuilder<'a> {
    container: &'a Container,
    key: BindingKey,
}

impl<'a> BindingBuilder<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: &'a Container, key: BindingKey) -> Self {
        Self { container, key }
    }

    pub fn value<T: Send + Sync + 'static>(self, value: T) {
        self.container.insert_binding(self.key, value_binding(value));
    }

    pub fn factory<F, Dep>(self, factory: F)
    where
        F: FnMut(&BindContext) -> Result<Dep, InstantiateErrorKind> + Clone + Send + Sync + 'static,
        Dep: Send + Sync + 'static,
    {
        self.container.insert_binding(self.key, factory_binding(factory));
    }

    pub fn singleton<T: 'static>(self) {
        self.singleton_with::<T>(ConstructorArgs::new());
    }

    pub fn singleton_with<T: 'static>(self, args: ConstructorArgs) {
        self.container.insert_binding(self.key, singleton_binding(TypeInfo::of::<T>(), args));
    }

    pub fn instance<T: 'static>(self) {
        self.instance_with::<T>(ConstructorArgs::new());
    }

    pub fn instance_with<T: 'static>(self, args: ConstructorArgs) {
        self.container.insert_binding(self.key, instance_binding(TypeInfo::of::<T>(), args));
    }
}

/// Typed builder returned by [`Container::bind`]: the binding key and the
/// produced type are both fixed to `T`.
pub struct TypedBindingBuilder<'a, T> {
    container: &'a Container,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Send + Sync + 'static> TypedBindingBuilder<'a, T> {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: &'a Container) -> Self {
        Self {
            container,
            _marker: PhantomData,
        }
    }

    pub fn value(self, value: T) {
        self.container.insert_binding(BindingKey::of::<T>(), value_binding(value));
    }

    pub fn factory<F>(self, factory: F)
    where
        F: FnMut(&BindContext) -> Result<T, InstantiateErrorKind> + Clone + Send + Sync + 'static,
    {
        self.container.insert_binding(BindingKey::of::<T>(), factory_binding(factory));
    }

    pub fn singleton(self) {
        self.singleton_with(ConstructorArgs::new());
    }

    pub fn singleton_with(self, args: ConstructorArgs) {
        self.container
            .insert_binding(BindingKey::of::<T>(), singleton_binding(TypeInfo::of::<T>(), args));
    }

    pub fn instance(self) {
        self.instance_with(ConstructorArgs::new());
    }

    pub fn instance_with(self, args: ConstructorArgs) {
        self.container
            .insert_binding(BindingKey::of::<T>(), instance_binding(TypeInfo::of::<T>(), args));
    }
}
