use alloc::{borrow::Cow, sync::Arc};
use core::any::{type_name, Any, TypeId};
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::{TypeInfo, Value},
    binding::{BindRequest, BindingBuilder, BoxedCloneBinding, TypedBindingBuilder},
    config::ConfigValueStore,
    constructor::ConstructorArgs,
    context::BindContext,
    errors::ResolveErrorKind,
    key::BindingKey,
    registry::{BindingRegistry, TypeRegistry, TypeRegistryBuilder},
    service::Service as _,
};

/// The container facade: binding declaration, configuration values and the
/// recursive resolution engine behind a cheaply clonable handle.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    pub(crate) bindings: Mutex<BindingRegistry>,
    pub(crate) config: Mutex<ConfigValueStore>,
    pub(crate) types: TypeRegistry,
}

impl Container {
    /// Creates a container over the frozen type registry. Bindings and
    /// configuration values are registered afterwards through [`Self::bind`],
    /// [`Self::bind_key`] and [`Self::configure`].
    #[inline]
    #[must_use]
    pub fn new(types: TypeRegistryBuilder) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                bindings: Mutex::new(BindingRegistry::new()),
                config: Mutex::new(ConfigValueStore::new()),
                types: types.build(),
            }),
        }
    }

    /// Starts a typed binding for the key derived from `T`.
    #[inline]
    #[must_use]
    pub fn bind<T: Send + Sync + 'static>(&self) -> TypedBindingBuilder<'_, T> {
        TypedBindingBuilder::new(self)
    }

    /// Starts an untyped binding for a string or explicit key; values
    /// registered through it are unchecked at the type level.
    #[inline]
    #[must_use]
    pub fn bind_key(&self, key: impl Into<BindingKey>) -> BindingBuilder<'_> {
        BindingBuilder::new(self, key.into())
    }

    /// Resolves the binding registered for `T` with context `"global"`.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::UnresolvedBinding`] if no binding is registered
    /// - [`ResolveErrorKind::IncorrectType`] if the binding produced another type
    /// - any error a nested construction produces
    pub fn get<Dep: Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        let span = info_span!("get", dependency = type_name::<Dep>());
        let _guard = span.enter();

        let value = self.get_bound(&BindingKey::of::<Dep>(), BindContext::GLOBAL)?;
        match value.downcast::<Dep>() {
            Ok(dependency) => Ok(dependency),
            Err(value) => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: TypeId::of::<Dep>(),
                    actual: (*value).type_id(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Resolves a binding by key with context `"global"`, returning the
    /// type-erased value.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::UnresolvedBinding`] if no binding is registered
    /// - any error a nested construction produces
    pub fn get_by_key(&self, key: impl Into<BindingKey>) -> Result<Value, ResolveErrorKind> {
        let key = key.into();
        let span = info_span!("get_by_key", key = %key);
        let _guard = span.enter();

        self.get_bound(&key, BindContext::GLOBAL)
    }

    /// Constructs a registered type with the given trailing parameters and
    /// runs exactly one resolution pass over its ancestor chain.
    ///
    /// If `T` is an autowire wrapper id, the original type is constructed
    /// instead; use [`crate::AutoWired::construct`] to get the typed result in
    /// that case.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NotRegistered`] / [`ResolveErrorKind::NoConstructor`]
    ///   if the type cannot be constructed
    /// - any error construction or resolution produces
    pub fn create_instance<T: Send + Sync + 'static>(&self, args: ConstructorArgs) -> Result<Arc<T>, ResolveErrorKind> {
        let span = info_span!("create_instance", dependency = type_name::<T>());
        let _guard = span.enter();

        let value = self.create_value(TypeInfo::of::<T>(), args)?;
        match value.downcast::<T>() {
            Ok(instance) => Ok(instance),
            Err(value) => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: TypeId::of::<T>(),
                    actual: (*value).type_id(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Stores `value` under the configuration key; last write wins. Affects
    /// future resolutions that reference the key, never completed ones.
    pub fn configure<V: Send + Sync + 'static>(&self, key: impl Into<Cow<'static, str>>, value: V) {
        let key = key.into();
        debug!(key = %key, "Configuration value stored");
        self.inner.config.lock().insert(key, Arc::new(value));
    }

    /// Runs the resolution engine over an already-constructed instance,
    /// starting at `T`'s level and walking the declared ancestor chain.
    ///
    /// # Errors
    /// Any error injection or configuration lookup produces; fields assigned
    /// before the failure stay assigned.
    pub fn resolve_injections<T: 'static>(&self, instance: &mut T) -> Result<(), ResolveErrorKind> {
        let span = info_span!("resolve_injections", dependency = type_name::<T>());
        let _guard = span.enter();

        self.resolve_level(instance, Some(TypeId::of::<T>()), TypeInfo::of::<T>())
    }
}

impl Container {
    #[inline]
    pub(crate) fn insert_binding(&self, key: BindingKey, binding: BoxedCloneBinding) {
        debug!(key = %key, "Binding registered");
        self.inner.bindings.lock().insert(key, binding);
    }

    /// Looks up the binding for `key` and asks it for a value. The binding is
    /// cloned out of the registry so the lock is released before the call and
    /// nested construction can re-enter the engine.
    pub(crate) fn get_bound(&self, key: &BindingKey, context: BindContext) -> Result<Value, ResolveErrorKind> {
        let binding = self.inner.bindings.lock().get(key);
        let Some(mut binding) = binding else {
            let err = ResolveErrorKind::UnresolvedBinding {
                key: key.clone(),
                context: context.requester,
            };
            error!("{}", err);
            return Err(err);
        };

        binding.call(BindRequest {
            container: self.clone(),
            context,
        })
    }

    /// Constructs the target type (unwrapping the autowire marker first) and
    /// runs one resolution pass starting at its own level.
    pub(crate) fn create_value(&self, target: TypeInfo, args: ConstructorArgs) -> Result<Value, ResolveErrorKind> {
        let target_id = self.inner.types.autowire_target(&target.id).unwrap_or(target.id);
        let Some(metadata) = self.inner.types.get(&target_id) else {
            let err = ResolveErrorKind::NotRegistered {
                type_name: target.short_name(),
            };
            error!("{}", err);
            return Err(err);
        };
        let Some(mut constructor) = metadata.constructor.clone() else {
            let err = ResolveErrorKind::NoConstructor {
                type_name: metadata.info.short_name(),
            };
            error!("{}", err);
            return Err(err);
        };

        let mut instance = constructor.call(args)?;
        self.resolve_level(instance.as_mut(), Some(target_id), metadata.info)?;

        debug!(dependency = metadata.info.short_name(), "Constructed and resolved");
        Ok(Arc::from(instance))
    }

    /// The recursive core. Per level: injection points, then configuration
    /// points, then recursion into the declared parent; the level's
    /// initializer runs only after the recursive call unwinds. Field
    /// assignment therefore happens most-derived to root, initializers root to
    /// most-derived.
    fn resolve_level(&self, instance: &mut dyn Any, level: Option<TypeId>, runtime: TypeInfo) -> Result<(), ResolveErrorKind> {
        let Some(type_id) = level else {
            return Ok(());
        };
        let Some(metadata) = self.inner.types.get(&type_id) else {
            return Ok(());
        };

        let context = BindContext::new(runtime.short_name());
        let span = info_span!("resolve", level = metadata.info.short_name(), requester = context.requester);
        let _guard = span.enter();

        for point in &metadata.injections {
            let value = self.get_bound(&point.key, context)?;
            (point.setter)(instance, value)?;
            debug!(field = point.field, key = %point.key, "Injected");
        }

        for point in &metadata.configurations {
            let value = self.inner.config.lock().get(&point.key);
            let Some(value) = value else {
                let err = ResolveErrorKind::UnresolvedConfiguration {
                    key: point.key.clone(),
                    field: point.field,
                    context: context.requester,
                };
                error!("{}", err);
                return Err(err);
            };
            (point.setter)(instance, value)?;
            debug!(field = point.field, key = %point.key, "Configured");
        }

        if let Some(link) = &metadata.parent {
            if let Some(parent_instance) = (link.project)(instance) {
                self.resolve_level(parent_instance, Some(link.id), runtime)?;
            }
        }

        if let Some(initializer) = &metadata.initializer {
            initializer(instance);
            debug!(level = metadata.info.short_name(), "Initializer ran");
        }

        Ok(())
    }
}
