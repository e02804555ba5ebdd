use alloc::{borrow::Cow, boxed::Box, collections::BTreeMap, sync::Arc, vec::Vec};
use core::any::{Any, TypeId};
use core::marker::PhantomData;

use crate::{
    any::{TypeInfo, Value},
    autowire::AutoWired,
    binding::BoxedCloneBinding,
    constructor::{boxed_constructor, BoxedCloneConstructor, ConstructorArgs},
    errors::{InstantiateErrorKind, ResolveErrorKind},
    key::BindingKey,
};

/// Mapping from binding key to the strategy producing a value for that key.
/// Re-binding a key overwrites the previous binding.
pub(crate) struct BindingRegistry {
    map: BTreeMap<BindingKey, BoxedCloneBinding>,
}

impl BindingRegistry {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    pub(crate) fn insert(&mut self, key: BindingKey, binding: BoxedCloneBinding) -> Option<BoxedCloneBinding> {
        self.map.insert(key, binding)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, key: &BindingKey) -> Option<BoxedCloneBinding> {
        self.map.get(key).cloned()
    }
}

pub(crate) type BoxedSetter = Box<dyn Fn(&mut dyn Any, Value) -> Result<(), ResolveErrorKind> + Send + Sync>;
pub(crate) type BoxedInitializer = Box<dyn Fn(&mut dyn Any) + Send + Sync>;
pub(crate) type BoxedProjection = Box<dyn for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any> + Send + Sync>;

/// Declared field that is filled with the result of resolving a binding key.
pub(crate) struct InjectionPoint {
    pub(crate) field: &'static str,
    pub(crate) key: BindingKey,
    pub(crate) setter: BoxedSetter,
}

/// Declared field that is filled with a value from the configuration store.
pub(crate) struct ConfigurationPoint {
    pub(crate) field: &'static str,
    pub(crate) key: Cow<'static, str>,
    pub(crate) setter: BoxedSetter,
}

/// Explicit "declared supertype" link: the parent level's id plus the
/// projection from an instance of the declaring type to its embedded parent.
pub(crate) struct ParentLink {
    pub(crate) id: TypeId,
    pub(crate) project: BoxedProjection,
}

pub(crate) struct TypeMetadata {
    pub(crate) info: TypeInfo,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) constructor: Option<BoxedCloneConstructor>,
    pub(crate) injections: Vec<InjectionPoint>,
    pub(crate) configurations: Vec<ConfigurationPoint>,
    pub(crate) initializer: Option<BoxedInitializer>,
}

/// Declaration-time record for a single type level: its constructor, its
/// injection and configuration points, its initializer hook and its declared
/// supertype. Entries attach to exactly the level that declares them.
pub struct TypeRegistration<T> {
    info: TypeInfo,
    parent: Option<ParentLink>,
    constructor: Option<BoxedCloneConstructor>,
    injections: Vec<InjectionPoint>,
    configurations: Vec<ConfigurationPoint>,
    initializer: Option<BoxedInitializer>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Default for TypeRegistration<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> TypeRegistration<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            info: TypeInfo::of::<T>(),
            parent: None,
            constructor: None,
            injections: Vec::new(),
            configurations: Vec::new(),
            initializer: None,
            _marker: PhantomData,
        }
    }

    /// Declares `P` as the supertype of `T`. The projection maps an instance
    /// of `T` to its embedded `P` so the resolution engine can walk the
    /// ancestor chain without runtime reflection.
    #[must_use]
    pub fn extends<P: 'static>(mut self, project: impl Fn(&mut T) -> &mut P + Send + Sync + 'static) -> Self {
        self.parent = Some(ParentLink {
            id: TypeId::of::<P>(),
            project: Box::new(move |instance: &mut dyn Any| {
                instance.downcast_mut::<T>().map(|child| project(child) as &mut dyn Any)
            }),
        });
        self
    }

    #[must_use]
    pub fn constructor<Ctor>(mut self, constructor: Ctor) -> Self
    where
        Ctor: FnMut(&ConstructorArgs) -> Result<T, InstantiateErrorKind> + Clone + Send + Sync + 'static,
        T: Send + Sync,
    {
        self.constructor = Some(boxed_constructor(constructor));
        self
    }

    /// Declares an injection point: `field` is filled with the value resolved
    /// for `key` whenever an instance of `T` (or a subtype) is resolved.
    #[must_use]
    pub fn inject<Dep>(
        mut self,
        field: &'static str,
        key: impl Into<BindingKey>,
        setter: impl Fn(&mut T, Arc<Dep>) + Send + Sync + 'static,
    ) -> Self
    where
        Dep: Send + Sync + 'static,
    {
        self.injections.push(InjectionPoint {
            field,
            key: key.into(),
            setter: boxed_setter::<T, Dep>(setter),
        });
        self
    }

    /// Injection point whose key defaults to the field's declared type.
    #[must_use]
    pub fn inject_type<Dep>(self, field: &'static str, setter: impl Fn(&mut T, Arc<Dep>) + Send + Sync + 'static) -> Self
    where
        Dep: Send + Sync + 'static,
    {
        self.inject(field, BindingKey::of::<Dep>(), setter)
    }

    /// Declares a configuration point: `field` is filled with the value stored
    /// under the configuration key.
    #[must_use]
    pub fn configure<V>(
        mut self,
        field: &'static str,
        key: impl Into<Cow<'static, str>>,
        setter: impl Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    ) -> Self
    where
        V: Send + Sync + 'static,
    {
        self.configurations.push(ConfigurationPoint {
            field,
            key: key.into(),
            setter: boxed_setter::<T, V>(setter),
        });
        self
    }

    /// Declares the zero-argument hook invoked once the level's own points and
    /// everything above it have resolved. At most one per level, last wins.
    #[must_use]
    pub fn initializer(mut self, initializer: impl Fn(&mut T) + Send + Sync + 'static) -> Self {
        self.initializer = Some(Box::new(move |instance: &mut dyn Any| {
            if let Some(instance) = instance.downcast_mut::<T>() {
                initializer(instance);
            }
        }));
        self
    }

    fn into_metadata(self) -> TypeMetadata {
        TypeMetadata {
            info: self.info,
            parent: self.parent,
            constructor: self.constructor,
            injections: self.injections,
            configurations: self.configurations,
            initializer: self.initializer,
        }
    }
}

#[must_use]
fn boxed_setter<T, Dep>(setter: impl Fn(&mut T, Arc<Dep>) + Send + Sync + 'static) -> BoxedSetter
where
    T: 'static,
    Dep: Send + Sync + 'static,
{
    Box::new(move |instance: &mut dyn Any, value: Value| {
        let actual = (*instance).type_id();
        let Some(instance) = instance.downcast_mut::<T>() else {
            return Err(ResolveErrorKind::IncorrectType {
                expected: TypeId::of::<T>(),
                actual,
            });
        };
        match value.downcast::<Dep>() {
            Ok(value) => {
                setter(instance, value);
                Ok(())
            }
            Err(value) => Err(ResolveErrorKind::IncorrectType {
                expected: TypeId::of::<Dep>(),
                actual: (*value).type_id(),
            }),
        }
    })
}

/// Accumulates per-type declaration records before the container freezes them.
pub struct TypeRegistryBuilder {
    types: BTreeMap<TypeId, TypeMetadata>,
    autowire: BTreeMap<TypeId, TypeId>,
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistryBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
            autowire: BTreeMap::new(),
        }
    }

    /// Records the registration for `T`; registering a type twice overwrites.
    #[inline]
    #[must_use]
    pub fn register<T: 'static>(mut self, registration: TypeRegistration<T>) -> Self {
        self.types.insert(TypeId::of::<T>(), registration.into_metadata());
        self
    }

    /// Registers `T` and records the [`AutoWired<T>`] marker, so constructing
    /// through the wrapper unwraps to `T` and resolves exactly once.
    #[inline]
    #[must_use]
    pub fn register_autowired<T: 'static>(mut self, registration: TypeRegistration<T>) -> Self {
        self.autowire.insert(TypeId::of::<AutoWired<T>>(), TypeId::of::<T>());
        self.register(registration)
    }

    #[must_use]
    pub(crate) fn build(self) -> TypeRegistry {
        TypeRegistry {
            types: self.types,
            autowire: self.autowire,
        }
    }
}

/// Frozen per-type metadata: read-only for the resolution engine, keyed by the
/// exact ancestor level being visited.
pub(crate) struct TypeRegistry {
    types: BTreeMap<TypeId, TypeMetadata>,
    autowire: BTreeMap<TypeId, TypeId>,
}

impl TypeRegistry {
    #[inline]
    #[must_use]
    pub(crate) fn get(&self, type_id: &TypeId) -> Option<&TypeMetadata> {
        self.types.get(type_id)
    }

    #[inline]
    #[must_use]
    pub(crate) fn autowire_target(&self, type_id: &TypeId) -> Option<TypeId> {
        self.autowire.get(type_id).copied()
    }
}
