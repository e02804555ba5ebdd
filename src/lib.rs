#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod autowire;
pub(crate) mod binding;
pub(crate) mod config;
pub(crate) mod constructor;
pub(crate) mod container;
pub(crate) mod context;
pub(crate) mod errors;
pub(crate) mod key;
pub(crate) mod registry;
pub(crate) mod service;

pub use any::{TypeInfo, Value};
pub use autowire::AutoWired;
pub use binding::{BindingBuilder, TypedBindingBuilder};
pub use constructor::ConstructorArgs;
pub use container::Container;
pub use context::BindContext;
pub use errors::{InstantiateErrorKind, ResolveErrorKind};
pub use key::BindingKey;
pub use registry::{TypeRegistration, TypeRegistryBuilder};
