use alloc::{borrow::Cow, string::String};
use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// Identifier under which a binding is registered and looked up: either the
/// identity of a declared type or a plain string for keys with no runtime type.
///
/// Each key maps to at most one binding; re-binding overwrites.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BindingKey {
    Type(TypeInfo),
    Name(Cow<'static, str>),
}

impl BindingKey {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    #[inline]
    #[must_use]
    pub fn name(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Name(name.into())
    }
}

impl Display for BindingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(info) => f.write_str(info.short_name()),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&'static str> for BindingKey {
    fn from(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }
}

impl From<String> for BindingKey {
    fn from(name: String) -> Self {
        Self::Name(Cow::Owned(name))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::BindingKey;

    use alloc::string::ToString as _;

    struct Database;

    #[test]
    fn test_display() {
        assert_eq!(BindingKey::of::<Database>().to_string(), "Database");
        assert_eq!(BindingKey::name("db.url").to_string(), "db.url");
    }

    #[test]
    fn test_equality() {
        assert_eq!(BindingKey::of::<Database>(), BindingKey::of::<Database>());
        assert_ne!(BindingKey::of::<Database>(), BindingKey::name("Database"));
        assert_eq!(BindingKey::from("db.url"), BindingKey::name("db.url".to_string()));
    }
}
