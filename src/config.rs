use alloc::{borrow::Cow, collections::BTreeMap};

use crate::any::Value;

/// Flat mapping from configuration key to a shared value, written by
/// [`crate::Container::configure`] and read during resolution.
#[derive(Default)]
pub(crate) struct ConfigValueStore {
    map: BTreeMap<Cow<'static, str>, Value>,
}

impl ConfigValueStore {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    pub(crate) fn insert(&mut self, key: Cow<'static, str>, value: Value) -> Option<Value> {
        self.map.insert(key, value)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        self.map.get(key).cloned()
    }
}
