/// Diagnostic context threaded through resolution: the display name of the
/// type whose injection points are currently being filled, or `"global"` for
/// container-initiated top-level requests.
#[derive(Debug, Clone, Copy)]
pub struct BindContext {
    pub requester: &'static str,
}

impl BindContext {
    pub(crate) const GLOBAL: Self = Self { requester: "global" };

    #[inline]
    #[must_use]
    pub(crate) const fn new(requester: &'static str) -> Self {
        Self { requester }
    }
}
