use uuid::Uuid;

/// Per-request values threaded explicitly through the call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self { request_id: request_id.into() }
    }

    /// Context for work that did not arrive through a request (startup, tests).
    pub fn detached() -> Self {
        Self { request_id: format!("internal-{}", Uuid::new_v4().simple()) }
    }
}
