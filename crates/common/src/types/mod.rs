use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self { Self { status: "ok" } }
}

/// Body of the readiness probe.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub status: &'static str,
    pub database: String,
}

impl Readiness {
    pub fn ready() -> Self { Self { status: "ready", database: "ok".into() } }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { status: "unavailable", database: reason.into() }
    }
}
