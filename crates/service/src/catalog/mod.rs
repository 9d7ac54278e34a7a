//! Catalog module: domain, query plan, repository and service layers.
//!
//! The repository trait is the seam between the engine's contract and a
//! concrete store (SeaORM/Postgres or the in-memory mock).

pub mod context;
pub mod domain;
pub mod query;
pub mod hydration;
pub mod repository;
pub mod repo;
pub mod service;

pub use context::RequestContext;
pub use service::{CatalogService, CatalogSettings};
