//! Service layer holding the catalog query engine on top of `models`.
//! - Normalises loosely-constrained list parameters into a safe query plan.
//! - Hydrates child versions with one batched query per page.
//! - Maps store failures onto a small, stable error taxonomy.

pub mod errors;
pub mod pagination;
pub mod catalog;
#[cfg(test)]
pub mod test_support;
