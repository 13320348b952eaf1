//! Endpoint catalog derived from a registry's API description.
//!
//! Only `GET` operations carrying at least one allowed tag are kept. The
//! catalog is built once, never mutated afterwards, and can be shared across
//! any number of concurrent invocations.

#![warn(missing_docs, clippy::pedantic)]

mod catalog;
mod endpoint;

pub use catalog::{Catalog, CatalogError, CatalogResult, build_catalog};
pub use endpoint::Endpoint;
