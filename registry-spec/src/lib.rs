//! Machine-readable API description fetched from a registry.
//!
//! The registry publishes a Swagger 2.0 document. [`SpecDocument`] keeps the
//! parts needed to derive a tool catalog, and [`SpecDocument::operations`]
//! flattens every path item into [`Operation`] values keyed by raw path
//! template.

#![warn(missing_docs, clippy::pedantic)]

mod document;
mod operation;

pub use document::{ApiInfo, PathItem, RawOperation, SpecDocument, SpecError, SpecResult};
pub use operation::{Method, Operation, Parameter, ParameterLocation};
