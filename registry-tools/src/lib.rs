//! Callable surface generated from the endpoint catalog.
//!
//! Every catalogued endpoint is projected once into a [`ToolDescriptor`]. The
//! resource and resource-template views in [`resources`] are thin adapters
//! over the same catalog, so the three presentations never disagree about
//! which endpoints exist.

#![warn(missing_docs, clippy::pedantic)]

pub mod descriptor;
pub mod provider;
pub mod resources;

pub use descriptor::{
    InputSchema, PropertySchema, RESERVED_ARGUMENT, ToolDescriptor, ToolSurface, ToolSurfaceError,
    ToolSurfaceResult, project,
};
pub use provider::{ToolOutput, ToolProvider};
pub use resources::{
    JSON_MIME_TYPE, ResourceDescriptor, ResourceTemplateDescriptor, resource_templates, resources,
};
