//! Tool system
//!
//! Tools the hosting agent can call, and the registry that dispatches them.

pub mod definition;
pub mod manager;
pub mod traits;

pub use definition::{SchemaBuilder, ToolDefinition};
pub use manager::ToolManager;
pub use traits::{Tool, ToolContext, ToolResult};
