//! Gateway tools
//!
//! Read-only tools over the caller's fantasy leagues.

pub mod leagues;
pub mod session;

use super::registry::ToolRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut ToolRegistry) {
    session::register_tools(registry);
    leagues::register_tools(registry);
}
