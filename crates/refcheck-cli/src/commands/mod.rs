//! Commands - CLI Command Implementations
//!
//! This module contains the implementations for all CLI commands.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

pub mod list;
pub mod run;
pub mod shape;

// Re-export common utilities for commands
pub(crate) mod utils;
