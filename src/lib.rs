//! boxc — a declarative markup compiler with plugin-defined components.

pub mod config;
pub mod diagnostics;
pub mod dsl;
pub mod registry;
