/// Agent Studio database layer
///
/// Schema migrations, demo seeding and workflow assembly for a multi-agent
/// chat studio, plus data-driven HTTP tool functions for its agents.

// Environment-driven configuration
pub mod config;

// Library error type
pub mod error;

// Persisted rows, link rows and assembled documents
pub mod datamodel;

// Storage, migrations, seeding and workflow assembly
pub mod database;

// HTTP tool function synthesis
pub mod tools;

// Process startup: tracing, migrations, seeding
pub mod bootstrap;

pub use bootstrap::{bootstrap, init_tracing, Startup};
pub use config::Config;
pub use database::{assemble_workflow, run_migrations, seed_demo_data, DatabaseManager, Filters};
pub use datamodel::{AgentDocument, WorkflowDocument};
pub use error::{StudioError, StudioResult};
pub use tools::{make_tool_function, ToolFunction};
