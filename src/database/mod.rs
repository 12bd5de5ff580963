/// Database layer
///
/// Storage primitives, schema migrations, demo seeding and workflow assembly,
/// all over one SQLite database accessed through sqlx.

// Row-oriented get/insert/link primitives
pub mod store;

// Embedded sqlx migrations and the drift-checking runner
pub mod migrations;

// Demo workflow rows
pub mod fixtures;

// Idempotent demo seeding
pub mod seed;

// Nested workflow document assembly
pub mod assembler;

pub use assembler::assemble_workflow;
pub use migrations::{run_migrations, DriftStatus, MigrationReport, MigrationRunner, SchemaMigrator, SqlxMigrator};
pub use seed::{seed_demo_data, SeedOptions, SeedOutcome, SeededIds};
pub use store::{DatabaseManager, Entity, Filters, Insert};
