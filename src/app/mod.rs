// emsctl - app/mod.rs
//
// Application layer: the import, bulk and log-view pipelines plus
// session persistence.
// Dependencies: core and api layers.
// Must NOT depend on: the CLI surface, platform specifics.

pub mod bulk;
pub mod import;
pub mod logs;
pub mod session;
