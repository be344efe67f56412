// emsctl - core/mod.rs
//
// Core business logic layer: pure data transformations.
// Must NOT depend on: api, app, platform, or any I/O beyond Write seams.

pub mod export;
pub mod filter;
pub mod logparse;
pub mod model;
pub mod reconcile;
pub mod stats;
