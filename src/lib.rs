// emsctl - lib.rs
//
// Library entry point, exposing all non-CLI modules for integration
// testing and potential future programmatic use.
//
// The CLI surface (`commands.rs`) lives in `main.rs` and is not part of
// the library.

pub mod api;
pub mod app;
pub mod core;
pub mod platform;
pub mod util;
