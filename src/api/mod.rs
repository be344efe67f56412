// emsctl - api/mod.rs
//
// Employee service collaborator layer: the Backend trait the pipelines
// are written against, the reqwest implementation, and the session and
// authentication types that travel with requests.

pub mod auth;
pub mod backend;
pub mod rest;
