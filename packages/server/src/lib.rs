// Smachna - Restaurant Directory API Core
//
// This crate provides the establishment lifecycle (draft -> moderation ->
// public visibility) and the geospatial discovery engine behind the consumer
// directory. Rendering, authentication and notification delivery live in
// collaborating services; this core trusts the upstream gateway for actor
// identity.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
