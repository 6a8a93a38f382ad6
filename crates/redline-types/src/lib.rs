//! Shared domain model and wire types for the redline feedback service.

pub mod api;
pub mod models;
