//! Role-based access control over the Entity Store.
//!
//! The model is flat: principals hold roles, roles carry permissions, and a
//! permission is scoped to at most one resource type and to any number of
//! concrete resource identifiers. Nothing here is cached; every decision reads
//! the current store state.

pub mod errors;
pub mod evaluator;
pub mod grants;
pub mod graph;
pub mod types;
pub mod web;
