//! Gatekeeper - identity and access backend
//!
//! Password-grant bearer tokens with single-use refresh rotation, and a flat
//! RBAC model answering type-scoped and instance-scoped authorization checks.
//! All modules are public so integration tests can drive them directly.

pub mod credentials;
pub mod entities;
pub mod errors;
pub mod password;
pub mod rbac;
pub mod seed;
pub mod settings;
pub mod signer;
pub mod storage;
pub mod web;
