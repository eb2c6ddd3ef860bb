//! Bearer credential lifecycle: password-grant issue, refresh rotation,
//! revocation and per-request validation.

pub mod errors;
pub mod issuer;
pub mod validator;
pub mod web;

pub use issuer::Issuer;
pub use validator::{Authenticated, Validator};
