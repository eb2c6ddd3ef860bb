#![allow(dead_code)]

pub mod builders;
pub mod db;
pub mod server;

pub use builders::{ClientBuilder, PermissionBuilder, PrincipalBuilder, RoleBuilder};
pub use db::{test_settings, TestDb, TEST_SECRET};
pub use server::TestServer;
