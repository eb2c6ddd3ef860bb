use gatekeeper::settings::{Database as DbCfg, Settings};
use gatekeeper::signer::TokenSigner;
use gatekeeper::storage;
use sea_orm::DatabaseConnection;
use tempfile::NamedTempFile;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test database with automatic cleanup
pub struct TestDb {
    connection: DatabaseConnection,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let connection = storage::init(&DbCfg {
            url: format!("sqlite://{}?mode=rwc", db_path),
        })
        .await
        .expect("Failed to init test database");

        Self {
            connection,
            _temp_file: temp_file,
        }
    }

    /// Get database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn signer(&self, lifetime_secs: i64) -> TokenSigner {
        TokenSigner::new(TEST_SECRET, lifetime_secs).expect("Failed to build signer")
    }
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.server.host = "127.0.0.1".into();
    settings.server.port = 0;
    settings.tokens.secret = TEST_SECRET.into();
    settings
}
