//! # Store Configuration
//!
//! Connection settings for the document store.
//! Credentials are loaded from environment variables.

use arts_core::ArtsError;
use std::env;

const DEFAULT_HOST: &str = "cluster0.qvaeumc.mongodb.net";
const DEFAULT_DATABASE: &str = "FineArts";

/// Document store connection configuration
#[derive(Clone)]
pub struct MongoConfig {
    /// Database user
    pub user: String,

    /// Database password
    pub password: String,

    /// Cluster host (SRV record name)
    pub host: String,

    /// Database holding the users/classes/carts collections
    pub database: String,

    /// Full connection string; takes precedence over user/password/host
    pub uri_override: Option<String>,
}

impl MongoConfig {
    /// Load configuration from environment variables.
    ///
    /// Either `MONGODB_URI`, or both `DB_USER` and `DB_PASS`, must be set.
    /// `DB_HOST` and `DB_NAME` are optional.
    pub fn from_env() -> Result<Self, ArtsError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let uri_override = env::var("MONGODB_URI").ok().filter(|u| !u.is_empty());

        let (user, password) = match &uri_override {
            Some(_) => (
                env::var("DB_USER").unwrap_or_default(),
                env::var("DB_PASS").unwrap_or_default(),
            ),
            None => (
                env::var("DB_USER")
                    .map_err(|_| ArtsError::Configuration("DB_USER not set".to_string()))?,
                env::var("DB_PASS")
                    .map_err(|_| ArtsError::Configuration("DB_PASS not set".to_string()))?,
            ),
        };

        Ok(Self {
            user,
            password,
            host: env::var("DB_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            database: env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            uri_override,
        })
    }

    /// Create config with explicit credentials (for testing)
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            host: DEFAULT_HOST.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            uri_override: None,
        }
    }

    /// Builder: connect with a full connection string
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri_override = Some(uri.into());
        self
    }

    /// Builder: use a different database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Connection string for the driver. Credentials are percent-encoded.
    pub fn uri(&self) -> String {
        match &self.uri_override {
            Some(uri) => uri.clone(),
            None => format!(
                "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password),
                self.host
            ),
        }
    }
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("uri_override", &self.uri_override.as_ref().map(|_| "***"))
            .finish()
    }
}
