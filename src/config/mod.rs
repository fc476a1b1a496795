use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ghl: GhlConfig,
    pub clio: ClioConfig,
    pub http: HttpConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhlConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClioConfig {
    pub base_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub access_token: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub sync_concurrency: usize,
    pub bulk_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

pub const GHL_DEFAULT_BASE_URL: &str = "https://rest.gohighlevel.com/v1/";
pub const CLIO_DEFAULT_BASE_URL: &str = "https://app.clio.com/api/v4/";
pub const CLIO_DEFAULT_AUTH_URL: &str = "https://app.clio.com/oauth/authorize";
pub const CLIO_DEFAULT_TOKEN_URL: &str = "https://app.clio.com/oauth/token";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("BRIDGE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("BRIDGE_BIND_HOST") {
            self.server.bind_host = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = non_empty(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // GHL overrides
        if let Ok(v) = env::var("GHL_BASE_URL") {
            self.ghl.base_url = v;
        }
        if let Ok(v) = env::var("GHL_API_KEY") {
            self.ghl.api_key = non_empty(v);
        }
        if let Ok(v) = env::var("GHL_LOCATION_ID") {
            self.ghl.location_id = non_empty(v);
        }

        // Clio overrides
        if let Ok(v) = env::var("CLIO_BASE_URL") {
            self.clio.base_url = v;
        }
        if let Ok(v) = env::var("CLIO_AUTH_URL") {
            self.clio.auth_url = v;
        }
        if let Ok(v) = env::var("CLIO_TOKEN_URL") {
            self.clio.token_url = v;
        }
        if let Ok(v) = env::var("CLIO_CLIENT_ID") {
            self.clio.client_id = non_empty(v);
        }
        if let Ok(v) = env::var("CLIO_CLIENT_SECRET") {
            self.clio.client_secret = non_empty(v);
        }
        if let Ok(v) = env::var("CLIO_REDIRECT_URI") {
            self.clio.redirect_uri = non_empty(v);
        }
        if let Ok(v) = env::var("CLIO_ACCESS_TOKEN") {
            self.clio.access_token = non_empty(v);
        }
        if let Ok(v) = env::var("CLIO_API_KEY") {
            self.clio.api_key = non_empty(v);
        }
        if let Ok(v) = env::var("CLIO_API_SECRET") {
            self.clio.api_secret = non_empty(v);
        }

        // HTTP client overrides
        if let Ok(v) = env::var("HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = v.parse().unwrap_or(self.http.timeout_secs);
        }
        if let Ok(v) = env::var("HTTP_SYNC_CONCURRENCY") {
            self.http.sync_concurrency = v.parse().unwrap_or(self.http.sync_concurrency).max(1);
        }
        if let Ok(v) = env::var("HTTP_BULK_PAGE_SIZE") {
            self.http.bulk_page_size = v.parse().unwrap_or(self.http.bulk_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("BRIDGE_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn platforms() -> (GhlConfig, ClioConfig) {
        (
            GhlConfig {
                base_url: GHL_DEFAULT_BASE_URL.to_string(),
                api_key: None,
                location_id: None,
            },
            ClioConfig {
                base_url: CLIO_DEFAULT_BASE_URL.to_string(),
                auth_url: CLIO_DEFAULT_AUTH_URL.to_string(),
                token_url: CLIO_DEFAULT_TOKEN_URL.to_string(),
                client_id: None,
                client_secret: None,
                redirect_uri: None,
                access_token: None,
                api_key: None,
                api_secret: None,
            },
        )
    }

    pub fn development() -> Self {
        let (ghl, clio) = Self::platforms();
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                run_migrations: true,
            },
            ghl,
            clio,
            http: HttpConfig {
                timeout_secs: 30,
                sync_concurrency: 2,
                bulk_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: "development-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec!["http://localhost:5000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        let (ghl, clio) = Self::platforms();
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                run_migrations: true,
            },
            ghl,
            clio,
            http: HttpConfig {
                timeout_secs: 30,
                sync_concurrency: 4,
                bulk_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        let (ghl, clio) = Self::platforms();
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                run_migrations: false,
            },
            ghl,
            clio,
            http: HttpConfig {
                timeout_secs: 30,
                sync_concurrency: 4,
                bulk_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: false,
                cors_origins: vec![],
            },
        }
    }
}

fn non_empty(v: String) -> Option<String> {
    let trimmed = v.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_point_at_public_apis() {
        let config = AppConfig::development();
        assert_eq!(config.ghl.base_url, GHL_DEFAULT_BASE_URL);
        assert_eq!(config.clio.base_url, CLIO_DEFAULT_BASE_URL);
        assert!(config.database.run_migrations);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn production_requires_explicit_secret() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.database.run_migrations);
        assert!(!config.security.enable_cors);
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        assert_eq!(non_empty("   ".to_string()), None);
        assert_eq!(non_empty(" key ".to_string()), Some("key".to_string()));
    }
}
