//! Deployment stage selection

use std::env;

use tracing::Level;

/// Deployment stage of the running process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack` unless an endpoint is configured)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

/// Default validity of URLs handed out by `/sign-upload`
pub const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 15 * 60;

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let presign_expiry_override = env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Development {
                    presign_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs are emitted as JSON lines
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Store endpoint used when `S3_ENDPOINT_URL` is not set
    #[must_use]
    pub const fn default_store_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Production | Self::Staging => None,
            // LocalStack
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// Presigned URL expiry time in seconds for direct uploads
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            Self::Development {
                presign_expiry_override,
            } => presign_expiry_override.unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
        }
    }

    /// Log level used when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_environment_from_env() {
        env::remove_var("APP_ENV");
        env::remove_var("PRESIGNED_URL_EXPIRY_SECS");
        assert_eq!(
            Environment::from_env(),
            Environment::Development {
                presign_expiry_override: None
            }
        );

        env::set_var("APP_ENV", " Staging ");
        assert_eq!(Environment::from_env(), Environment::Staging);

        env::set_var("APP_ENV", "production");
        assert_eq!(Environment::from_env(), Environment::Production);

        env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "Invalid environment: invalid")]
    fn test_invalid_environment() {
        env::set_var("APP_ENV", "invalid");
        let result = std::panic::catch_unwind(Environment::from_env);
        env::remove_var("APP_ENV");
        std::panic::resume_unwind(result.unwrap_err());
    }

    #[test]
    fn test_presigned_url_expiry_secs() {
        let env = Environment::Development {
            presign_expiry_override: None,
        };
        assert_eq!(env.presigned_url_expiry_secs(), 900);

        let env = Environment::Development {
            presign_expiry_override: Some(30),
        };
        assert_eq!(env.presigned_url_expiry_secs(), 30);

        assert_eq!(Environment::Production.presigned_url_expiry_secs(), 900);
        assert_eq!(Environment::Staging.presigned_url_expiry_secs(), 900);
    }

    #[test]
    #[serial]
    fn test_development_with_env_override() {
        env::set_var("APP_ENV", "development");
        env::set_var("PRESIGNED_URL_EXPIRY_SECS", "120");

        let env = Environment::from_env();
        assert_eq!(env.presigned_url_expiry_secs(), 120);

        env::set_var("PRESIGNED_URL_EXPIRY_SECS", "invalid");
        let env = Environment::from_env();
        assert_eq!(
            env,
            Environment::Development {
                presign_expiry_override: None
            }
        );

        env::remove_var("PRESIGNED_URL_EXPIRY_SECS");
        env::remove_var("APP_ENV");
    }

    #[test]
    fn test_docs_and_log_format_by_stage() {
        assert!(!Environment::Production.show_api_docs());
        assert!(Environment::Staging.show_api_docs());
        assert!(Environment::Production.json_logs());
        assert!(!Environment::Development {
            presign_expiry_override: None
        }
        .json_logs());
    }
}
