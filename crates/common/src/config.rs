use crate::{Error, Result};

const DEFAULT_PROVIDER_CONFIG_PATH: &str = "config/providers.toml";

/// Host configuration loaded from environment variables at startup.
///
/// The parsing core itself needs none of this; it only tells the host
/// where provider overrides live and how to calibrate sizing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the TOML provider override file. May not exist.
    pub provider_config_path: String,
    /// Overrides the `[risk] base_risk` value from the provider file.
    pub base_risk: Option<f64>,
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let base_risk = match optional_env("SIGPARSE_BASE_RISK") {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("SIGPARSE_BASE_RISK is not a number: '{raw}'"))
                })?;
                if !(value.is_finite() && value > 0.0) {
                    return Err(Error::Config(format!(
                        "SIGPARSE_BASE_RISK must be positive, got {value}"
                    )));
                }
                Some(value)
            }
            None => None,
        };

        Ok(Config {
            provider_config_path: optional_env("SIGPARSE_PROVIDER_CONFIG")
                .unwrap_or_else(|| DEFAULT_PROVIDER_CONFIG_PATH.to_string()),
            base_risk,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
