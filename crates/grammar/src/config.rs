use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Provider override file (TOML).
///
/// Example `config/providers.toml`:
/// ```toml
/// [[provider]]
/// tag = "MVIP"
/// risk_factor = 0.3
///
/// [[provider]]
/// tag = "LVIP"
/// leverage = 15
/// target_cap = 3
/// ```
///
/// Tables other than `provider` (such as `[risk]`) are read by other crates.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderFileConfig {
    #[serde(rename = "provider", default)]
    pub providers: Vec<ProviderOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProviderOverride {
    /// Provider tag, e.g. "MVIP".
    pub tag: String,
    /// Default leverage used when the message gives none.
    pub leverage: Option<u32>,
    pub risk_factor: Option<f64>,
    /// Number of targets tracked.
    pub target_cap: Option<usize>,
}

impl ProviderFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)?;
        for provider in &cfg.providers {
            provider.check()?;
        }
        Ok(cfg)
    }
}

impl ProviderOverride {
    fn check(&self) -> Result<()> {
        let invalid = |field: &str| {
            Err(Error::Config(format!(
                "provider '{}': {field} must be positive",
                self.tag
            )))
        };
        if self.leverage == Some(0) {
            return invalid("leverage");
        }
        if self.risk_factor.is_some_and(|r| !(r.is_finite() && r > 0.0)) {
            return invalid("risk_factor");
        }
        if self.target_cap == Some(0) {
            return invalid("target_cap");
        }
        Ok(())
    }
}
