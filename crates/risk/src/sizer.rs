use serde::{Deserialize, Serialize};

use common::{Error, Result, Signal};

/// Fraction of capital lost when a stop is hit at risk factor 1.
pub const DEFAULT_BASE_RISK: f64 = 0.01;

/// What the stop distance is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBasis {
    /// `|entry - sl| / sl`
    #[default]
    StopLoss,
    /// `|entry - sl| / entry`
    Entry,
}

/// Which entry of a multi-entry zone is assumed filled when sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorstEntry {
    /// The entry nearest the stop: the smallest distance, the largest size.
    #[default]
    ClosestToStop,
    FarthestFromStop,
    /// The lowest entry.
    First,
}

/// User-configurable sizing parameters, the `[risk]` table of the
/// provider file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub base_risk: f64,
    pub stop_basis: StopBasis,
    pub worst_entry: WorstEntry,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            base_risk: DEFAULT_BASE_RISK,
            stop_basis: StopBasis::default(),
            worst_entry: WorstEntry::default(),
        }
    }
}

/// The `[risk]` view of the provider file. Other tables are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskFileConfig {
    #[serde(default)]
    pub risk: RiskSettings,
}

impl RiskFileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)?;
        let base = cfg.risk.base_risk;
        if !(base.is_finite() && base > 0.0 && base <= 1.0) {
            return Err(Error::Config(format!(
                "risk.base_risk must be in (0, 1], got {base}"
            )));
        }
        Ok(cfg)
    }
}

/// Sizes positions so a stop-out costs `base_risk × risk_factor` of capital
/// whatever the leverage and stop distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskSizer {
    settings: RiskSettings,
}

impl RiskSizer {
    pub fn new(settings: RiskSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }

    /// Entry assumed filled for risk purposes.
    pub fn worst_entry(&self, signal: &Signal) -> Option<f64> {
        let sl = signal.sl?;
        let distance = |e: f64| (e - sl).abs();
        let entries = signal.entries.iter().copied();
        match self.settings.worst_entry {
            WorstEntry::ClosestToStop => entries.min_by(|a, b| distance(*a).total_cmp(&distance(*b))),
            WorstEntry::FarthestFromStop => entries.max_by(|a, b| distance(*a).total_cmp(&distance(*b))),
            WorstEntry::First => signal.entries.first().copied(),
        }
    }

    /// Distance from the worst entry to the stop, as a fraction of the basis.
    pub fn stop_distance(&self, signal: &Signal) -> Option<f64> {
        let sl = signal.sl?;
        let entry = self.worst_entry(signal)?;
        let basis = match self.settings.stop_basis {
            StopBasis::StopLoss => sl,
            StopBasis::Entry => entry,
        };
        let distance = (entry - sl).abs() / basis;
        (distance.is_finite() && distance > 0.0).then_some(distance)
    }

    /// Position size as a fraction of capital. Zero without a stop, since
    /// the loss is then unbounded.
    pub fn fraction(&self, signal: &Signal) -> f64 {
        let Some(distance) = self.stop_distance(signal) else {
            return 0.0;
        };
        let leverage = f64::from(signal.leverage.max(1));
        self.settings.base_risk * signal.risk_factor / (leverage * distance)
    }
}
