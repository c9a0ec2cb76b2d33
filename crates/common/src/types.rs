use serde::{Deserialize, Serialize};

/// Leverage applied when neither the message nor the provider names one.
pub const DEFAULT_LEVERAGE: u32 = 20;

/// Neutral provider aggressiveness.
pub const DEFAULT_RISK_FACTOR: f64 = 1.0;

/// Share of the entry-to-first-target distance still acceptable as a fill.
pub const MAX_ENTRY_SLIPPAGE: f64 = 0.2;

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Canonical trade instruction extracted from one provider message.
///
/// `entries` is kept in ascending order. `targets` stays in the order the
/// provider listed them until `risk::correct` reorders it by direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub coin: String,
    pub entries: Vec<f64>,
    pub targets: Vec<f64>,
    /// `None` when the provider explicitly gave no stop.
    pub sl: Option<f64>,
    pub leverage: u32,
    pub risk_factor: f64,
    /// Entry must rest as a limit order instead of filling at market.
    pub force_limit_order: bool,
    /// Provider that produced the signal.
    pub tag: String,
    /// Recommended position size as a fraction of capital. Zero until sized.
    pub fraction: f64,
}

impl Signal {
    pub fn new(
        coin: impl Into<String>,
        mut entries: Vec<f64>,
        targets: Vec<f64>,
        sl: Option<f64>,
        tag: impl Into<String>,
    ) -> Self {
        entries.sort_by(f64::total_cmp);
        Self {
            coin: coin.into(),
            entries,
            targets,
            sl,
            leverage: DEFAULT_LEVERAGE,
            risk_factor: DEFAULT_RISK_FACTOR,
            force_limit_order: false,
            tag: tag.into(),
            fraction: 0.0,
        }
    }

    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_risk_factor(mut self, risk_factor: f64) -> Self {
        self.risk_factor = risk_factor;
        self
    }

    pub fn with_force_limit(mut self, force: bool) -> Self {
        self.force_limit_order = force;
        self
    }

    /// Trade side implied by where the stop (or, failing that, the first
    /// target) sits relative to the entry zone.
    pub fn direction(&self) -> Direction {
        let first = self.entries.first().copied().unwrap_or_default();
        match (self.sl, self.targets.first()) {
            (Some(sl), _) if sl < first => Direction::Long,
            (Some(_), _) => Direction::Short,
            (None, Some(&target)) if target < first => Direction::Short,
            _ => Direction::Long,
        }
    }

    pub fn is_long(&self) -> bool {
        self.direction() == Direction::Long
    }

    /// The edge of the entry zone nearest the first target.
    pub fn best_entry(&self) -> Option<f64> {
        match self.direction() {
            Direction::Long => self.entries.last().copied(),
            Direction::Short => self.entries.first().copied(),
        }
    }

    /// Worst price still worth chasing: the near edge of the entry zone
    /// moved 20% of the way towards the first target.
    pub fn max_entry(&self) -> Option<f64> {
        let entry = self.best_entry()?;
        let target = *self.targets.first()?;
        Some(entry + (target - entry) * MAX_ENTRY_SLIPPAGE)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x{} ({:.4}%, e: {:?}, sl: ",
            self.coin,
            self.leverage,
            self.fraction * 100.0,
            self.entries
        )?;
        match self.sl {
            Some(sl) => write!(f, "{sl}")?,
            None => write!(f, "none")?,
        }
        write!(f, ", targets: {:?})", self.targets)
    }
}

/// Request to stop managing one or more positions.
///
/// `coin` and `tag` are only set when the message names them; both absent
/// means "close everything from this provider".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseInstruction {
    /// Provider that issued the close.
    pub provider: String,
    pub coin: Option<String>,
    /// Label of a previously issued signal.
    pub tag: Option<String>,
}

impl CloseInstruction {
    pub fn all(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            coin: None,
            tag: None,
        }
    }

    pub fn coin(provider: impl Into<String>, coin: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            coin: Some(coin.into()),
            tag: None,
        }
    }

    pub fn labelled(provider: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            coin: None,
            tag: Some(tag.into()),
        }
    }
}

/// Successful outcome of parsing one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Parsed {
    Open(Signal),
    Close(CloseInstruction),
}

impl Parsed {
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Parsed::Open(signal) => Some(signal),
            Parsed::Close(_) => None,
        }
    }

    pub fn close(&self) -> Option<&CloseInstruction> {
        match self {
            Parsed::Close(close) => Some(close),
            Parsed::Open(_) => None,
        }
    }
}

/// Reason a message was not accepted as a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rejection {
    /// None of the provider's layouts recognised the message structure.
    NoLayout,
    MissingCoin,
    MissingEntries,
    MissingTargets,
    /// A stop-loss line is present but its level could not be read.
    MissingStop,
    NonPositivePrice(f64),
    /// Explicit long/short wording contradicts the price levels.
    DirectionMismatch,
    StopInsideEntryZone,
    /// Targets do not all lie beyond the entry zone.
    TargetsInsideEntryZone,
    /// A level sits implausibly far from the entry zone.
    ImplausibleMove { price: f64, entry: f64 },
    /// Status update on an already running trade.
    PartialFill,
    /// Close request covering only part of a position.
    PartialClose,
    Other(String),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NoLayout => write!(f, "no provider layout matched"),
            Rejection::MissingCoin => write!(f, "no ticker found"),
            Rejection::MissingEntries => write!(f, "no entry prices found"),
            Rejection::MissingTargets => write!(f, "no target prices found"),
            Rejection::MissingStop => write!(f, "unreadable stop-loss level"),
            Rejection::NonPositivePrice(p) => write!(f, "non-positive price {p}"),
            Rejection::DirectionMismatch => write!(f, "stated direction contradicts price levels"),
            Rejection::StopInsideEntryZone => write!(f, "stop-loss inside entry zone"),
            Rejection::TargetsInsideEntryZone => write!(f, "targets not beyond entry zone"),
            Rejection::ImplausibleMove { price, entry } => {
                write!(f, "level {price} implausibly far from entry {entry}")
            }
            Rejection::PartialFill => write!(f, "status update for an open trade"),
            Rejection::PartialClose => write!(f, "partial close request"),
            Rejection::Other(s) => write!(f, "{s}"),
        }
    }
}
