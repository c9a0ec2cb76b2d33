pub mod close;
pub mod config;
pub mod layout;
pub mod message;
pub mod normalize;
pub mod providers;
pub mod registry;
pub mod results;
pub mod validate;

pub use config::{ProviderFileConfig, ProviderOverride};
pub use layout::{CoinRule, ForceLimit, Layout, LayoutGrammar, LeverageRule, StopPick};
pub use registry::GrammarRegistry;
pub use results::ResultsGrammar;
pub use validate::{MAX_PRICE_DEVIATION, MIN_PRICE_RATIO};

use common::{Parsed, Result};

/// All provider grammars must satisfy this trait.
pub trait Grammar: Send + Sync {
    /// Provider tag this grammar is registered under.
    fn tag(&self) -> &str;

    /// Parse one raw message from this provider.
    ///
    /// Returns a close instruction or a validated signal. Anything else is
    /// `Error::InvalidSignal` with the reason it was dropped.
    fn parse(&self, text: &str) -> Result<Parsed>;

    /// Apply operator overrides from the provider config file.
    fn configure(&mut self, overrides: &ProviderOverride);
}
