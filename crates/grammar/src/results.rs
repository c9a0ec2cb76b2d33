use common::{Parsed, Rejection, Result, DEFAULT_LEVERAGE, DEFAULT_RISK_FACTOR};

use crate::close::{self, CloseRules};
use crate::config::ProviderOverride;
use crate::message::Message;
use crate::normalize::{leverage_values, parse_decimal, price_tokens, ticker};
use crate::validate::{validate, Candidate};
use crate::Grammar;

pub const RESULTS_TAG: &str = "results";

/// The operator's own channel, one field per line:
///
/// ```text
/// c eth
/// e 1830 1740
/// t 1850 1870 1920
/// sl 1650
/// l 100
/// r 0.5
/// force
/// ```
#[derive(Debug, Clone)]
pub struct ResultsGrammar {
    leverage: u32,
    risk_factor: f64,
    target_cap: Option<usize>,
}

impl Default for ResultsGrammar {
    fn default() -> Self {
        Self {
            leverage: DEFAULT_LEVERAGE,
            risk_factor: DEFAULT_RISK_FACTOR,
            target_cap: None,
        }
    }
}

impl Grammar for ResultsGrammar {
    fn tag(&self) -> &str {
        RESULTS_TAG
    }

    fn parse(&self, text: &str) -> Result<Parsed> {
        let msg = Message::new(text);
        if let Some(close) = close::detect(&msg, RESULTS_TAG, CloseRules::default())? {
            return Ok(Parsed::Close(close));
        }

        let mut candidate = Candidate::default();
        let mut leverage = None;
        let mut risk_factor = None;
        let mut force = false;

        for line in &msg.lines {
            let (key, rest) = line
                .split_once(char::is_whitespace)
                .unwrap_or((line.as_str(), ""));
            match key {
                "c" => candidate.coin = ticker(rest),
                "e" => candidate.entries = prices(rest),
                "t" => {
                    let tokens = price_tokens(rest);
                    candidate.partial_fill = tokens.iter().any(|t| t.filled);
                    candidate.targets = tokens.iter().map(|t| t.value).collect();
                }
                "sl" => candidate.sl = prices(rest).first().copied(),
                "l" => leverage = leverage_values(rest).into_iter().reduce(f64::max),
                "r" => risk_factor = parse_decimal(rest),
                "force" => force = true,
                _ => {}
            }
        }

        if let Some(cap) = self.target_cap {
            candidate.targets.truncate(cap);
        }
        let risk_factor = risk_factor.unwrap_or(self.risk_factor);
        if !(risk_factor > 0.0) {
            return Err(Rejection::Other(format!("risk factor {risk_factor} must be positive")).into());
        }
        let leverage = leverage
            .filter(|l| *l >= 1.0)
            .map_or(self.leverage, |l| l.round().min(f64::from(u32::MAX)) as u32);

        let signal = validate(candidate, RESULTS_TAG)?
            .with_leverage(leverage)
            .with_risk_factor(risk_factor)
            .with_force_limit(force);
        Ok(Parsed::Open(signal))
    }

    fn configure(&mut self, overrides: &ProviderOverride) {
        if let Some(leverage) = overrides.leverage {
            self.leverage = leverage;
        }
        if let Some(risk_factor) = overrides.risk_factor {
            self.risk_factor = risk_factor;
        }
        if overrides.target_cap.is_some() {
            self.target_cap = overrides.target_cap;
        }
    }
}

fn prices(fragment: &str) -> Vec<f64> {
    price_tokens(fragment).iter().map(|t| t.value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Error;

    #[test]
    fn reads_every_field() {
        let parsed = ResultsGrammar::default()
            .parse("\nc ETH\ne 1830 1740\nt 1850 1870 1920 1980 2050\nsl 1650\nl 100\nr 0.5")
            .unwrap();
        let s = parsed.signal().unwrap();
        assert_eq!(s.coin, "ETH");
        assert_eq!(s.entries, vec![1740.0, 1830.0]);
        assert_eq!(s.targets, vec![1850.0, 1870.0, 1920.0, 1980.0, 2050.0]);
        assert_eq!(s.sl, Some(1650.0));
        assert_eq!(s.leverage, 100);
        assert_eq!(s.risk_factor, 0.5);
        assert!(!s.force_limit_order);
        assert_eq!(s.tag, "results");
    }

    #[test]
    fn force_flag_and_defaults() {
        let parsed = ResultsGrammar::default()
            .parse("c etc\ne 40.2 38\nt 40.6 41.2 42 43.5 46\nsl 37\nl 75\nforce")
            .unwrap();
        let s = parsed.signal().unwrap();
        assert_eq!(s.coin, "ETC");
        assert_eq!(s.leverage, 75);
        assert_eq!(s.risk_factor, DEFAULT_RISK_FACTOR);
        assert!(s.force_limit_order);
    }

    #[test]
    fn cancel_by_label() {
        let parsed = ResultsGrammar::default().parse("cancel my_tag").unwrap();
        let close = parsed.close().unwrap();
        assert_eq!(close.coin, None);
        assert_eq!(close.tag.as_deref(), Some("my_tag"));
    }

    #[test]
    fn missing_coin_is_rejected() {
        let err = ResultsGrammar::default().parse("e 2.5\nt 3.1").unwrap_err();
        assert!(matches!(err, Error::InvalidSignal(Rejection::MissingCoin)));
    }

    #[test]
    fn overrides_apply() {
        let mut grammar = ResultsGrammar::default();
        grammar.configure(&ProviderOverride {
            tag: RESULTS_TAG.into(),
            leverage: Some(10),
            risk_factor: None,
            target_cap: Some(1),
        });
        let parsed = grammar.parse("c 1inch\ne 2.5\nt 2.6 3.1").unwrap();
        let s = parsed.signal().unwrap();
        assert_eq!(s.coin, "1INCH");
        assert_eq!(s.leverage, 10);
        assert_eq!(s.targets, vec![2.6]);
    }
}
