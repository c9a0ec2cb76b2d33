use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::{CloseInstruction, Error, Parsed, Rejection, Signal};
use grammar::GrammarRegistry;
use risk::{correct, RiskSizer};

/// One line of input: a provider message and, optionally, the coin's
/// current market price.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub tag: String,
    pub text: String,
    #[serde(default)]
    pub price: Option<f64>,
}

/// One line of output.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub tag: String,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Open { signal: Signal, corrected: bool },
    Close { close: CloseInstruction },
    Rejected { reason: Rejection, message: String },
    Error { message: String },
}

pub fn handle(registry: &GrammarRegistry, sizer: &RiskSizer, request: Request) -> Report {
    let outcome = match evaluate(registry, sizer, &request) {
        Ok(outcome) => outcome,
        Err(Error::InvalidSignal(reason)) => {
            info!(tag = %request.tag, reason = %reason, "Message rejected");
            Outcome::Rejected {
                message: reason.to_string(),
                reason,
            }
        }
        Err(e) => {
            warn!(tag = %request.tag, err = %e, "Message failed");
            Outcome::Error {
                message: e.to_string(),
            }
        }
    };
    Report {
        tag: request.tag,
        received_at: Utc::now(),
        outcome,
    }
}

fn evaluate(registry: &GrammarRegistry, sizer: &RiskSizer, request: &Request) -> common::Result<Outcome> {
    match registry.parse(&request.tag, &request.text)? {
        Parsed::Open(signal) => {
            let (signal, corrected) = match request.price {
                Some(price) => (correct(&signal, price, sizer)?, true),
                None => (signal, false),
            };
            info!(
                tag = %signal.tag,
                coin = %signal.coin,
                entries = ?signal.entries,
                sl = ?signal.sl,
                fraction = signal.fraction,
                "Signal parsed"
            );
            Ok(Outcome::Open { signal, corrected })
        }
        Parsed::Close(close) => {
            info!(tag = %close.provider, coin = ?close.coin, "Close instruction parsed");
            Ok(Outcome::Close { close })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tag: &str, text: &str, price: Option<f64>) -> Outcome {
        let request = Request {
            tag: tag.to_string(),
            text: text.to_string(),
            price,
        };
        handle(&GrammarRegistry::builtin(), &RiskSizer::default(), request).outcome
    }

    #[test]
    fn open_signal_is_corrected_when_priced() {
        let outcome = run("results", "c blz\ne 28390\nt 28500\nsl 26970", Some(0.0283));
        match outcome {
            Outcome::Open { signal, corrected } => {
                assert!(corrected);
                assert!((signal.entries[0] - 0.02839).abs() < 1e-12);
                assert!(signal.fraction > 0.0);
            }
            other => panic!("expected open, got {other:?}"),
        }
    }

    #[test]
    fn unpriced_signal_keeps_raw_levels() {
        match run("results", "c eth\ne 1800\nt 1900", None) {
            Outcome::Open { signal, corrected } => {
                assert!(!corrected);
                assert_eq!(signal.entries, vec![1800.0]);
            }
            other => panic!("expected open, got {other:?}"),
        }
    }

    #[test]
    fn errors_and_rejections_are_reported() {
        assert!(matches!(run("NOPE", "c eth", None), Outcome::Error { .. }));
        assert!(matches!(
            run("results", "c eth\ne 1800\nt 1900", Some(-1.0)),
            Outcome::Error { .. }
        ));
        assert!(matches!(
            run("results", "c eth\nt 1900", None),
            Outcome::Rejected { reason: Rejection::MissingEntries, .. }
        ));
    }

    #[test]
    fn report_serializes_flat() {
        let request = Request {
            tag: "results".to_string(),
            text: "close eth".to_string(),
            price: None,
        };
        let report = handle(&GrammarRegistry::builtin(), &RiskSizer::default(), request);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tag"], "results");
        assert_eq!(json["outcome"], "close");
        assert!(json["received_at"].is_string());
    }
}
