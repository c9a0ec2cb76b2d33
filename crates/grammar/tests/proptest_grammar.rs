use proptest::prelude::*;

use common::Error;
use grammar::GrammarRegistry;

fn registry() -> &'static GrammarRegistry {
    static REGISTRY: std::sync::OnceLock<GrammarRegistry> = std::sync::OnceLock::new();
    REGISTRY.get_or_init(GrammarRegistry::builtin)
}

fn any_tag() -> impl Strategy<Value = String> {
    let tags: Vec<String> = registry().tags().into_iter().map(String::from).collect();
    prop::sample::select(tags)
}

/// Text built from the fragments providers actually use, so the parsers get
/// past the keyword checks instead of bailing on the first line.
fn signal_like() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("#BTC/USDT".to_string()),
        Just("LONG".to_string()),
        Just("SHORT".to_string()),
        Just("Entry".to_string()),
        Just("Entry Zone:".to_string()),
        Just("Targets:".to_string()),
        Just("Take-Profit Targets:".to_string()),
        Just("Stop loss".to_string()),
        Just("SL".to_string()),
        Just("Leverage".to_string()),
        Just("✅".to_string()),
        Just("(".to_string()),
        Just("+".to_string()),
        Just("-".to_string()),
        Just("\n".to_string()),
        Just("close".to_string()),
        (0.0001f64..100_000.0).prop_map(|v| format!("{v}")),
        (1u32..100).prop_map(|v| format!("{v}x")),
        (1u32..10).prop_map(|v| format!("{v})")),
        "[a-z0-9,.$%]{1,8}",
    ];
    prop::collection::vec(fragment, 0..40).prop_map(|parts| parts.join(" "))
}

proptest! {
    /// No grammar may panic, whatever the provider sends.
    #[test]
    fn arbitrary_text_never_panics(tag in any_tag(), text in any::<String>()) {
        let _ = registry().parse(&tag, &text);
    }

    #[test]
    fn signal_like_text_never_panics(tag in any_tag(), text in signal_like()) {
        let _ = registry().parse(&tag, &text);
    }

    /// Parsing carries no hidden state: the same input gives the same output.
    #[test]
    fn reparse_is_identical(tag in any_tag(), text in signal_like()) {
        let first = registry().parse(&tag, &text);
        let second = registry().parse(&tag, &text);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(Error::InvalidSignal(a)), Err(Error::InvalidSignal(b))) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "outcomes differ: {:?} vs {:?}", a, b),
        }
    }

    /// Every accepted signal satisfies the validator's guarantees.
    #[test]
    fn accepted_signals_are_well_formed(tag in any_tag(), text in signal_like()) {
        if let Ok(parsed) = registry().parse(&tag, &text) {
            if let Some(s) = parsed.signal() {
                prop_assert!(!s.coin.is_empty());
                prop_assert!(!s.entries.is_empty());
                prop_assert!(!s.targets.is_empty());
                prop_assert!(s.entries.windows(2).all(|w| w[0] <= w[1]));
                let all_positive = s
                    .entries
                    .iter()
                    .chain(&s.targets)
                    .chain(s.sl.as_ref())
                    .all(|p| p.is_finite() && *p > 0.0);
                prop_assert!(all_positive);
                prop_assert!(s.leverage >= 1);
                prop_assert!(s.risk_factor > 0.0);
            }
        }
    }
}
