//! The built-in provider catalogue.
//!
//! Each provider gets its own grammar. Layouts shared by several providers
//! (Cornix-style forwards, re-posted formats) are constants reused with
//! `..` so a provider can tweak one field without touching the others.

use crate::close::CloseRules;
use crate::layout::{CoinRule, ForceLimit, Layout, LayoutGrammar, LeverageRule, StopPick};
use crate::results::ResultsGrammar;
use crate::Grammar;

// ─── Shared layouts ──────────────────────────────────────────────────────────

/// Cornix bot forwards: "Entry Zone / Take-Profit Targets / Stop Targets".
const CORNIX: Layout = Layout {
    entry: &["entry zone", "entry targets"],
    targets: &["take-profit targets"],
    stop: &["stop targets"],
    ..Layout::BASE
};

/// "Leverage Use Only 3x-5x" is advice unless capped with "Maximum".
const BFP2: Layout = Layout {
    entry: &["long/buy", "buy below only", "short/sell"],
    targets: &["target"],
    stop: &["stop loss"],
    ..Layout::BASE
};

const PBF: Layout = Layout {
    entry: &["entry price"],
    targets: &["target"],
    stop: &["stop loss"],
    ..Layout::BASE
};

const FWP: Layout = Layout {
    entry: &["buy"],
    targets: &["target"],
    stop: &["stop loss", "stol loss"],
    risk_factor: 0.5,
    ..Layout::BASE
};

const CCS: Layout = Layout {
    entry: &["long", "short"],
    targets: &["take profit"],
    stop: &["sl"],
    risk_factor: 2.0,
    force: ForceLimit::OnBound,
    ..Layout::BASE
};

const MCVIP: Layout = Layout {
    entry: &["long", "short"],
    targets: &["target"],
    stop: &["stop"],
    ..Layout::BASE
};

const BUSA: Layout = Layout {
    entry: &["entry", "now"],
    targets: &["target"],
    stop: &["sl"],
    stop_suffix: &["can be stop"],
    risk_factor: 0.5,
    ..Layout::BASE
};

/// Plain "Entry / Target / Stop loss" posts.
const ENTRY_TARGET: Layout = Layout {
    entry: &["entry"],
    targets: &["target"],
    stop: &["stop loss"],
    ..Layout::BASE
};

// ─── Catalogue ───────────────────────────────────────────────────────────────

fn single(tag: &str, layout: Layout) -> Box<dyn Grammar> {
    Box::new(LayoutGrammar::new(tag, layout))
}

fn composite(tag: &str, layouts: Vec<Layout>) -> Box<dyn Grammar> {
    Box::new(LayoutGrammar::composite(tag, layouts))
}

/// Every built-in grammar, one per provider tag.
pub fn catalogue() -> Vec<Box<dyn Grammar>> {
    vec![
        single(
            "BFP",
            Layout {
                entry: &["long/buy", "short/sell", "entry point"],
                targets: &["targets"],
                stop: &["stoploss", "stop loss"],
                ..Layout::BASE
            },
        ),
        composite(
            "BFP2",
            vec![
                Layout {
                    markers: &["maximum"],
                    leverage_rule: LeverageRule::Parsed,
                    ..BFP2
                },
                BFP2,
            ],
        ),
        single(
            "BPS",
            Layout {
                entry: &["get into long", "get into short"],
                targets: &["target"],
                stop: &["stop loss"],
                ..Layout::BASE
            },
        ),
        single(
            "MVIP",
            Layout {
                entry: &["entry zone"],
                targets: &["take-profit targets"],
                stop: &["stop targets"],
                markers: &["lev"],
                leverage_rule: LeverageRule::Floor(20),
                risk_factor: 0.2,
                ..Layout::BASE
            },
        ),
        single("MCVIP", MCVIP),
        single("CCS", CCS),
        single("FWP", FWP),
        single(
            "TCA",
            Layout {
                entry: &["entry"],
                targets: &["targets"],
                stop: &["stop loss", "sl"],
                leverage_rule: LeverageRule::Parsed,
                ..Layout::BASE
            },
        ),
        single(
            "CB",
            Layout {
                entry: &["entry"],
                targets: &["targets"],
                stop: &["stoploss"],
                leverage: &["lvg"],
                ..Layout::BASE
            },
        ),
        single(
            "WB",
            Layout {
                entry: &["buy order"],
                targets: &["sell"],
                stop: &["stop loss"],
                ..Layout::BASE
            },
        ),
        single("RM", CORNIX),
        composite(
            "VIPCS",
            vec![
                Layout {
                    markers: &["take-profit targets"],
                    risk_factor: 2.0,
                    ..CORNIX
                },
                Layout {
                    entry: &["buy", "entry"],
                    targets: &["target"],
                    stop: &["stoploss"],
                    risk_factor: 2.0,
                    ..Layout::BASE
                },
            ],
        ),
        single(
            "CEP",
            Layout {
                entry: &["buy"],
                targets: &["sell targets"],
                stop: &["stoploss"],
                target_cap: Some(5),
                ..Layout::BASE
            },
        ),
        single("CM", ENTRY_TARGET),
        single("CS", ENTRY_TARGET),
        single("BUSA", BUSA),
        single(
            "EBS",
            Layout {
                entry: &["short entry", "long entry"],
                targets: &["target"],
                stop: &["stop"],
                leverage_rule: LeverageRule::Parsed,
                risk_factor: 0.5,
                ..Layout::BASE
            },
        ),
        single(
            "KBV",
            Layout {
                entry: &["entry limit", "buy limit"],
                targets: &["sell"],
                stop: &["stop loss"],
                ..Layout::BASE
            },
        ),
        single(
            "BVIP",
            Layout {
                entry: &["long", "short", "entry", "buying"],
                targets: &["target"],
                stop: &["stop"],
                ..Layout::BASE
            },
        ),
        single("PBF", PBF),
        composite(
            "FXVIP",
            vec![
                Layout {
                    markers: &["entry price"],
                    ..PBF
                },
                Layout {
                    markers: &["target 1", "buy"],
                    ..FWP
                },
                Layout {
                    markers: &["leverage hold"],
                    ..CCS
                },
                Layout {
                    markers: &["targets:"],
                    ..MCVIP
                },
                Layout {
                    risk_factor: 0.5,
                    ..ENTRY_TARGET
                },
            ],
        ),
        single(
            "BAW",
            Layout {
                targets: &["targets"],
                ..ENTRY_TARGET
            },
        ),
        composite(
            "HBTCV",
            vec![
                Layout {
                    markers: &["take-profit targets"],
                    ..CORNIX
                },
                Layout {
                    entry: &["entry"],
                    targets: &["targets"],
                    stop: &["stoploss"],
                    target_cap: Some(5),
                    ..Layout::BASE
                },
            ],
        ),
        Box::new(
            LayoutGrammar::composite(
                "CY",
                vec![
                    Layout {
                        entry: &["buy", "sell"],
                        targets: &["target"],
                        stop: &["stop"],
                        markers: &["target"],
                        leverage_rule: LeverageRule::Parsed,
                        risk_factor: 0.5,
                        ..Layout::BASE
                    },
                    Layout {
                        entry: &["buy"],
                        targets: &["sell"],
                        stop: &["stop"],
                        leverage_rule: LeverageRule::Parsed,
                        risk_factor: 0.5,
                        ..Layout::BASE
                    },
                ],
            )
            .with_close_rules(CloseRules { stop_verb: true }),
        ),
        single(
            "KCE",
            Layout {
                entry: &["entry", "now", "buy setup"],
                risk_factor: 1.0,
                ..BUSA
            },
        ),
        composite(
            "RWS",
            vec![
                Layout {
                    markers: &["take-profit targets"],
                    leverage_rule: LeverageRule::Parsed,
                    entry_cap: Some(1),
                    ..CORNIX
                },
                Layout {
                    entry: &["usdt"],
                    targets: &["targets"],
                    stop: &["stop loss"],
                    leverage_rule: LeverageRule::Parsed,
                    risk_factor: 0.5,
                    ..Layout::BASE
                },
            ],
        ),
        single(
            "SS",
            Layout {
                entry: &["#short", "#long"],
                targets: &["close"],
                stop: &["stop"],
                ..Layout::BASE
            },
        ),
        single(
            "SLVIP",
            Layout {
                entry: &["entry zone", "open short", "open long"],
                targets: &["sell zone", "target"],
                stop: &["stoploss", "stop"],
                leverage: &["lev"],
                leverage_rule: LeverageRule::Floor(5),
                ..Layout::BASE
            },
        ),
        single(
            "CCC",
            Layout {
                entry: &["entry"],
                targets: &["target"],
                stop: &["stoploss", "stop"],
                stop_pick: StopPick::Last,
                target_cap: Some(5),
                coin: &[CoinRule::Pair, CoinRule::FirstWord, CoinRule::Tagged],
                ..Layout::BASE
            },
        ),
        single("KSP", CORNIX),
        single(
            "VIPBB",
            Layout {
                entry: &["buy setup", "buy"],
                targets: &["sell", "take-profit targets"],
                stop: &["stop loss"],
                leverage: &["lev"],
                leverage_rule: LeverageRule::Parsed,
                risk_factor: 0.5,
                ..Layout::BASE
            },
        ),
        single(
            "PVIP",
            Layout {
                entry: &["buy long", "sell short"],
                targets: &["target"],
                stop: &["stop-loss"],
                leverage_rule: LeverageRule::Floor(5),
                risk_factor: 0.5,
                ..Layout::BASE
            },
        ),
        single(
            "PHVIP",
            Layout {
                leverage_rule: LeverageRule::Parsed,
                ..CORNIX
            },
        ),
        single(
            "CC",
            Layout {
                entry: &["entry"],
                targets: &["tp"],
                stop: &["s/l"],
                ..Layout::BASE
            },
        ),
        single(
            "C",
            Layout {
                entry: &["buy", "sell"],
                targets: &["targets"],
                stop: &["stop"],
                ..Layout::BASE
            },
        ),
        single(
            "YCP",
            Layout {
                entry: &["entry zone"],
                targets: &["targets"],
                stop: &["overall stop-loss"],
                leverage_rule: LeverageRule::Floor(5),
                ..Layout::BASE
            },
        ),
        single(
            "LVIP",
            Layout {
                entry: &["buy", "long", "short"],
                targets: &["target"],
                stop: &["stop", "sl"],
                default_leverage: 10,
                target_cap: Some(5),
                ..Layout::BASE
            },
        ),
        single(
            "BSS",
            Layout {
                stop: &["stoploss"],
                ..ENTRY_TARGET
            },
        ),
        single(
            "VIPCC",
            Layout {
                entry: &["short", "long"],
                targets: &["take profit"],
                stop: &["stoploss"],
                ..Layout::BASE
            },
        ),
        single(
            "TVIPAW",
            Layout {
                entry: &["entries"],
                targets: &["target"],
                stop: &["sl"],
                risk_factor: 0.5,
                ..Layout::BASE
            },
        ),
        single(
            "VIPBS",
            Layout {
                entry: &["buy"],
                targets: &["sell"],
                stop: &["sl"],
                risk_factor: 2.0,
                ..Layout::BASE
            },
        ),
        single(
            "JPC",
            Layout {
                entry: &["long entry", "long now", "short", "long"],
                targets: &["tp", "target"],
                stop: &["stoploss", "stop-loss"],
                risk_factor: 2.0,
                ..Layout::BASE
            },
        ),
        single(
            "W",
            Layout {
                entry: &["sell", "buy", "long above", "short below"],
                targets: &["target"],
                stop: &["stoploss", "stopls"],
                ..Layout::BASE
            },
        ),
        single(
            "JMP",
            Layout {
                entry: &["buy"],
                targets: &["sell"],
                stop: &["sl"],
                risk_factor: 2.0,
                ..Layout::BASE
            },
        ),
        single(
            "BK",
            Layout {
                entry: &["entry"],
                targets: &["short term"],
                stop: &["stop loss"],
                risk_factor: 2.0,
                ..Layout::BASE
            },
        ),
        single(
            "E",
            Layout {
                entry: &["long zone", "short zone"],
                targets: &["target"],
                stop: &["sl"],
                risk_factor: 2.0,
                ..Layout::BASE
            },
        ),
        Box::new(ResultsGrammar::default()),
    ]
}
