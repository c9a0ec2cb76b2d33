use tracing::debug;

use common::{Parsed, Rejection, Result, Signal, DEFAULT_LEVERAGE, DEFAULT_RISK_FACTOR};

use crate::close::{self, CloseRules};
use crate::config::ProviderOverride;
use crate::message::{find_keyword, lead_word, Message};
use crate::normalize::{
    drop_list_index, find_pair, find_tagged, leverage_values, price_tokens, ticker, PriceToken,
};
use crate::validate::{validate, Candidate};
use crate::Grammar;

/// Phrases meaning the provider deliberately gave no stop-loss.
const NO_STOP_PHRASES: [&str; 2] = ["no stop", "no sl"];

/// Stop line placeholder used while a provider has yet to publish the level.
const PENDING_STOP: &str = "update";

/// Entry wording that asks for a resting limit order.
const BOUND_WORDS: [&str; 2] = ["below", "above"];

/// Explicit limit-order request, honoured by every layout.
const FORCE_WORD: &str = "force";

/// Where to look for the coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinRule {
    /// A `XXX/USDT` style pair anywhere in the body.
    Pair,
    /// A `#xxx` or `$xxx` mention.
    Tagged,
    /// The first word of the message.
    FirstWord,
}

impl CoinRule {
    fn find(self, msg: &Message) -> Option<String> {
        match self {
            CoinRule::Pair => msg.lines.iter().find_map(|line| find_pair(line)),
            CoinRule::Tagged => msg.lines.iter().find_map(|line| find_tagged(line)),
            CoinRule::FirstWord => msg
                .lines
                .first()
                .and_then(|line| lead_word(line))
                .and_then(ticker),
        }
    }
}

/// Which number of a multi-number stop line is the stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPick {
    First,
    Last,
}

/// How the leverage of a signal is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeverageRule {
    /// Ignore the text and use the provider default.
    Default,
    /// Highest multiplier on the leverage line, default when absent.
    Parsed,
    /// Like `Parsed` but never below the given value.
    Floor(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceLimit {
    Never,
    /// "Long below 1.038" style entries must rest as limit orders.
    OnBound,
}

/// Keyword driven description of one provider message layout.
#[derive(Debug, Clone)]
pub struct Layout {
    pub entry: &'static [&'static str],
    pub targets: &'static [&'static str],
    pub stop: &'static [&'static str],
    pub leverage: &'static [&'static str],
    /// Phrases written after the stop level, as in "0.06$ can be stop".
    pub stop_suffix: &'static [&'static str],
    /// Literal fragments that must all appear for the layout to apply.
    pub markers: &'static [&'static str],
    pub coin: &'static [CoinRule],
    pub target_cap: Option<usize>,
    pub entry_cap: Option<usize>,
    pub stop_pick: StopPick,
    pub leverage_rule: LeverageRule,
    pub default_leverage: u32,
    pub risk_factor: f64,
    pub force: ForceLimit,
}

struct Section {
    line: usize,
    tokens: Vec<PriceToken>,
}

impl Layout {
    pub const BASE: Layout = Layout {
        entry: &[],
        targets: &[],
        stop: &[],
        leverage: &["leverage", "lev"],
        stop_suffix: &[],
        markers: &[],
        coin: &[CoinRule::Pair, CoinRule::Tagged, CoinRule::FirstWord],
        target_cap: None,
        entry_cap: None,
        stop_pick: StopPick::First,
        leverage_rule: LeverageRule::Default,
        default_leverage: DEFAULT_LEVERAGE,
        risk_factor: DEFAULT_RISK_FACTOR,
        force: ForceLimit::Never,
    };

    pub fn matches(&self, msg: &Message) -> bool {
        self.markers.iter().all(|marker| msg.text.contains(marker))
    }

    pub fn extract(&self, msg: &Message, tag: &str) -> Result<Signal, Rejection> {
        let coin = self.coin.iter().find_map(|rule| rule.find(msg));

        let fields = [self.targets, self.stop, self.leverage, self.stop_suffix];
        let entries = section(&msg.lines, self.entry, &fields).ok_or(Rejection::MissingEntries)?;
        let bounded = match self.force {
            ForceLimit::Never => false,
            ForceLimit::OnBound => BOUND_WORDS
                .iter()
                .any(|word| msg.lines[entries.line].contains(word)),
        };
        let force = bounded
            || msg
                .lines
                .iter()
                .any(|line| line.split_whitespace().any(|w| w == FORCE_WORD));

        let fields = [self.entry, self.stop, self.leverage, self.stop_suffix];
        let targets = section(&msg.lines, self.targets, &fields).ok_or(Rejection::MissingTargets)?;

        let candidate = Candidate {
            coin,
            entries: capped(&entries.tokens, self.entry_cap),
            targets: capped(&targets.tokens, self.target_cap),
            sl: self.stop_loss(msg)?,
            stated: msg.stated_direction(),
            partial_fill: targets.tokens.iter().any(|t| t.filled),
        };

        Ok(validate(candidate, tag)?
            .with_leverage(self.leverage(msg))
            .with_risk_factor(self.risk_factor)
            .with_force_limit(force))
    }

    /// `Ok(None)` only when the provider said there is no stop yet or at
    /// all, or wrote no stop line. A stop line without a readable level is
    /// a rejection.
    fn stop_loss(&self, msg: &Message) -> Result<Option<f64>, Rejection> {
        let declined = msg
            .lines
            .iter()
            .any(|line| NO_STOP_PHRASES.iter().any(|p| line.contains(p)));
        if declined {
            return Ok(None);
        }
        let stop_line = msg.lines.iter().find(|line| self.names_stop(line));
        if stop_line.is_some_and(|line| line.contains(PENDING_STOP)) {
            return Ok(None);
        }

        let fields = [self.entry, self.targets, self.leverage];
        if let Some(section) = section(&msg.lines, self.stop, &fields) {
            let token = match self.stop_pick {
                StopPick::First => section.tokens.first(),
                StopPick::Last => section.tokens.last(),
            };
            if let Some(token) = token {
                return Ok(Some(token.value));
            }
        }

        let suffixed = msg.lines.iter().find_map(|line| {
            let (start, _) = find_keyword(line, self.stop_suffix)?;
            price_tokens(line)
                .into_iter()
                .filter(|t| t.end <= start)
                .last()
                .map(|t| t.value)
        });
        match (suffixed, stop_line) {
            (Some(sl), _) => Ok(Some(sl)),
            (None, Some(_)) => Err(Rejection::MissingStop),
            (None, None) => Ok(None),
        }
    }

    /// A stop keyword standing as its own word, or glued to a number as in
    /// "stoploss3.16".
    fn names_stop(&self, line: &str) -> bool {
        self.stop.iter().any(|kw| {
            find_keyword(line, &[*kw]).is_some_and(|(_, end)| {
                !line[end..].starts_with(|c: char| c.is_alphabetic())
            })
        })
    }

    fn leverage(&self, msg: &Message) -> u32 {
        let parsed = || {
            msg.lines.iter().find_map(|line| {
                let (_, end) = find_keyword(line, self.leverage)?;
                leverage_values(&line[end..])
                    .into_iter()
                    .filter(|v| *v >= 1.0)
                    .reduce(f64::max)
                    .map(|v| v.round().min(f64::from(u32::MAX)) as u32)
            })
        };
        match self.leverage_rule {
            LeverageRule::Default => self.default_leverage,
            LeverageRule::Parsed => parsed().unwrap_or(self.default_leverage),
            LeverageRule::Floor(min) => parsed().unwrap_or(self.default_leverage).max(min),
        }
    }

    fn apply(&mut self, overrides: &ProviderOverride) {
        if let Some(leverage) = overrides.leverage {
            self.default_leverage = leverage;
        }
        if let Some(risk_factor) = overrides.risk_factor {
            self.risk_factor = risk_factor;
        }
        if let Some(cap) = overrides.target_cap {
            self.target_cap = Some(cap);
        }
    }
}

fn capped(tokens: &[PriceToken], cap: Option<usize>) -> Vec<f64> {
    let take = cap.unwrap_or(tokens.len());
    tokens.iter().take(take).map(|t| t.value).collect()
}

/// Numbers belonging to the first line that starts a field.
///
/// A keyword line with several numbers stands alone. Otherwise the numbers
/// continue on following lines: either one line holding the whole run, or a
/// list with one number per line ("1) 394,91", "Target 2: 9$", "🎯 2515").
/// A line naming another field ends the run.
fn section(lines: &[String], own: &[&str], others: &[&[&str]]) -> Option<Section> {
    let names_other = |line: &str| others.iter().any(|kws| find_keyword(line, kws).is_some());

    for (idx, line) in lines.iter().enumerate() {
        let Some((_, end)) = find_keyword(line, own) else {
            continue;
        };
        let mut tokens = tokens_from(line, end);
        if tokens.len() > 1 {
            return Some(Section { line: idx, tokens });
        }

        let rest = &lines[idx + 1..];
        if tokens.is_empty() {
            if let Some(next) = rest.first().filter(|next| !names_other(next)) {
                let run = tokens_from(next, 0);
                if run.len() > 1 {
                    return Some(Section { line: idx, tokens: run });
                }
            }
        }
        for next in rest {
            if names_other(next) {
                break;
            }
            match list_item(next, own) {
                Some(token) => tokens.push(token),
                None => break,
            }
        }
        if !tokens.is_empty() {
            return Some(Section { line: idx, tokens });
        }
    }
    None
}

fn tokens_from(line: &str, from: usize) -> Vec<PriceToken> {
    let tokens = price_tokens(line)
        .into_iter()
        .filter(|t| t.start >= from)
        .collect();
    drop_list_index(line, tokens)
}

fn list_item(line: &str, own: &[&str]) -> Option<PriceToken> {
    let body_start = line.find(|c: char| c.is_alphanumeric())?;
    let body = &line[body_start..];
    let from = if body.starts_with(|c: char| c.is_ascii_digit()) {
        body_start
    } else {
        own.iter()
            .filter(|kw| body.starts_with(**kw))
            .map(|kw| body_start + kw.len())
            .max()?
    };
    match tokens_from(line, from).as_slice() {
        [token] => Some(*token),
        _ => None,
    }
}

/// Grammar built from one or more layouts tried in order.
///
/// The first layout whose markers appear and whose candidate validates
/// wins.
#[derive(Debug, Clone)]
pub struct LayoutGrammar {
    tag: String,
    layouts: Vec<Layout>,
    close: CloseRules,
}

impl LayoutGrammar {
    pub fn new(tag: impl Into<String>, layout: Layout) -> Self {
        Self::composite(tag, vec![layout])
    }

    pub fn composite(tag: impl Into<String>, layouts: Vec<Layout>) -> Self {
        Self {
            tag: tag.into(),
            layouts,
            close: CloseRules::default(),
        }
    }

    pub fn with_close_rules(mut self, close: CloseRules) -> Self {
        self.close = close;
        self
    }
}

impl Grammar for LayoutGrammar {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn parse(&self, text: &str) -> Result<Parsed> {
        let msg = Message::new(text);
        if let Some(close) = close::detect(&msg, &self.tag, self.close)? {
            return Ok(Parsed::Close(close));
        }

        let mut last = Rejection::NoLayout;
        for layout in self.layouts.iter().filter(|l| l.matches(&msg)) {
            match layout.extract(&msg, &self.tag) {
                Ok(signal) => return Ok(Parsed::Open(signal)),
                Err(reason) => {
                    debug!(tag = %self.tag, %reason, "Layout did not fit message");
                    last = reason;
                }
            }
        }
        Err(last.into())
    }

    fn configure(&mut self, overrides: &ProviderOverride) {
        for layout in &mut self.layouts {
            layout.apply(overrides);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEV: &[&str] = &["lev"];
    const STOPLOSS: &[&str] = &["stoploss"];
    const STOP_LOSS: &[&str] = &["stop loss"];
    const ENTRY: &[&str] = &["entry"];

    fn lines(text: &str) -> Vec<String> {
        Message::new(text).lines
    }

    fn values(section: Option<Section>) -> Vec<f64> {
        section.map_or_else(Vec::new, |s| s.tokens.iter().map(|t| t.value).collect())
    }

    #[test]
    fn section_reads_numbered_list() {
        let text = "Take-Profit Targets:\n1) 394,91\n2) 410,55\n3) 430,10\nLeverage ×10";
        let got = section(&lines(text), &["take-profit targets"], &[LEV]);
        assert_eq!(values(got), vec![394.91, 410.55, 430.1]);
    }

    #[test]
    fn section_reads_run_on_next_line() {
        let text = "Sell Targets ::\n\n2600 - 2560 - 2510\n🔻 StopLoss : 2850";
        let got = section(&lines(text), &["sell targets"], &[STOPLOSS]);
        assert_eq!(values(got), vec![2600.0, 2560.0, 2510.0]);
    }

    #[test]
    fn section_repeats_keyword_per_item() {
        let text = "TARGET 1 : 2.52$\nTARGET 2 : 2.60$\nTARGET 3 : 2.67$\n❗️STOP LOSS :2.15$";
        let got = section(&lines(text), &["target"], &[STOP_LOSS]);
        assert_eq!(values(got), vec![2.52, 2.6, 2.67]);
    }

    #[test]
    fn section_skips_keyword_lines_without_numbers() {
        let text = "Another short term catch\nENTRY: 0.672 - 0.705\nShort Term: 0.72 - 0.74";
        let got = section(&lines(text), &["short term"], &[ENTRY]);
        assert_eq!(values(got), vec![0.72, 0.74]);
    }

    #[test]
    fn leverage_rules() {
        let msg = Message::new("Lev: Cross With 50-75X");
        let mut layout = Layout {
            leverage_rule: LeverageRule::Parsed,
            ..Layout::BASE
        };
        assert_eq!(layout.leverage(&msg), 75);

        let msg = Message::new("LEV :- 2X/3X");
        assert_eq!(layout.leverage(&msg), 3);
        layout.leverage_rule = LeverageRule::Floor(5);
        assert_eq!(layout.leverage(&msg), 5);
        layout.leverage_rule = LeverageRule::Default;
        assert_eq!(layout.leverage(&msg), DEFAULT_LEVERAGE);
    }

    #[test]
    fn stop_suffix_takes_number_before_phrase() {
        let layout = Layout {
            stop: &["sl"],
            stop_suffix: &["can be stop"],
            ..Layout::BASE
        };
        let msg = Message::new("Target : 0.052$ - 0.05$\n\n0.06$ can be stop");
        assert_eq!(layout.stop_loss(&msg), Ok(Some(0.06)));

        let msg = Message::new("Target : 0.285$ - 0.28$\n\nNo stoploss");
        assert_eq!(layout.stop_loss(&msg), Ok(None));
    }

    #[test]
    fn unreadable_stop_line_is_rejected() {
        let layout = Layout {
            stop: &["stoploss", "stop loss"],
            ..Layout::BASE
        };
        for text in ["Stoploss: will share soon", "Stoploss3.1626", "Stop loss -"] {
            let msg = Message::new(text);
            assert_eq!(layout.stop_loss(&msg), Err(Rejection::MissingStop), "{text}");
        }

        let msg = Message::new("Stop loss : UPDATE");
        assert_eq!(layout.stop_loss(&msg), Ok(None));
        let msg = Message::new("Targets 3.27 - 3.28");
        assert_eq!(layout.stop_loss(&msg), Ok(None));
    }

    #[test]
    fn stop_keyword_must_end_a_word() {
        let layout = Layout {
            stop: &["sl"],
            ..Layout::BASE
        };
        assert!(!layout.names_stop("#slp/usdt long"));
        assert!(layout.names_stop("sl: 0.31"));
        assert!(layout.names_stop("sl0.31"));
    }

    #[test]
    fn force_token_sets_limit_flag() {
        let layout = Layout {
            entry: &["entry"],
            targets: &["targets"],
            stop: &["stop loss"],
            ..Layout::BASE
        };
        let text = "#ETH/USDT\nEntry 1800\nTargets 1900 - 1950\nStop loss 1700";
        let plain = layout.extract(&Message::new(text), "T").unwrap();
        assert!(!plain.force_limit_order);

        let forced = layout
            .extract(&Message::new(&format!("{text}\nforce")), "T")
            .unwrap();
        assert!(forced.force_limit_order);
    }

    #[test]
    fn markers_gate_layouts() {
        let layout = Layout {
            markers: &["take-profit targets"],
            ..Layout::BASE
        };
        assert!(layout.matches(&Message::new("Take-Profit Targets:\n1) 24")));
        assert!(!layout.matches(&Message::new("Targets: 24 - 22")));
    }
}
