use common::{CloseInstruction, Rejection};

use crate::message::{lead_word, Message};
use crate::normalize::{find_pair, ticker};

const CLOSE_VERBS: [&str; 4] = ["close", "closing", "exit", "cancel"];

/// Words that make a close apply to only part of a position.
const PARTIAL_WORDS: [&str; 5] = ["second", "first", "half", "partial", "some"];

/// Words that stand in for the coin, which then follows elsewhere.
const POSITION_WORDS: [&str; 4] = ["position", "positions", "trade", "trades"];

const QUOTES: [char; 5] = ['"', '\'', '“', '”', '‘'];

/// Provider specific close phrasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseRules {
    /// "Stop DOGEUSDT" means close rather than a stop-loss level.
    pub stop_verb: bool,
}

/// Recognise a close request on the first body line.
///
/// `Ok(None)` means the message is not a close and should be parsed as a
/// signal. A close that only covers part of a position is rejected instead
/// of being widened to the whole position.
pub fn detect(
    msg: &Message,
    provider: &str,
    rules: CloseRules,
) -> Result<Option<CloseInstruction>, Rejection> {
    let Some(first) = msg.lines.first() else {
        return Ok(None);
    };
    let body = first.trim_start_matches(|c: char| !c.is_alphanumeric());
    let mut words = body.split_whitespace();
    let Some(verb) = words.next().map(trim_word) else {
        return Ok(None);
    };
    let is_close = CLOSE_VERBS.contains(&verb) || (rules.stop_verb && verb == "stop");
    if !is_close {
        return Ok(None);
    }

    let Some(raw_arg) = words.next() else {
        return Ok(Some(CloseInstruction::all(provider)));
    };
    let arg = trim_word(raw_arg);

    if arg == "all" {
        return Ok(Some(CloseInstruction::all(provider)));
    }
    if PARTIAL_WORDS.contains(&arg) {
        return Err(Rejection::PartialClose);
    }
    if POSITION_WORDS.contains(&arg) {
        let coin = msg
            .lines
            .get(1)
            .and_then(|line| lead_word(line))
            .and_then(ticker)
            .or_else(|| msg.quoted.iter().find_map(|line| find_pair(line)));
        return Ok(Some(match coin {
            Some(coin) => CloseInstruction::coin(provider, coin),
            None => CloseInstruction::all(provider),
        }));
    }
    if verb == "cancel" || raw_arg.starts_with(|c: char| QUOTES.contains(&c)) {
        let label = raw_arg.trim_matches(|c: char| QUOTES.contains(&c) || c.is_whitespace());
        if !label.is_empty() {
            return Ok(Some(CloseInstruction::labelled(provider, label)));
        }
    }
    Ok(ticker(raw_arg).map(|coin| CloseInstruction::coin(provider, coin)))
}

fn trim_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(text: &str) -> Result<Option<CloseInstruction>, Rejection> {
        detect(&Message::new(text), "T", CloseRules::default())
    }

    #[test]
    fn names_a_coin() {
        let c = close("[In reply to 👑 MVIP 👑]\nClose #BTC/USDT").unwrap().unwrap();
        assert_eq!(c.coin.as_deref(), Some("BTC"));
        assert_eq!(c.tag, None);

        let c = close("Closing eth at entry").unwrap().unwrap();
        assert_eq!(c.coin.as_deref(), Some("ETH"));
    }

    #[test]
    fn close_all_variants() {
        for text in ["🛑 Close all trades  🛑", "Closing all positions. Leaving the market", "close"] {
            let c = close(text).unwrap().unwrap();
            assert_eq!(c, CloseInstruction::all("T"), "{text}");
        }
    }

    #[test]
    fn cancel_takes_a_label() {
        let c = close("cancel my_tag").unwrap().unwrap();
        assert_eq!(c.coin, None);
        assert_eq!(c.tag.as_deref(), Some("my_tag"));

        let c = close("close “breakout”").unwrap().unwrap();
        assert_eq!(c.tag.as_deref(), Some("breakout"));
    }

    #[test]
    fn position_word_reads_coin_from_context() {
        let c = close("Close position\nBTC by 35091\nProfit is +300%").unwrap().unwrap();
        assert_eq!(c.coin.as_deref(), Some("BTC"));

        let c = close("(in reply to BPS)\n> Get into Long #LTC/USDT @ 174…\nExit trade with minor loss")
            .unwrap()
            .unwrap();
        assert_eq!(c.coin.as_deref(), Some("LTC"));
    }

    #[test]
    fn partial_close_is_rejected() {
        assert_eq!(
            close("Close second trade when first tp hit 🎯"),
            Err(Rejection::PartialClose)
        );
    }

    #[test]
    fn stop_verb_is_opt_in() {
        let msg = Message::new("Stop DOGEUSDT");
        assert_eq!(detect(&msg, "T", CloseRules::default()), Ok(None));
        let c = detect(&msg, "T", CloseRules { stop_verb: true }).unwrap().unwrap();
        assert_eq!(c.coin.as_deref(), Some("DOGE"));
    }

    #[test]
    fn signals_are_not_closes() {
        assert_eq!(close("BTCUSDT LONG 36705-36200\nStop 35680"), Ok(None));
        assert_eq!(close("Close 50% now"), Ok(None));
    }
}
