//! Shared text and number primitives used by every grammar.
//!
//! All functions expect lowercased input; `Message::new` takes care of that.

/// Glyphs providers append to levels that have already been hit.
const FILL_MARKS: [char; 2] = ['✅', '✔'];

/// Hashtags that name an exchange, market or channel rather than a coin.
const TAG_STOPWORDS: [&str; 12] = [
    "long",
    "short",
    "binance",
    "binancefutures",
    "bybit",
    "crypto",
    "exchange",
    "futures",
    "spot",
    "ccc",
    "scalp",
    "signal",
];

const MAX_TICKER_LEN: usize = 12;

/// A number found in a line of text, with its byte span in that line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceToken {
    pub value: f64,
    pub start: usize,
    pub end: usize,
    /// Written without any decimal or grouping separator.
    pub integral: bool,
    /// Followed by a fill glyph such as ✅.
    pub filled: bool,
}

/// Clean a raw ticker mention into an uppercase symbol.
///
/// `"# ETC / USDT"` → `ETC`, `"#ltcusdt perp"` → `LTC`, `"1inch"` → `1INCH`.
pub fn ticker(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let mut symbol = trim_symbol(&compact);
    if let Some(stripped) = symbol.strip_suffix("perp") {
        symbol = trim_symbol(stripped);
    }
    if let Some(idx) = symbol.find("usdt").filter(|idx| *idx > 0) {
        symbol = trim_symbol(&symbol[..idx]);
    }

    let valid = (2..=MAX_TICKER_LEN).contains(&symbol.len())
        && symbol != "usdt"
        && symbol.chars().all(|c| c.is_ascii_alphanumeric())
        && symbol.chars().any(|c| c.is_ascii_alphabetic());
    valid.then(|| symbol.to_ascii_uppercase())
}

fn trim_symbol(s: &str) -> &str {
    s.trim_matches(|c: char| !c.is_ascii_alphanumeric())
}

/// Find the base asset of the first `XXX/USDT`-style pair in a line.
///
/// Handles the pair written in one word (`#bal|usdt`, `eth-usdt`) as well as
/// spread over several (`# etc / usdt`, `#eth usdt`).
pub fn find_pair(line: &str) -> Option<String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        let Some(idx) = word.find("usdt") else {
            continue;
        };
        let head = trim_symbol(&word[..idx]);
        if !head.is_empty() {
            match ticker(head) {
                Some(symbol) => return Some(symbol),
                None => continue,
            }
        }
        for prev in words[..i].iter().rev().take(2) {
            let prev = trim_symbol(prev);
            if prev.is_empty() {
                continue;
            }
            if let Some(symbol) = ticker(prev) {
                return Some(symbol);
            }
            break;
        }
    }
    None
}

/// First `#coin` or `$coin` mention that is not a channel hashtag.
pub fn find_tagged(line: &str) -> Option<String> {
    line.split_whitespace().find_map(|word| {
        let word = word.trim_start_matches(|c: char| {
            !c.is_ascii_alphanumeric() && c != '#' && c != '$'
        });
        let rest = word.strip_prefix('#').or_else(|| word.strip_prefix('$'))?;
        let rest = trim_symbol(rest);
        if TAG_STOPWORDS.contains(&rest) {
            return None;
        }
        ticker(rest)
    })
}

/// Parse a number written with `.` or `,` as decimal mark.
///
/// With both present the last one is the decimal mark. A lone comma followed
/// by exactly three digits is a thousands separator unless the integer part
/// is zero; any other lone comma is a decimal mark. Dots in several places
/// are left unparsed.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let commas = raw.matches(',').count();
    let dots = raw.matches('.').count();

    let normalized = match (commas, dots) {
        (0, 0) | (0, 1) => raw.to_string(),
        (0, _) => return None,
        (1, 0) => {
            let (int, frac) = raw.split_once(',')?;
            if frac.len() == 3 && int != "0" {
                format!("{int}{frac}")
            } else {
                format!("{int}.{frac}")
            }
        }
        (_, 0) => {
            let mut groups = raw.split(',');
            let head = groups.next()?;
            let tail: Vec<&str> = groups.collect();
            if !tail.iter().all(|g| g.len() == 3) {
                return None;
            }
            format!("{head}{}", tail.concat())
        }
        (1, 1) => {
            let comma = raw.find(',')?;
            let dot = raw.find('.')?;
            if dot > comma {
                raw.replace(',', "")
            } else {
                raw.replace('.', "").replace(',', ".")
            }
        }
        (_, 1) if raw.rfind('.') > raw.rfind(',') => raw.replace(',', ""),
        _ => return None,
    };

    let value: f64 = normalized.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Extract the price-like numbers of one line.
///
/// Numbers glued to letters (`x10`, `tp1`, `4hr`) and percentages are
/// skipped, as is anything inside parentheses. A trailing `k` is ignored
/// (`38k` → 38). A `+` after the first number ends the scan. A fill glyph
/// right after a number or percentage marks the last number as filled.
pub fn price_tokens(line: &str) -> Vec<PriceToken> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut tokens: Vec<PriceToken> = Vec::new();
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i].1;
        if c == '(' {
            i = skip_group(&chars, i);
            prev = Some(')');
            continue;
        }
        if c == '+' && !tokens.is_empty() {
            break;
        }
        if FILL_MARKS.contains(&c) {
            let after_level = last_visible(&chars[..i])
                .is_some_and(|p| p.is_ascii_digit() || p == '%' || p == '$');
            if after_level {
                if let Some(last) = tokens.last_mut() {
                    last.filled = true;
                }
            }
        } else if c.is_ascii_digit() {
            let end = number_end(&chars, i, true);
            if let Some(token) = read_token(line, &chars, i, end, prev) {
                tokens.push(token);
            }
            prev = Some(chars[end - 1].1);
            i = end;
            continue;
        }
        prev = Some(c);
        i += 1;
    }
    tokens
}

/// Drop a leading list index such as the `2` of `2) 410,55` or `Target 2: 9$`.
pub fn drop_list_index(line: &str, mut tokens: Vec<PriceToken>) -> Vec<PriceToken> {
    if let [first, second, ..] = tokens.as_slice() {
        let marks: Vec<char> = line[first.end..second.start]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let is_index = first.integral
            && first.value <= 20.0
            && marks.len() <= 1
            && marks.iter().all(|c| matches!(c, ')' | ':' | '.' | '-'));
        if is_index {
            tokens.remove(0);
        }
    }
    tokens
}

/// Every multiplier-like number in a fragment, including `×10`, `(10.0X)`
/// and ranges like `5x-10x`. Percentages are skipped.
pub fn leverage_values(fragment: &str) -> Vec<f64> {
    let chars: Vec<(usize, char)> = fragment.char_indices().collect();
    let mut values = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].1.is_ascii_digit() {
            i += 1;
            continue;
        }
        let end = number_end(&chars, i, false);
        if !followed_by_percent(&chars, end) {
            let to = chars.get(end).map_or(fragment.len(), |(pos, _)| *pos);
            if let Some(value) = parse_decimal(&fragment[chars[i].0..to]) {
                values.push(value);
            }
        }
        i = end;
    }
    values
}

fn number_end(chars: &[(usize, char)], start: usize, allow_comma: bool) -> usize {
    let mut end = start;
    while end < chars.len() {
        let c = chars[end].1;
        let separator = c == '.' || (allow_comma && c == ',');
        let continues = c.is_ascii_digit()
            || (separator && chars.get(end + 1).is_some_and(|(_, n)| n.is_ascii_digit()));
        if !continues {
            break;
        }
        end += 1;
    }
    end
}

fn read_token(
    line: &str,
    chars: &[(usize, char)],
    start: usize,
    end: usize,
    prev: Option<char>,
) -> Option<PriceToken> {
    let attached_before = prev.is_some_and(|p| p.is_alphabetic() || p == '×');
    let attached_after = match chars.get(end).map(|(_, c)| *c) {
        Some('k') => chars.get(end + 1).is_some_and(|(_, c)| c.is_alphabetic()),
        Some(c) => c.is_alphabetic(),
        None => false,
    };
    if attached_before || attached_after || followed_by_percent(chars, end) {
        return None;
    }

    let from = chars[start].0;
    let to = chars.get(end).map_or(line.len(), |(pos, _)| *pos);
    let raw = &line[from..to];
    Some(PriceToken {
        value: parse_decimal(raw)?,
        start: from,
        end: to,
        integral: !raw.contains(|c| c == '.' || c == ','),
        filled: false,
    })
}

fn followed_by_percent(chars: &[(usize, char)], end: usize) -> bool {
    chars[end..]
        .iter()
        .map(|(_, c)| *c)
        .find(|c| !c.is_whitespace())
        == Some('%')
}

fn skip_group(chars: &[(usize, char)], open: usize) -> usize {
    let mut depth = 0usize;
    for (offset, (_, c)) in chars[open..].iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return open + offset + 1;
                }
            }
            _ => {}
        }
    }
    chars.len()
}

fn last_visible(chars: &[(usize, char)]) -> Option<char> {
    chars
        .iter()
        .rev()
        .map(|(_, c)| *c)
        .find(|c| !c.is_whitespace() && *c != '\u{fe0f}')
}
