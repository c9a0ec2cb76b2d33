use common::Direction;

/// A provider message split into the lines grammars look at.
#[derive(Debug, Clone)]
pub struct Message {
    /// Body lines, lowercased and trimmed, without blanks, reply headers or
    /// quoted lines.
    pub lines: Vec<String>,
    /// Lines quoted from the message being replied to, `>` removed.
    pub quoted: Vec<String>,
    /// Body lines joined with `\n`.
    pub text: String,
}

impl Message {
    pub fn new(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let mut lines = Vec::new();
        let mut quoted = Vec::new();

        for line in lowered.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(rest) = line.strip_prefix('>') {
                let rest = rest.trim_start_matches('>').trim();
                if !rest.is_empty() {
                    quoted.push(rest.to_string());
                }
            } else if !is_header(line) {
                lines.push(line.to_string());
            }
        }

        let text = lines.join("\n");
        Self {
            lines,
            quoted,
            text,
        }
    }

    /// `long` or `short` stated in the text. `None` when neither or both
    /// appear; "short term" and "long term" don't count.
    pub fn stated_direction(&self) -> Option<Direction> {
        let long = has_side_word(&self.text, "long");
        let short = has_side_word(&self.text, "short");
        match (long, short) {
            (true, false) => Some(Direction::Long),
            (false, true) => Some(Direction::Short),
            _ => None,
        }
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with("[ photo")
        || line.starts_with("[photo")
        || line.starts_with("[in reply to")
        || line.starts_with("(in reply to")
}

fn has_side_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(start, _)| {
        let rest = &text[start + word.len()..];
        starts_word(text, start)
            && !rest.starts_with(|c: char| c.is_ascii_alphabetic())
            && !rest.trim_start().starts_with("term")
    })
}

fn starts_word(line: &str, start: usize) -> bool {
    line[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}

/// Position of the earliest keyword in `line` that begins a word, as a
/// `(start, end)` byte span. Ties go to the longest keyword.
pub fn find_keyword(line: &str, keywords: &[&str]) -> Option<(usize, usize)> {
    keywords
        .iter()
        .filter_map(|kw| {
            line.match_indices(kw)
                .map(|(start, _)| start)
                .find(|start| starts_word(line, *start))
                .map(|start| (start, start + kw.len()))
        })
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
}

/// First word of a line with leading emoji and punctuation removed.
pub fn lead_word(line: &str) -> Option<&str> {
    line.trim_start_matches(|c: char| !c.is_alphanumeric())
        .split_whitespace()
        .next()
}
