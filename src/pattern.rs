//! Phrase template matching module.
//!
//! The extraction and tag tables are built from phrase templates: literal
//! text with `{num}` capture slots, e.g. `"attack {num}%"`. Matching is
//! case-insensitive, unanchored, and repeated: a sentence may match the
//! same template several times at different offsets. The matcher is a
//! small deterministic scanner; same input always yields the same matches
//! in the same order.

use serde::{Deserialize, Serialize};

/// One segment of a compiled template.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Literal text, stored lowercase.
    Literal(String),
    /// A signed decimal number capture (`{num}`).
    Number,
}

/// A compiled phrase template.
///
/// # Examples
///
/// ```rust
/// use squadstat::pattern::PhraseTemplate;
///
/// let template = PhraseTemplate::parse("attack {num}%");
/// let matches = template.find_all("Attack +30% and attack +10%.");
/// assert_eq!(matches.len(), 2);
/// assert_eq!(matches[0].numbers, vec![30.0]);
/// assert_eq!(matches[1].numbers, vec![10.0]);
/// ```
#[derive(Debug, Clone)]
pub struct PhraseTemplate {
    segments: Vec<Segment>,
}

/// One match of a template against a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    /// Byte offset of the match start in the lowercased input.
    pub start: usize,
    /// Byte offset one past the match end.
    pub end: usize,
    /// The matched text, lowercased.
    pub text: String,
    /// Captured numbers, in template order. Signs are part of the capture:
    /// `"attack {num}%"` against `"attack -20%"` captures `-20.0`.
    pub numbers: Vec<f64>,
}

impl PhraseTemplate {
    /// Compile a template string. `{num}` marks a number capture; all other
    /// text is matched literally (case-insensitively).
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = template;
        while let Some(pos) = rest.find("{num}") {
            if pos > 0 {
                segments.push(Segment::Literal(rest[..pos].to_lowercase()));
            }
            segments.push(Segment::Number);
            rest = &rest[pos + "{num}".len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_lowercase()));
        }
        Self { segments }
    }

    /// Find every non-overlapping match in `text`, left to right.
    pub fn find_all(&self, text: &str) -> Vec<TemplateMatch> {
        let haystack = text.to_lowercase();
        let mut matches = Vec::new();
        let mut at = 0;
        while at < haystack.len() {
            match self.match_at(&haystack, at) {
                Some(m) => {
                    at = m.end.max(m.start + 1);
                    matches.push(m);
                }
                None => break,
            }
        }
        matches
    }

    /// True if the template matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.match_at(&text.to_lowercase(), 0).is_some()
    }

    /// Find the first match at or after byte offset `from` in an already
    /// lowercased haystack.
    fn match_at(&self, haystack: &str, from: usize) -> Option<TemplateMatch> {
        // Anchor the scan on the first literal segment when there is one;
        // otherwise try every position.
        let first_literal = self.segments.iter().find_map(|s| match s {
            Segment::Literal(l) => Some(l.as_str()),
            Segment::Number => None,
        });

        let mut start = from;
        loop {
            let candidate = match first_literal {
                Some(lit) => {
                    let found = haystack.get(start..)?.find(lit)?;
                    // A number-first template must back-scan below; handled
                    // by trying match_here at every candidate start.
                    start + found
                }
                None => start,
            };
            // When the template starts with a capture, the candidate start
            // must step back over the number preceding the first literal.
            let try_starts = self.candidate_starts(haystack, candidate);
            for s in try_starts {
                if let Some(m) = self.match_here(haystack, s) {
                    return Some(m);
                }
            }
            if candidate + 1 > haystack.len() {
                return None;
            }
            start = candidate + 1;
            if start >= haystack.len() {
                return None;
            }
        }
    }

    /// Possible start offsets for a match whose first literal occurs at
    /// `literal_pos`. For literal-first templates this is just
    /// `literal_pos`; for capture-first templates the start backs up over
    /// the preceding number.
    fn candidate_starts(&self, haystack: &str, literal_pos: usize) -> Vec<usize> {
        match self.segments.first() {
            Some(Segment::Literal(_)) | None => vec![literal_pos],
            Some(Segment::Number) => {
                let bytes = haystack.as_bytes();
                let mut s = literal_pos;
                while s > 0 && (bytes[s - 1].is_ascii_digit() || bytes[s - 1] == b'.') {
                    s -= 1;
                }
                if s > 0 && (bytes[s - 1] == b'+' || bytes[s - 1] == b'-') {
                    s -= 1;
                }
                vec![s]
            }
        }
    }

    /// Attempt an exact segment-by-segment match starting at `start`.
    fn match_here(&self, haystack: &str, start: usize) -> Option<TemplateMatch> {
        let mut cursor = start;
        let mut numbers = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    let end = cursor + lit.len();
                    if haystack.get(cursor..end)? != lit.as_str() {
                        return None;
                    }
                    cursor = end;
                }
                Segment::Number => {
                    let (value, consumed) = scan_number(&haystack[cursor..])?;
                    numbers.push(value);
                    cursor += consumed;
                }
            }
        }
        Some(TemplateMatch {
            start,
            end: cursor,
            text: haystack[start..cursor].to_string(),
            numbers,
        })
    }
}

/// Scan a signed decimal number at the start of `input`.
///
/// Accepts an optional `+`/`-` sign, then digits with at most one decimal
/// point. Returns the parsed value and the number of bytes consumed, or
/// `None` if `input` does not start with a number.
fn scan_number(input: &str) -> Option<(f64, usize)> {
    let bytes = input.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let digits_start = i;
    let mut seen_dot = false;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => i += 1,
            b'.' if !seen_dot && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() => {
                seen_dot = true;
                i += 1;
            }
            _ => break,
        }
    }
    if i == digits_start {
        return None;
    }
    input[..i].parse::<f64>().ok().map(|v| (v, i))
}
