//! Template grammar parser and renderer
//!
//! Grammar: `slug '.' gen bincount? digits check? position?`
//! Hand-parsed by scanning from the right rather than via a `regex`
//! dependency.

use crate::digits::DigitKind;

pub const DEFAULT_BIN_COUNT: u32 = 293;

/// Which sequence-to-identifier mapping a pool uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// `s`/`c`: ids issued in counter order.
    Sequential,
    /// `r`: ids issued via the swizzle permutation.
    Scattered,
    /// `z`: unbounded counter, digits grow past the configured width.
    Unbounded,
}

impl Generator {
    fn letter(self) -> char {
        match self {
            Generator::Sequential => 's',
            Generator::Scattered => 'r',
            Generator::Unbounded => 'z',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c {
            's' | 'c' => Some(Generator::Sequential),
            'r' => Some(Generator::Scattered),
            'z' => Some(Generator::Unbounded),
            _ => None,
        }
    }
}

/// A parsed, immutable template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub slug: String,
    pub generator: Generator,
    /// Present only when `generator == Scattered`; 0 means "use the default".
    pub bin_count: u32,
    pub digits: Vec<DigitKind>,
    pub check_digit: bool,
    pub position: i64,
}

impl Template {
    /// Effective bin count for the swizzle permutation: the parsed value, or
    /// the default when unspecified/zero.
    pub fn effective_bin_count(&self) -> u32 {
        if self.bin_count == 0 {
            DEFAULT_BIN_COUNT
        } else {
            self.bin_count
        }
    }

    /// Render back to the canonical grammar string (no trailing position).
    pub fn render(&self) -> String {
        let mut s = format!("{}.{}", self.slug, self.generator.letter());
        if self.generator == Generator::Scattered
            && self.bin_count != 0
            && self.bin_count != DEFAULT_BIN_COUNT
        {
            s.push_str(&self.bin_count.to_string());
        }
        for d in &self.digits {
            s.push(match d {
                DigitKind::D => 'd',
                DigitKind::E => 'e',
            });
        }
        if self.check_digit {
            s.push('k');
        }
        s
    }

    /// Render with the `+<position>` extension used for persistence.
    pub fn render_extended(&self) -> String {
        format!("{}+{}", self.render(), self.position)
    }
}

/// Parse a template string. Matching is anchored to the whole input.
///
/// Grammar (scanned right-to-left after the mandatory `.`):
/// `slug '.' ('s'|'c'|'r'|'z') digits* ('d'|'e')+ 'k'? ('+' digits)?`
pub fn parse(s: &str) -> Option<Template> {
    let (body, position) = match s.rsplit_once('+') {
        Some((body, pos_str)) if !pos_str.is_empty() && pos_str.bytes().all(|b| b.is_ascii_digit()) => {
            (body, pos_str.parse::<i64>().ok()?)
        }
        _ => (s, 0),
    };

    // The slug grammar allows arbitrary characters (including '.'), so the
    // separating dot is not necessarily the first one in `body`. The
    // reference grammar is a greedy `.*` followed by the fixed
    // gen/bincount/digits/check suffix, which backtracking regex engines
    // resolve by preferring the rightmost dot that still yields a valid
    // suffix. Reproduce that by trying dot positions from the right.
    let dot_positions: Vec<usize> = body
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .map(|(i, _)| i)
        .collect();

    for &dot in dot_positions.iter().rev() {
        let slug = &body[..dot];
        let rest = &body[dot + 1..];
        if let Some(t) = parse_suffix(rest) {
            return Some(Template {
                slug: slug.to_string(),
                position,
                ..t
            });
        }
    }

    None
}

/// Parse the `gen bincount? digits+ check?` portion that follows the
/// separating dot. Returns a Template with an empty slug/position (the
/// caller fills those in).
fn parse_suffix(rest: &str) -> Option<Template> {
    let mut chars: Vec<char> = rest.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let generator = Generator::from_letter(chars.remove(0))?;

    let check_digit = if chars.last() == Some(&'k') {
        chars.pop();
        true
    } else {
        false
    };

    // bincount: leading run of ascii digits before the digit-kind letters.
    let mut bin_digits = String::new();
    while chars.first().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        bin_digits.push(chars.remove(0));
    }
    let bin_count: u32 = if bin_digits.is_empty() {
        0
    } else {
        bin_digits.parse().ok()?
    };

    if bin_count > 0 && generator != Generator::Scattered {
        return None;
    }

    if chars.is_empty() {
        return None;
    }

    let mut digits = Vec::with_capacity(chars.len());
    for c in chars {
        match c {
            'd' => digits.push(DigitKind::D),
            'e' => digits.push(DigitKind::E),
            _ => return None,
        }
    }

    Some(Template {
        slug: String::new(),
        generator,
        bin_count,
        digits,
        check_digit,
        position: 0,
    })
}
