//! Minter
//!
//! Owns one template's live counter state: the next sequence position to
//! mint, the bounded maximum (or `-1` for unbounded), and — for the
//! `Scattered` generator — the swizzle permutation. Not safe for concurrent
//! access by design; callers (the pool) serialize access externally.

use crate::digits::{checksum, iton, ntoi, sizes as digit_sizes};
use crate::swizzle::Swizzler;
use crate::template::{parse, Generator, Template};

/// Sentinel for an unbounded counter's maximum.
pub const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone)]
pub struct Minter {
    template: Template,
    sizes: Vec<i64>,
    max: i64,
    position: i64,
    swizzler: Option<Swizzler>,
}

impl Minter {
    /// Construct a minter from a template string, honoring any `+<position>`
    /// extension it carries.
    pub fn new(template_str: &str) -> Option<Self> {
        let template = parse(template_str)?;
        Self::from_template(template)
    }

    fn from_template(template: Template) -> Option<Self> {
        let sizes = digit_sizes(&template.digits);
        let max = if template.generator == Generator::Unbounded {
            UNBOUNDED
        } else {
            sizes.iter().fold(1i64, |acc, &s| acc.saturating_mul(s))
        };

        let position = if max == UNBOUNDED || template.position <= max {
            template.position
        } else {
            0
        };

        let swizzler = if template.generator == Generator::Scattered {
            Some(Swizzler::new(template.effective_bin_count(), max))
        } else {
            None
        };

        Some(Minter {
            template,
            sizes,
            max,
            position,
            swizzler,
        })
    }

    /// Mint the next identifier, advancing the internal counter. Returns the
    /// empty string when the pool is bounded and exhausted.
    pub fn mint(&mut self) -> String {
        if self.max >= 0 && self.position >= self.max {
            return String::new();
        }
        let i = self.position;
        self.position += 1;

        let n = match &self.swizzler {
            Some(s) => s.forward(i),
            None => i,
        };

        self.render_id(n)
    }

    fn render_id(&self, n: i64) -> String {
        let digits = iton(n, &self.sizes, self.template.generator == Generator::Unbounded);
        let mut s = format!("{}{}", self.template.slug, digits);
        if self.template.check_digit {
            let c = checksum(&s);
            s.push(c);
        }
        s
    }

    /// Current position and bound (`-1` if unbounded).
    pub fn count(&self) -> (i64, i64) {
        (self.position, self.max)
    }

    /// Render the extended template string (grammar + `+<position>`).
    pub fn render(&self) -> String {
        let mut t = self.template.clone();
        t.position = self.position;
        t.render_extended()
    }

    /// Decode `id` back to its sequence number, or `-1` if invalid.
    pub fn index(&self, id: &str) -> i64 {
        let v = self.valid(id);
        if v == -1 {
            return -1;
        }
        match &self.swizzler {
            Some(s) => s.inverse(v),
            None => v,
        }
    }

    fn valid(&self, id: &str) -> i64 {
        if !id.starts_with(&self.template.slug) {
            return -1;
        }

        if self.template.check_digit {
            if id.is_empty() {
                return -1;
            }
            let (prefix, last) = id.split_at(id.len() - 1);
            if checksum(prefix).to_string() != last {
                return -1;
            }
        }

        let after_slug = &id[self.template.slug.len()..];
        let digits_part = if self.template.check_digit {
            &after_slug[..after_slug.len() - 1]
        } else {
            after_slug
        };

        if digits_part.chars().count() < self.sizes.len() {
            return -1;
        }
        if self.template.generator != Generator::Unbounded
            && digits_part.chars().count() > self.sizes.len()
        {
            return -1;
        }

        let v = ntoi(digits_part, &self.sizes);
        if v == -1 {
            return -1;
        }

        if self.max != UNBOUNDED && v >= self.max {
            return -1;
        }

        v
    }

    /// Move the counter to `n`. Silently ignored if out of range.
    pub fn advance_to(&mut self, n: i64) {
        if n < 0 || (self.max >= 0 && n > self.max) {
            return;
        }
        self.position = n;
    }
}
