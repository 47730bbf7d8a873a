//! Validator utility
//!
//! A pure, stateless batch API over a template and candidate identifiers or
//! sequence numbers: info, id validation, and id generation.

use crate::minter::Minter;
use crate::template::parse;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TemplateInfo {
    pub valid: bool,
    pub position: i64,
    pub max: i64,
    pub percent_used: i64,
}

/// Summarize a template string: its validity, current position, bound, and
/// percent used (0 for unbounded templates).
pub fn info(template: &str) -> TemplateInfo {
    match Minter::new(template) {
        Some(m) => {
            let (position, max) = m.count();
            let percent_used = if max > 0 { 100 * position / max } else { 0 };
            TemplateInfo {
                valid: true,
                position,
                max,
                percent_used,
            }
        }
        None => TemplateInfo {
            valid: false,
            position: 0,
            max: 0,
            percent_used: 0,
        },
    }
}

/// Decode each candidate identifier against `template`, pairing it with its
/// sequence index (or `-1` if invalid). Returns `None` if the template
/// itself does not parse.
pub fn valid(template: &str, ids: &[String]) -> Option<Vec<(i64, String)>> {
    let m = Minter::new(template)?;
    Some(ids.iter().map(|id| (m.index(id), id.clone())).collect())
}

/// For each requested sequence number, advance a private minter to it and
/// record what it mints. Returns `None` if the template does not parse.
pub fn generate(template: &str, ns: &[i64]) -> Option<Vec<(i64, String)>> {
    let t = parse(template)?;
    let mut result = Vec::with_capacity(ns.len());
    for &n in ns {
        // A fresh minter per request keeps this function pure: the caller's
        // positions never leak between requested indices.
        let mut m = Minter::new(&t.render())?;
        m.advance_to(n);
        let id = m.mint();
        result.push((n, id));
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_reports_bounded_template() {
        let i = info(".sddd");
        assert!(i.valid);
        assert_eq!(i.position, 0);
        assert_eq!(i.max, 1000);
        assert_eq!(i.percent_used, 0);
    }

    #[test]
    fn info_reports_unbounded_template_as_zero_percent() {
        let i = info(".zddd");
        assert!(i.valid);
        assert_eq!(i.max, -1);
        assert_eq!(i.percent_used, 0);
    }

    #[test]
    fn info_reports_invalid_template() {
        let i = info(".z500dd");
        assert!(!i.valid);
    }

    #[test]
    fn valid_batches_candidates() {
        let results = valid(".sdk", &["00".into(), "bb".into()]).unwrap();
        assert_eq!(results[0].0, 0);
        assert_eq!(results[1].0, -1);
    }

    #[test]
    fn valid_returns_none_for_bad_template() {
        assert!(valid(".s500dd", &["00".into()]).is_none());
    }

    #[test]
    fn generate_advances_and_mints_each_n_independently() {
        let results = generate(".sddd", &[0, 5, 999]).unwrap();
        assert_eq!(results, vec![(0, "000".into()), (5, "005".into()), (999, "999".into())]);
    }

    #[test]
    fn generate_out_of_range_n_mints_nothing() {
        let results = generate(".sddd", &[1000]).unwrap();
        assert_eq!(results, vec![(1000, "".into())]);
    }
}
