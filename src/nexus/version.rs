use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ResolveError;

lazy_static! {
    static ref SEGMENT_REGEX: Regex = Regex::new(r"\d+|[A-Za-z]+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    // NB: declaration order matters - numeric segments sort before alphanumeric ones
    Numeric(u64),
    Text(String),
}

/// A loosely structured, dot-separated version like "4.7.0.3" or "4.0.0-se".
///
/// Each dot-separated part is split into runs of digits and runs of letters, everything else is
///  treated as a separator. Digit runs compare numerically, letter runs lexically, and a digit run
///  sorts before a letter run. Missing trailing segments count as zero, so "1.0" and "1.0.0" are
///  equal while "1.0.0.1" is greater than both.
#[derive(Debug, Clone)]
pub struct VersionNumber {
    raw: String,
    segments: Vec<Segment>,
}
impl VersionNumber {
    pub fn parse(s: &str) -> Result<VersionNumber, ResolveError> {
        if s.is_empty() {
            return Err(ResolveError::MalformedVersion);
        }

        let segments = SEGMENT_REGEX.find_iter(s)
            .map(|m| {
                let text = m.as_str();
                match text.parse::<u64>() {
                    Ok(n) => Segment::Numeric(n),
                    Err(_) => Segment::Text(text.to_string()),
                }
            })
            .collect();

        Ok(VersionNumber {
            raw: s.to_string(),
            segments,
        })
    }

    /// the version exactly as it was parsed
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}
impl Display for VersionNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Segment::Numeric(0);
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&zero);
            let b = other.segments.get(i).unwrap_or(&zero);
            match a.cmp(b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}
impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for VersionNumber {}

/// How the caller asked for a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// the highest version in the listing
    Latest,
    /// a dotted version with an 'x' as its rightmost component, e.g. "4.7.0.x"
    Pattern(String),
    Exact(String),
}
impl VersionSpec {
    pub fn parse(s: &str) -> VersionSpec {
        if s.to_ascii_lowercase().contains("latest") {
            VersionSpec::Latest
        }
        else if s.ends_with(".x") {
            VersionSpec::Pattern(s.to_string())
        }
        else {
            VersionSpec::Exact(s.to_string())
        }
    }
}
impl Display for VersionSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionSpec::Latest => f.write_str("latest"),
            VersionSpec::Pattern(s) | VersionSpec::Exact(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    fn v(s: &str) -> VersionNumber {
        VersionNumber::parse(s).unwrap()
    }

    #[rstest]
    #[case::numeric_not_lexical("4.7.0.10", "4.7.0.9", Ordering::Greater)]
    #[case::last_segment("4.7.0.9", "4.7.0.2", Ordering::Greater)]
    #[case::earlier_segment_wins("4.7.0.2", "4.6.9.9", Ordering::Greater)]
    #[case::equal("4.7.0.3", "4.7.0.3", Ordering::Equal)]
    #[case::trailing_zero_is_insignificant("1.0", "1.0.0", Ordering::Equal)]
    #[case::trailing_non_zero("1.0.0", "1.0.0.1", Ordering::Less)]
    #[case::scim_old("0.9", "1.0.0", Ordering::Less)]
    #[case::scim_new("1.5", "1.0.0", Ordering::Greater)]
    #[case::text_compares_lexically("4.0.0-se", "4.0.0-ce", Ordering::Greater)]
    #[case::number_before_text("4.0.0.1", "4.0.0-ce", Ordering::Less)]
    #[case::major("10.0.0", "9.9.9", Ordering::Greater)]
    fn test_compare(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(v(a).cmp(&v(b)), expected);
        assert_eq!(v(b).cmp(&v(a)), expected.reverse());
    }

    #[test]
    fn test_sort_descending() {
        let mut versions = vec![v("4.6.9.9"), v("4.7.0.10"), v("4.7.0.2"), v("4.7.0.9")];
        versions.sort_by(|a, b| b.cmp(a));
        let sorted: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(sorted, vec!["4.7.0.10", "4.7.0.9", "4.7.0.2", "4.6.9.9"]);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(VersionNumber::parse("").unwrap_err(), ResolveError::MalformedVersion);
    }

    #[test]
    fn test_keeps_raw_string() {
        assert_eq!(v("3.2.0.0").to_string(), "3.2.0.0");
        assert_eq!(v("4.0.0-se").as_str(), "4.0.0-se");
    }

    #[rstest]
    #[case::latest("latest", VersionSpec::Latest)]
    #[case::latest_upper("LATEST", VersionSpec::Latest)]
    #[case::latest_with_edition("latest-ce", VersionSpec::Latest)]
    #[case::pattern("4.7.0.x", VersionSpec::Pattern("4.7.0.x".to_string()))]
    #[case::exact("4.7.0.3", VersionSpec::Exact("4.7.0.3".to_string()))]
    #[case::exact_with_edition("4.0.0-se", VersionSpec::Exact("4.0.0-se".to_string()))]
    fn test_version_spec(#[case] s: &str, #[case] expected: VersionSpec) {
        assert_eq!(VersionSpec::parse(s), expected);
    }
}
