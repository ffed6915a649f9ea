//! Daily sequence counters scoped to an owner-set.

use super::SequenceDomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Set of identifying keys a counter is scoped to.
///
/// Keys are trimmed and kept sorted, so two owner-sets with the same keys
/// compare equal regardless of the order they were supplied in. Keys never
/// contain `,`, which keeps the canonical form unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OwnerSet(BTreeSet<String>);

impl OwnerSet {
    /// Creates an owner-set from its keys.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::InvalidOwnerKey`] when a key contains
    /// `,`, or [`SequenceDomainError::EmptyOwnerSet`] when no non-blank key
    /// is supplied.
    pub fn new(
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, SequenceDomainError> {
        let mut normalized = BTreeSet::new();
        for key in keys {
            let trimmed = key.into().trim().to_owned();
            if trimmed.contains(',') {
                return Err(SequenceDomainError::InvalidOwnerKey(trimmed));
            }
            if !trimmed.is_empty() {
                normalized.insert(trimmed);
            }
        }
        if normalized.is_empty() {
            return Err(SequenceDomainError::EmptyOwnerSet);
        }
        Ok(Self(normalized))
    }

    /// Returns the keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the keys joined with `,`, used as a storage key.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.keys().collect::<Vec<_>>().join(",")
    }
}

impl TryFrom<Vec<String>> for OwnerSet {
    type Error = SequenceDomainError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerSet> for Vec<String> {
    fn from(value: OwnerSet) -> Self {
        value.0.into_iter().collect()
    }
}

impl fmt::Display for OwnerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Counter rendering format; its length fixes the digit width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CounterFormat {
    pattern: String,
    width: usize,
}

impl CounterFormat {
    /// Parses a format such as `"00"` or `"000"`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::UnsupportedFormat`] unless the format
    /// is two or three characters long.
    pub fn new(pattern: impl Into<String>) -> Result<Self, SequenceDomainError> {
        let raw = pattern.into();
        let width = raw.chars().count();
        if !matches!(width, 2 | 3) {
            return Err(SequenceDomainError::UnsupportedFormat(raw));
        }
        Ok(Self {
            pattern: raw,
            width,
        })
    }

    /// Returns the raw format string.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the digit width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the largest index this format can render.
    #[must_use]
    pub const fn max_index(&self) -> u32 {
        if self.width == 2 { 99 } else { 999 }
    }

    /// Renders an index left-padded with zeros.
    #[must_use]
    pub fn render(&self, index: u32) -> String {
        format!("{index:0width$}", width = self.width)
    }
}

impl TryFrom<String> for CounterFormat {
    type Error = SequenceDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CounterFormat> for String {
    fn from(value: CounterFormat) -> Self {
        value.pattern
    }
}

/// A persisted daily counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    owners: OwnerSet,
    date: NaiveDate,
    format: CounterFormat,
    index: u32,
}

impl Counter {
    /// Creates a counter at index 1.
    #[must_use]
    pub const fn first(owners: OwnerSet, date: NaiveDate, format: CounterFormat) -> Self {
        Self {
            owners,
            date,
            format,
            index: 1,
        }
    }

    /// Reconstructs a counter from storage.
    #[must_use]
    pub const fn from_persisted(
        owners: OwnerSet,
        date: NaiveDate,
        format: CounterFormat,
        index: u32,
    ) -> Self {
        Self {
            owners,
            date,
            format,
            index,
        }
    }

    /// Returns the owner-set.
    #[must_use]
    pub const fn owners(&self) -> &OwnerSet {
        &self.owners
    }

    /// Returns the calendar day the counter belongs to.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the format last used to issue an index.
    #[must_use]
    pub const fn format(&self) -> &CounterFormat {
        &self.format
    }

    /// Returns the current index.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Returns the current index rendered with the counter's format.
    #[must_use]
    pub fn rendered(&self) -> String {
        self.format.render(self.index)
    }

    /// Moves to the next index under `format`.
    ///
    /// The counter is left unchanged when the next index does not fit.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::CounterExhausted`] when the next index
    /// exceeds `format`'s maximum.
    pub fn advance(&mut self, format: CounterFormat) -> Result<(), SequenceDomainError> {
        let next = self.index.saturating_add(1);
        if next > format.max_index() {
            return Err(SequenceDomainError::CounterExhausted {
                owners: self.owners.canonical(),
                attempted: next,
                max: format.max_index(),
            });
        }
        self.index = next;
        self.format = format;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    #[rstest]
    #[case("00", 2, 99, 7, "07")]
    #[case("000", 3, 999, 7, "007")]
    #[case("ab", 2, 99, 42, "42")]
    fn format_width_follows_pattern_length(
        #[case] pattern: &str,
        #[case] width: usize,
        #[case] max: u32,
        #[case] index: u32,
        #[case] rendered: &str,
    ) {
        let format = CounterFormat::new(pattern).expect("supported format");
        assert_eq!(format.width(), width);
        assert_eq!(format.max_index(), max);
        assert_eq!(format.render(index), rendered);
    }

    #[rstest]
    #[case("0")]
    #[case("0000")]
    #[case("")]
    fn unsupported_widths_are_rejected(#[case] pattern: &str) {
        assert!(matches!(
            CounterFormat::new(pattern),
            Err(SequenceDomainError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn owner_sets_are_order_insensitive() {
        let left = OwnerSet::new(["system", " operation "]).expect("valid owners");
        let right = OwnerSet::new(["operation", "system"]).expect("valid owners");

        assert_eq!(left, right);
        assert_eq!(left.canonical(), "operation,system");
        assert!(matches!(
            OwnerSet::new(["  "]),
            Err(SequenceDomainError::EmptyOwnerSet)
        ));
    }

    #[test]
    fn keys_containing_the_separator_are_rejected() {
        assert!(matches!(
            OwnerSet::new(["a,b"]),
            Err(SequenceDomainError::InvalidOwnerKey(ref key)) if key == "a,b"
        ));
        let split = OwnerSet::new(["a", "b"]).expect("valid owners");
        assert_eq!(split.canonical(), "a,b");
    }

    #[test]
    fn deserialized_owner_sets_are_validated() {
        let parsed: OwnerSet = serde_json::from_str(r#"["b", "a"]"#).expect("valid owners");
        assert_eq!(parsed.canonical(), "a,b");
        assert!(serde_json::from_str::<OwnerSet>(r#"["a,b"]"#).is_err());
        assert!(serde_json::from_str::<OwnerSet>("[]").is_err());
    }

    #[test]
    fn advance_stops_at_format_maximum() {
        let format = CounterFormat::new("00").expect("supported format");
        let owners = OwnerSet::new(["a"]).expect("valid owners");
        let mut counter = Counter::from_persisted(owners, today(), format.clone(), 98);

        counter.advance(format.clone()).expect("99 fits");
        assert_eq!(counter.rendered(), "99");

        let result = counter.advance(format);
        assert!(matches!(
            result,
            Err(SequenceDomainError::CounterExhausted {
                attempted: 100,
                max: 99,
                ..
            })
        ));
        assert_eq!(counter.index(), 99);
    }
}
