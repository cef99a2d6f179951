//! SOC code canonicalization and the code-to-title lookup.

use arrow::array::StringArray;
use rustc_hash::FxHashMap;

/// Canonical form of a SOC code
///
/// Surrounding whitespace is trimmed, and a decimal suffix made only of zeros
/// (or nothing at all) is dropped: `"11-1011.00"` becomes `"11-1011"` while
/// `"15-1132.01"` is kept as is.
#[must_use]
pub fn canonical_soc_code(code: &str) -> &str {
    let code = code.trim();
    match code.split_once('.') {
        Some((base, suffix)) if suffix.chars().all(|c| c == '0') => base,
        _ => code,
    }
}

/// Canonicalize a whole SOC code column; nulls stay null
#[must_use]
pub fn canonicalize_soc_column(codes: &StringArray) -> StringArray {
    codes
        .iter()
        .map(|code| code.map(canonical_soc_code))
        .collect()
}

/// Mapping from SOC code to a single canonical title
///
/// Built once over the whole record set: the title of the first row (in row
/// order) that carries both the code and a title wins, and every other row
/// with that code is overwritten with it, even when the extract disagrees.
#[derive(Debug, Clone, Default)]
pub struct SocTitleLookup {
    titles: FxHashMap<String, String>,
}

impl SocTitleLookup {
    /// Build the lookup from `(code, title)` pairs in row order
    pub fn build<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
    {
        let mut titles = FxHashMap::default();
        for (code, title) in rows {
            if let (Some(code), Some(title)) = (code, title) {
                if !titles.contains_key(code) {
                    titles.insert(code.to_string(), title.to_string());
                }
            }
        }
        Self { titles }
    }

    /// Build the lookup from aligned code and title columns
    #[must_use]
    pub fn from_columns(codes: &StringArray, titles: &StringArray) -> Self {
        Self::build(codes.iter().zip(titles.iter()))
    }

    /// Canonical title of `code`
    #[must_use]
    pub fn title(&self, code: &str) -> Option<&str> {
        self.titles.get(code).map(String::as_str)
    }

    /// Title column aligned with `codes`
    #[must_use]
    pub fn apply(&self, codes: &StringArray) -> StringArray {
        codes
            .iter()
            .map(|code| code.and_then(|c| self.title(c)))
            .collect()
    }

    /// Number of distinct codes with a title
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
