//! Test-annotation coverage: the collaborator interface the completeness
//! check consumes, plus the default annotation scanner.
//!
//! The validator never touches the filesystem; callers run the scanner once
//! over whatever sources they care about (typically test files) before
//! validation and hand the resulting [`CoverageSet`] in. Annotations look
//! like:
//!
//! ```text
//! // covers: login/ac-1
//! // covers: @01ARZ3ND
//! ```
//!
//! Keys are an alias or 8-character identity prefix, optionally followed by
//! `/<criterion-id>`.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

use crate::Result;

/// Coverage lookup consumed by the validator's completeness check.
pub trait CoverageIndex {
    /// Returns true if the key has a coverage annotation.
    fn covered(&self, key: &str) -> bool;
}

/// A set of covered-criterion keys.
#[derive(Debug, Clone, Default)]
pub struct CoverageSet {
    keys: HashSet<String>,
}

impl CoverageSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one covered key.
    pub fn insert(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if no keys were collected.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl CoverageIndex for CoverageSet {
    fn covered(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

impl<S: Into<String>> FromIterator<S> for CoverageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Regex-based scanner for `covers:` annotations in source text.
#[derive(Debug, Clone)]
pub struct AnnotationScanner {
    pattern: Regex,
}

impl AnnotationScanner {
    /// Create a scanner with the default annotation pattern.
    pub fn new() -> Self {
        // Compiled once; reused across files.
        let pattern = Regex::new(r"covers:\s*@?([A-Za-z0-9][A-Za-z0-9_-]*(?:/[A-Za-z0-9_-]+)?)")
            .expect("annotation pattern is valid");
        Self { pattern }
    }

    /// Extract covered keys from one source text into the set.
    pub fn scan_str(&self, text: &str, set: &mut CoverageSet) {
        for capture in self.pattern.captures_iter(text) {
            set.insert(&capture[1]);
        }
    }

    /// Scan a list of files, returning the union of their keys.
    ///
    /// This is the one I/O convenience in the crate; it is meant to run once
    /// before validation, never during it.
    pub fn scan_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<CoverageSet> {
        let mut set = CoverageSet::new();
        for path in paths {
            let text = std::fs::read_to_string(path.as_ref())?;
            self.scan_str(&text, &mut set);
            tracing::debug!(path = %path.as_ref().display(), keys = set.len(), "scanned annotations");
        }
        Ok(set)
    }
}

impl Default for AnnotationScanner {
    fn default() -> Self {
        Self::new()
    }
}
