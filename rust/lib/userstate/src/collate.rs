//! Locale-aware string ordering for display lists.
//!
//! Backed by the ICU4X collator with the CLDR root collation, which is
//! what a browser's `localeCompare` applies when no locale is given:
//! accents and case are secondary and tertiary differences, and
//! punctuation follows the CLDR order (`_` < `-` < `.`).

use std::cmp::Ordering;

use icu_collator::{CollatorOptions, Numeric};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which case sorts first when two strings differ only in case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFirst {
    #[default]
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollationConfig {
    /// Compare runs of digits by numeric value (`user2 < user10`).
    pub numeric: bool,
    pub case_first: CaseFirst,
}

/// Collation settings for the sorted user list.
///
/// Holds only the configuration; the ICU collator is built per sort so
/// the store stays `Send + Sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collator {
    config: CollationConfig,
}

impl Collator {
    pub fn new(config: CollationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> CollationConfig {
        self.config
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self.build() {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }

    /// Sort `items` by the string `key` returns, building the collator once.
    pub fn sort_by_key<T, F>(&self, items: &mut [T], key: F)
    where
        F: Fn(&T) -> &str,
    {
        match self.build() {
            Some(collator) => items.sort_by(|a, b| collator.compare(key(a), key(b))),
            None => items.sort_by(|a, b| key(a).cmp(key(b))),
        }
    }

    fn options(&self) -> CollatorOptions {
        let mut options = CollatorOptions::new();
        options.numeric = Some(if self.config.numeric {
            Numeric::On
        } else {
            Numeric::Off
        });
        options.case_first = Some(match self.config.case_first {
            CaseFirst::Lower => icu_collator::CaseFirst::LowerFirst,
            CaseFirst::Upper => icu_collator::CaseFirst::UpperFirst,
        });
        options
    }

    /// Root-locale collator; `None` falls back to code point order.
    fn build(&self) -> Option<icu_collator::Collator> {
        match icu_collator::Collator::try_new(&Default::default(), self.options()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!(error = %e, "root collation unavailable, using code point order");
                None
            }
        }
    }
}
