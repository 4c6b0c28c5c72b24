//! Page-number pagination envelope.

use serde::{Deserialize, Serialize};

/// One page of a paginated list.
///
/// The dashboard list endpoints return twenty items per page by default.
/// A missing `results` field decodes as an empty page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Consume the page and return its items.
    #[must_use]
    pub fn into_results(self) -> Vec<T> {
        self.results
    }

    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_results_is_empty() {
        let page: Page<u32> = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_next_link() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"count": 25, "next": "http://x/?page=2", "previous": null, "results": [1, 2]}"#,
        )
        .unwrap();
        assert!(page.has_next());
        assert_eq!(page.into_results(), vec![1, 2]);
    }
}
