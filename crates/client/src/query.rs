//! Query-string encoding for list endpoints.

use url::form_urlencoded;

/// Filters for a list request, in insertion order.
///
/// A key may be set to a value, set to the empty string, or left unset
/// (`None`). Only keys with a non-empty value reach the query string.
///
/// ```
/// use emporium_client::ListOptions;
///
/// let options = ListOptions::new()
///     .set("search", "")
///     .set("category", "3")
///     .set_opt("stock", None::<&str>);
/// assert_eq!(options.to_query_string(), "category=3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    entries: Vec<(String, Option<String>)>,
}

impl ListOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    /// Set `key` to `value`, or leave it unset when `value` is `None`.
    #[must_use]
    pub fn set_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key, value.map(|v| v.to_string()));
        self
    }

    /// Set or replace `key`. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Value for `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Entries that survive filtering: set and non-empty.
    pub fn effective(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, v)| match v.as_deref() {
            Some(v) if !v.is_empty() => Some((k.as_str(), v)),
            _ => None,
        })
    }

    /// Form-urlencoded query string without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.effective() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// `path` with the query string appended; unchanged when nothing survives.
    #[must_use]
    pub fn append_to(&self, path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{query}")
        }
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for ListOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (key, value) in iter {
            options.insert(key, value.map(Into::into));
        }
        options
    }
}
