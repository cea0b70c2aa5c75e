//! Query strings and the canonical signed payload

use url::form_urlencoded;

/// An ordered list of query pairs. Repeated keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a form-urlencoded query, with or without a leading `?`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Builder-style [`QueryString::push`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value.to_string());
        self
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove every pair with `key`, returning the removed values in order.
    pub fn remove_all(&mut self, key: &str) -> Vec<String> {
        let mut removed = Vec::new();
        self.pairs.retain(|(k, v)| {
            if k == key {
                removed.push(v.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode in insertion order.
    pub fn to_query(&self) -> String {
        encode(self.pairs.iter())
    }

    /// Encode with pairs sorted by key, then value.
    ///
    /// Two query strings holding the same pairs in any order produce the
    /// same canonical form.
    pub fn canonical(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        sorted.sort();
        encode(sorted.into_iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryString {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn encode<'a>(pairs: impl Iterator<Item = &'a (String, String)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

/// The string a signed URL's signature covers: `path` alone, or
/// `path?canonical_query` when there are query pairs.
pub fn canonical_payload(path: &str, qs: &QueryString) -> String {
    if qs.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", qs.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_get() {
        let qs = QueryString::parse("?name=virk&tag=a&tag=b&empty=");

        assert_eq!(qs.get("name"), Some("virk"));
        assert_eq!(qs.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(qs.get("empty"), Some(""));
        assert_eq!(qs.get("missing"), None);
        assert_eq!(qs.len(), 4);
    }

    #[test]
    fn test_parse_decodes() {
        let qs = QueryString::parse("q=hello+world&path=%2Fa%2Fb");

        assert_eq!(qs.get("q"), Some("hello world"));
        assert_eq!(qs.get("path"), Some("/a/b"));
    }

    #[test]
    fn test_to_query_keeps_order() {
        let qs = QueryString::new().with("z", 1).with("a", 2);
        assert_eq!(qs.to_query(), "z=1&a=2");
        assert_eq!(qs.canonical(), "a=2&z=1");
    }

    #[test]
    fn test_encoding_roundtrip() {
        let qs = QueryString::new()
            .with("q", "hello world & more")
            .with("emoji", "ü✓");

        assert_eq!(QueryString::parse(&qs.to_query()), qs);
    }

    #[test]
    fn test_remove_all() {
        let mut qs = QueryString::parse("a=1&signature=x&b=2&signature=y");
        assert_eq!(qs.remove_all("signature"), vec!["x", "y"]);
        assert_eq!(qs.to_query(), "a=1&b=2");
        assert!(qs.remove_all("signature").is_empty());
    }

    #[test]
    fn test_canonical_payload() {
        assert_eq!(canonical_payload("/posts/1", &QueryString::new()), "/posts/1");
        assert_eq!(
            canonical_payload("/posts/1", &QueryString::parse("page=1&expires_at=5")),
            "/posts/1?expires_at=5&page=1"
        );
    }

    proptest! {
        #[test]
        fn canonical_is_order_independent(
            pairs in prop::collection::vec(("[a-z_]{1,6}", "[a-zA-Z0-9 &=]{0,6}"), 0..8),
            seed in any::<u64>(),
        ) {
            let forward: QueryString = pairs.iter().cloned().collect();

            let mut shuffled = pairs.clone();
            let len = shuffled.len();
            if len > 1 {
                // deterministic rotation + reversal driven by the seed
                shuffled.rotate_left((seed as usize) % len);
                if seed % 2 == 0 {
                    shuffled.reverse();
                }
            }
            let permuted: QueryString = shuffled.into_iter().collect();

            prop_assert_eq!(forward.canonical(), permuted.canonical());
        }
    }
}
