/// Longest-suffix lookup table keyed by module id fragments.
///
/// A key matches any query that ends with it. A key starting with `^` is
/// exact and matches only a query equal to the rest of the key. When several
/// keys match, the longest one wins.
#[derive(Debug, Clone)]
pub struct SuffixMatcher<V> {
    // Sorted by descending key length so the first hit is the longest.
    entries: Vec<(Key, V)>,
}

#[derive(Debug, Clone)]
struct Key {
    text: String,
    exact: bool,
}

impl Key {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix('^') {
            Some(text) => Self {
                text: text.to_string(),
                exact: true,
            },
            None => Self {
                text: raw.to_string(),
                exact: false,
            },
        }
    }

    fn matches(&self, query: &str) -> bool {
        if self.exact {
            query == self.text
        } else {
            query.ends_with(&self.text)
        }
    }
}

impl<V> SuffixMatcher<V> {
    pub fn new<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut entries: Vec<(Key, V)> = entries
            .into_iter()
            .map(|(k, v)| (Key::parse(k.as_ref()), v))
            .collect();
        entries.sort_by(|(a, _), (b, _)| {
            b.text
                .len()
                .cmp(&a.text.len())
                .then_with(|| a.text.cmp(&b.text))
        });
        Self { entries }
    }

    /// Value of the longest matching key, if any.
    pub fn get(&self, query: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key.matches(query))
            .map(|(_, v)| v)
    }

    pub fn lookup<'a>(&'a self, query: &str, default: &'a V) -> &'a V {
        self.get(query).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V> FromIterator<(K, V)> for SuffixMatcher<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter)
    }
}
