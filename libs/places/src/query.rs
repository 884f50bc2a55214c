use crate::config::SearchConfig;
use crate::error::Error;
use std::iter::FromIterator;
use url::form_urlencoded;

pub const PAGE: &str = "page";
pub const PER_PAGE: &str = "per_page";
pub const FROM: &str = "_from";
pub const SIZE: &str = "size";

/// Query-string parameters sent along a search.
///
/// Keys keep their insertion order, so the encoded query string is
/// stable. `page` and `per_page` are reserved: they are folded into
/// `_from`/`size` by [`Query::paginate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn with<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`. An existing key keeps its position.
    pub fn insert<K: Into<String>, V: ToString>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.params.iter().position(|(k, _)| k == key)?;
        Some(self.params.remove(pos).1)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Remove a reserved key and read it as a page number or size.
    /// Zero counts as absent.
    fn take_count(&mut self, key: &str) -> Result<Option<u64>, Error> {
        match self.remove(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(|n| if n == 0 { None } else { Some(n) })
                .map_err(|e| Error::InvalidParam {
                    name: key.to_string(),
                    reason: format!("`{}` is not a positive integer ({})", raw, e),
                }),
        }
    }

    /// Replace `page`/`per_page` by the `_from`/`size` window the backend understands.
    pub fn paginate(&mut self, config: &SearchConfig) -> Result<Window, Error> {
        let per_page = self.take_count(PER_PAGE)?;
        let page = self.take_count(PAGE)?;
        let window = Window {
            page: config.effective_page(page),
            per_page: config.effective_per_page(per_page),
        };
        self.insert(FROM, window.offset()?);
        self.insert(SIZE, window.per_page);
        Ok(window)
    }

    /// `application/x-www-form-urlencoded` rendering, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (k, v) in iter {
            query.insert(k, v);
        }
        query
    }
}

/// The slice of results a search asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub page: u64,
    pub per_page: u64,
}

impl Window {
    /// Index of the first result of the window. A page too far away for
    /// the offset to fit in a `u64` is an invalid parameter.
    pub fn offset(&self) -> Result<u64, Error> {
        self.page
            .saturating_sub(1)
            .checked_mul(self.per_page)
            .ok_or_else(|| Error::InvalidParam {
                name: PAGE.to_string(),
                reason: format!(
                    "page {} of {} results is out of range",
                    self.page, self.per_page
                ),
            })
    }
}
