use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9200;
pub const DEFAULT_PER_PAGE: u64 = 100;
pub const DEFAULT_PER_PAGE_MAX: u64 = 500;
pub const DEFAULT_PAGE: u64 = 1;

/// Where the search backend lives and how results are windowed.
///
/// A `SearchConfig` is never mutated once built; every request gets its
/// own copy through its own `SearchClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub host: String,
    pub port: u16,
    /// Index (or alias) the documents live in. `None` queries the whole cluster.
    pub index: Option<String>,
    pub per_page: u64,
    pub per_page_max: u64,
    pub page: u64,
    /// Upper bound for a search round trip. There is none by default.
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            index: None,
            per_page: DEFAULT_PER_PAGE,
            per_page_max: DEFAULT_PER_PAGE_MAX,
            page: DEFAULT_PAGE,
            timeout: None,
        }
    }
}

impl SearchConfig {
    pub fn new<H: Into<String>>(host: H, port: u16) -> Self {
        SearchConfig {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_index<'a, T: Into<Option<&'a str>>>(mut self, index: T) -> Self {
        // an empty index name is the same as no index at all
        self.index = index
            .into()
            .filter(|i| !i.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_per_page(mut self, per_page: u64, per_page_max: u64) -> Self {
        self.per_page = per_page;
        self.per_page_max = per_page_max;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The requested page size, or the configured one, never above `per_page_max`.
    pub fn effective_per_page(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.per_page)
            .min(self.per_page_max)
    }

    pub fn effective_page(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.page)
    }

    /// `http://host:port[/index]/path`
    pub fn url_for(&self, path: &str) -> String {
        match self.index {
            Some(ref index) => format!("http://{}:{}/{}/{}", self.host, self.port, index, path),
            None => format!("http://{}:{}/{}", self.host, self.port, path),
        }
    }
}

impl fmt::Display for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({})",
            self.host,
            self.port,
            self.index.as_ref().map(String::as_str).unwrap_or("*")
        )
    }
}
