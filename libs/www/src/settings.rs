use config::{Config, ConfigError, Environment, File};
use failure::Fail;
use places::config::{DEFAULT_HOST, DEFAULT_PER_PAGE, DEFAULT_PER_PAGE_MAX, DEFAULT_PORT};
use places::{SearchClient, SearchConfig};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_INDEX: &str = "whosonfirst";
/// Prefix of the environment variables overriding the settings,
/// eg `PLACES_SEARCH_HOST` for `search.host`
pub const ENV_PREFIX: &str = "PLACES";

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "invalid configuration: {}", _0)]
    Config(#[cause] ConfigError),
    #[fail(display = "cannot set up the search client: {}", _0)]
    Search(#[cause] places::Error),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

#[derive(StructOpt, Debug, Default, Clone)]
#[structopt(name = "places-www", about = "Web front-end for places")]
pub struct Args {
    /// Configuration file (toml), overriden by PLACES_* environment variables
    #[structopt(short = "c", long = "config-file", parse(from_os_str))]
    pub config_file: Option<PathBuf>,

    /// Address to bind
    #[structopt(short = "b", long = "bind")]
    pub bind: Option<String>,

    /// Number of http workers, default to the number of cpus
    #[structopt(short = "t", long = "nb-threads")]
    pub nb_threads: Option<usize>,

    /// Search backend host
    #[structopt(long = "search-host")]
    pub search_host: Option<String>,

    /// Search backend port
    #[structopt(long = "search-port")]
    pub search_port: Option<u16>,

    /// Index to search in, an empty value searches all indexes
    #[structopt(long = "search-index")]
    pub search_index: Option<String>,

    /// Timeout of a search in milliseconds. There is none by default.
    #[structopt(long = "search-timeout")]
    pub search_timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    pub host: String,
    pub port: u16,
    pub index: Option<String>,
    pub per_page: u64,
    pub per_page_max: u64,
    /// in milliseconds
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub service: Service,
    pub search: Search,
}

impl Settings {
    // Settings are layered, each layer overriding the previous one:
    // * the built-in defaults
    // * the configuration file, if any
    // * the PLACES_* environment variables, with '_' as the path separator:
    //   PLACES_SEARCH_HOST overrides search.host
    // * the command line arguments
    pub fn new(args: &Args) -> Result<Self, Error> {
        let mut config = Config::new();
        config.set_default("service.bind", DEFAULT_BIND)?;
        config.set_default("search.host", DEFAULT_HOST)?;
        config.set_default("search.port", i64::from(DEFAULT_PORT))?;
        config.set_default("search.index", DEFAULT_INDEX)?;
        config.set_default("search.per_page", DEFAULT_PER_PAGE as i64)?;
        config.set_default("search.per_page_max", DEFAULT_PER_PAGE_MAX as i64)?;

        if let Some(ref path) = args.config_file {
            config.merge(File::from(path.as_path()))?;
        }

        config.merge(Environment::with_prefix(ENV_PREFIX).separator("_"))?;
        merge_env_keys(&mut config, |var| std::env::var(var).ok())?;

        if let Some(ref bind) = args.bind {
            config.set("service.bind", bind.as_str())?;
        }
        if let Some(ref host) = args.search_host {
            config.set("search.host", host.as_str())?;
        }
        if let Some(port) = args.search_port {
            config.set("search.port", i64::from(port))?;
        }
        if let Some(ref index) = args.search_index {
            config.set("search.index", index.as_str())?;
        }
        if let Some(timeout) = args.search_timeout {
            config.set("search.timeout", timeout as i64)?;
        }

        config.try_into().map_err(Error::from)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.search.host.clone(), self.search.port)
            .with_index(self.search.index.as_ref().map(String::as_str))
            .with_per_page(self.search.per_page, self.search.per_page_max)
            .with_timeout(self.search.timeout.map(Duration::from_millis))
    }
}

// The '_' separator also splits the keys holding an underscore,
// PLACES_SEARCH_PER_PAGE lands in `search.per.page`: map those explicitly.
const ENV_KEYS: [(&str, &str); 2] = [
    ("SEARCH_PER_PAGE", "search.per_page"),
    ("SEARCH_PER_PAGE_MAX", "search.per_page_max"),
];

fn merge_env_keys<F>(config: &mut Config, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    for (suffix, key) in ENV_KEYS.iter() {
        if let Some(value) = lookup(&format!("{}_{}", ENV_PREFIX, suffix)) {
            config.set(key, value)?;
        }
    }
    Ok(())
}

/// Read only state shared by all the handlers
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub nb_threads: usize,
    // one pool for the whole service, the search clients only borrow it
    http: reqwest::blocking::Client,
}

impl Context {
    /// A brand new client, handlers must not share them between requests
    pub fn search_client(&self) -> SearchClient {
        SearchClient::with_http(self.settings.search_config(), self.http.clone())
    }
}

impl TryFrom<&Args> for Context {
    type Error = Error;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let settings = Settings::new(args)?;
        let http = SearchClient::http_client(&settings.search_config()).map_err(Error::Search)?;
        Ok(Context {
            settings,
            nb_threads: args.nb_threads.unwrap_or_else(num_cpus::get),
            http,
        })
    }
}
