// Copyright © 2016, Canal TP and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
//     the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
//     powered by Canal TP (www.canaltp.fr).
// Help us simplify mobility and open public transport:
//     a non ending quest to the responsive locomotion way of traveling!
//
// LICENCE: This program is free software; you can redistribute it
// and/or modify it under the terms of the GNU Affero General Public
// License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
// Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public
// License along with this program. If not, see
// <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// IRC #navitia on freenode
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use crate::config::SearchConfig;
use crate::document::Document;
use crate::error::Error;
use crate::query::Query;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slog_scope::{debug, warn};
use std::fmt;

pub const SEARCH_PATH: &str = "_search";

/// Pagination metadata of a search response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub count: u64,
    pub per_page: u64,
    pub page: u64,
    pub pages: u64,
}

// SearchClient is a thin wrapper around the search backend http API.
// Build one per request, it holds no state besides its configuration and
// a handle on a (possibly shared) http connection pool.
pub struct SearchClient {
    config: SearchConfig,
    http: reqwest::blocking::Client,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Result<SearchClient, Error> {
        let http = SearchClient::http_client(&config)?;
        Ok(SearchClient::with_http(config, http))
    }

    /// The connection pool searches with `config` go through. Cloning it is
    /// cheap and clones share their connections.
    pub fn http_client(config: &SearchConfig) -> Result<reqwest::blocking::Client, Error> {
        // reqwest has a 30s default timeout, we only want one when asked for
        reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::from)
    }

    pub fn with_http(config: SearchConfig, http: reqwest::blocking::Client) -> SearchClient {
        SearchClient { config, http }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The full url of a search on `path`, with the pagination of `query`
    /// folded into `_from` and `size`.
    pub fn request_url(&self, path: &str, mut query: Query) -> Result<String, Error> {
        let mut url = self.config.url_for(path);
        query.paginate(&self.config)?;
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.to_query_string());
        }
        Ok(url)
    }

    /// POST `body` on the `_search` endpoint
    pub fn query(&self, body: &Value, query: Query) -> Result<Value, Error> {
        self.query_path(SEARCH_PATH, body, query)
    }

    pub fn query_path(&self, path: &str, body: &Value, query: Query) -> Result<Value, Error> {
        let url = self.request_url(path, query)?;
        let body = serde_json::to_string(body)?;
        debug!("searching {}", url; "body" => &body);

        let res = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        let text = res.text()?;
        serde_json::from_str(&text).map_err(Error::from)
    }

    /// The only document of `rsp`.
    ///
    /// More than one hit is treated as no hit at all: a caller asking for a
    /// single document must not get a random one.
    pub fn single(&self, rsp: &Value) -> Result<Option<Document>, Error> {
        let hits = getter!(rsp, "/hits/hits", as_array)?;
        match hits.len() {
            0 => Ok(None),
            1 => Ok(Some(Document::new(hits[0].clone()))),
            count => {
                warn!("ambiguous single-result query: got {} results", count; "count" => count);
                Ok(None)
            }
        }
    }

    /// Pagination metadata of `rsp`, for the given (or configured) window.
    pub fn paginate(
        &self,
        rsp: &Value,
        per_page: Option<u64>,
        page: Option<u64>,
    ) -> Result<Pagination, Error> {
        let per_page = self.config.effective_per_page(per_page);
        let page = self.config.effective_page(page);

        let total = getter!(rsp, "/hits/total")?;
        // newer engines wrap the total in an object
        let total = match total.as_u64() {
            Some(total) => total,
            None => getter!(total, "/value", as_u64)?,
        };
        let count = getter!(rsp, "/hits/hits", as_array)?.len() as u64;

        if per_page == 0 {
            return Err(Error::InvalidParam {
                name: "per_page".to_string(),
                reason: "cannot paginate with an empty page size".to_string(),
            });
        }
        let pages = total / per_page + u64::from(total % per_page != 0);

        Ok(Pagination {
            total,
            count,
            per_page,
            page,
            pages,
        })
    }
}

impl fmt::Display for SearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.config, f)
    }
}
