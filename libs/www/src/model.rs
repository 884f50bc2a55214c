use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use failure::Fail;
use places::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use slog_scope::error;
use std::convert::TryFrom;

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiError {
    pub short: String,
    pub long: String,
}

#[derive(Debug, Fail)]
pub enum PlacesError {
    #[fail(display = "Unable to find requested route: '{}'", _0)]
    RouteNotFound(String),
    #[fail(display = "{}", _0)]
    NotFound(String),
    #[fail(display = "{}", _0)]
    BadRequest(String),
    #[fail(display = "{}", _0)]
    Search(#[cause] places::Error),
    #[fail(display = "Internal server error")]
    Internal,
}

impl From<places::Error> for PlacesError {
    fn from(err: places::Error) -> Self {
        PlacesError::Search(err)
    }
}

impl PlacesError {
    fn status(&self) -> (StatusCode, &'static str) {
        match *self {
            PlacesError::RouteNotFound(_) | PlacesError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "not found")
            }
            PlacesError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad request"),
            PlacesError::Search(places::Error::InvalidParam { .. }) => {
                (StatusCode::BAD_REQUEST, "validation error")
            }
            PlacesError::Search(_) => (StatusCode::INTERNAL_SERVER_ERROR, "query error"),
            PlacesError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
        }
    }
}

impl actix_web::error::ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let (status, short) = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }
        HttpResponse::build(status).json(ApiError {
            short: short.to_owned(),
            long: self.to_string(),
        })
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EndPoint {
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Status {
    pub version: String,
    pub search: String,
    pub status: String,
}

/// A place, in a geojson-like envelope. The geometry is always empty.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub properties: Value,
    pub geometry: Map<String, Value>,
}

impl TryFrom<Document> for Feature {
    type Error = places::Error;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        Ok(Feature {
            feature_type: "Feature".to_string(),
            properties: doc.into_source()?,
            geometry: Map::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::ResponseError;
    use serde_json::json;

    #[test]
    fn document_to_feature() {
        let doc = Document::new(json!({
            "_id": "101751119",
            "_source": {"wof:name": "Montréal", "wof:placetype": "locality"}
        }));
        let feature = Feature::try_from(doc).unwrap();
        assert_eq!(
            serde_json::to_value(&feature).unwrap(),
            json!({
                "type": "Feature",
                "properties": {"wof:name": "Montréal", "wof:placetype": "locality"},
                "geometry": {}
            })
        );
    }

    #[test]
    fn document_without_source() {
        assert!(Feature::try_from(Document::new(json!({"_id": "1"}))).is_err());
    }

    #[test]
    fn error_status() {
        assert_eq!(
            PlacesError::NotFound("nope".into()).error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlacesError::BadRequest("nope".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        let invalid = places::Error::InvalidParam {
            name: "page".into(),
            reason: "nope".into(),
        };
        assert_eq!(
            PlacesError::from(invalid).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        let shape = places::Error::Shape("missing `/hits/hits` entry".into());
        assert_eq!(
            PlacesError::from(shape).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
