use super::see_route;
use crate::model::{Feature, PlacesError};
use crate::Context;
use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse};
use places::Query;
use serde_json::json;
use std::convert::TryFrom;

pub fn null_id(req: HttpRequest) -> Result<HttpResponse, PlacesError> {
    see_route(&req, "index", std::iter::empty::<&str>())
}

pub fn place_id(state: Data<Context>, id: Path<u64>) -> Result<Json<Feature>, PlacesError> {
    let id = id.into_inner();
    let client = state.search_client();
    let body = json!({
        "query": {
            "ids": { "values": [id] }
        }
    });
    let rsp = client.query(&body, Query::new())?;
    let doc = client
        .single(&rsp)?
        .ok_or_else(|| PlacesError::BadRequest(format!("no place with id {}", id)))?;
    Ok(Json(Feature::try_from(doc)?))
}
