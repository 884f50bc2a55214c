use super::see_route;
use crate::model::PlacesError;
use crate::Context;
use actix_web::web::{Data, Path};
use actix_web::{HttpRequest, HttpResponse};
use places::query::PER_PAGE;
use places::Query;
use rand::Rng;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// A seed in `[0, now]`, now being the epoch in seconds
fn random_seed() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    rand::thread_rng().gen_range(0, now + 1)
}

pub(crate) fn random_query(seed: u64) -> Value {
    json!({
        "query": {
            "function_score": {
                "query": { "match_all": {} },
                "functions": [
                    { "random_score": { "seed": seed } }
                ]
            }
        }
    })
}

pub fn random_place(
    state: Data<Context>,
    req: HttpRequest,
) -> Result<HttpResponse, PlacesError> {
    let client = state.search_client();
    let rsp = client.query(&random_query(random_seed()), Query::new().with(PER_PAGE, 1))?;
    let doc = client
        .single(&rsp)?
        .ok_or_else(|| PlacesError::NotFound("no place to pick from".to_string()))?;
    see_route(&req, "place_id", &[doc.id()?])
}

pub fn random_placetype(placetype: Path<String>) -> Result<HttpResponse, PlacesError> {
    // TODO: pick among the places of the given placetype (and campuses for
    // 'airport') once placetypes can be validated
    Err(PlacesError::NotFound(format!(
        "random '{}' places are not available",
        placetype.into_inner()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_not_in_the_future() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        for _ in 0..100 {
            assert!(random_seed() <= now + 1);
        }
    }

    #[test]
    fn random_query_shape() {
        let query = random_query(42);
        assert_eq!(
            query.pointer("/query/function_score/functions/0/random_score/seed"),
            Some(&json!(42))
        );
        assert_eq!(
            query.pointer("/query/function_score/query/match_all"),
            Some(&json!({}))
        );
    }
}
