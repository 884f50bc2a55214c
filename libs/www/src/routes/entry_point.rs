use crate::model::EndPoint;
use actix_web::web::Json;
use actix_web::Responder;

pub fn entry_point() -> impl Responder {
    Json(EndPoint {
        description: "places service".to_owned(),
    })
}
