use crate::model::Status;
use crate::Context;
use actix_web::web::{Data, Json};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn status(state: Data<Context>) -> Json<Status> {
    Json(Status {
        version: VERSION.to_string(),
        search: state.settings.search_config().to_string(),
        status: "good".to_string(),
    })
}
