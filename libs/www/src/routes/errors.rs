use crate::model::PlacesError;
use actix_web::{HttpRequest, HttpResponse};

pub fn default_404(req: HttpRequest) -> Result<HttpResponse, PlacesError> {
    Err(PlacesError::RouteNotFound(req.path().to_string()))
}

pub fn server_error() -> Result<HttpResponse, PlacesError> {
    Err(PlacesError::Internal)
}
