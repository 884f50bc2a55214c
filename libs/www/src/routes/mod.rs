mod entry_point;
mod errors;
mod id;
mod random;
mod robots;
mod sitemap;
mod status;

pub use entry_point::entry_point;
pub use errors::{default_404, server_error};
pub use id::{null_id, place_id};
pub use random::{random_place, random_placetype};
pub use robots::robots_txt;
pub use sitemap::sitemap_xml;
pub use status::status;

use crate::model::PlacesError;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use slog_scope::error;

/// 303 to `location`
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .header(header::LOCATION, location)
        .finish()
}

/// 303 to the named route `name`, filled with `elements`
pub(crate) fn see_route<U, I>(
    req: &HttpRequest,
    name: &str,
    elements: U,
) -> Result<HttpResponse, PlacesError>
where
    U: IntoIterator<Item = I>,
    I: AsRef<str>,
{
    let url = req.url_for(name, elements).map_err(|e| {
        error!("cannot build the url of route '{}': {:?}", name, e);
        PlacesError::Internal
    })?;
    Ok(see_other(url.path()))
}
