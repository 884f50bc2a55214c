use super::see_other;
use actix_web::HttpResponse;

// Sitemaps are generated out of band and served by the proxy in front of us,
// we only point to their index.
pub const SITEMAP_INDEX: &str = "/sitemaps/index.xml";

pub fn sitemap_xml() -> HttpResponse {
    see_other(SITEMAP_INDEX)
}
