use actix_web::HttpResponse;

const ROBOTS: &str = include_str!("../../templates/robots.txt");

pub fn robots_txt() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(ROBOTS)
}
