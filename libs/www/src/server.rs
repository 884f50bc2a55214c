use crate::prometheus_middleware::PrometheusMetrics;
use crate::routes::{
    default_404, entry_point, null_id, place_id, random_place, random_placetype, robots_txt,
    server_error, sitemap_xml, status,
};
use crate::{Args, Context};
use actix_web::{middleware, web, App, HttpServer};
use failure::Fail;
use slog_scope::info;
use std::convert::TryFrom;

pub const METRICS_PATH: &str = "/metrics";

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{}", _0)]
    Settings(#[cause] crate::settings::Error),
    #[fail(display = "cannot run the http server: {}", _0)]
    Io(#[cause] std::io::Error),
}

pub fn configure_server(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .name("index")
            .route(web::get().to(entry_point)),
    )
    .service(web::resource("/id").route(web::get().to(null_id)))
    .service(web::resource("/id/").route(web::get().to(null_id)))
    .service(
        web::resource("/id/{id}")
            .name("place_id")
            .route(web::get().to(place_id)),
    )
    .service(web::resource("/id/{id}/").route(web::get().to(place_id)))
    .service(web::resource("/random").route(web::get().to(random_place)))
    .service(web::resource("/random/").route(web::get().to(random_place)))
    .service(web::resource("/random/{placetype}").route(web::get().to(random_placetype)))
    .service(web::resource("/random/{placetype}/").route(web::get().to(random_placetype)))
    .service(web::resource("/sitemap.xml").route(web::get().to(sitemap_xml)))
    .service(web::resource("/sitemaps.xml").route(web::get().to(sitemap_xml)))
    .service(web::resource("/robots.txt").route(web::get().to(robots_txt)))
    .service(web::resource("/500").route(web::get().to(server_error)))
    .service(web::resource("/500/").route(web::get().to(server_error)))
    .service(web::resource("/status").route(web::get().to(status)));
}

pub fn runserver(args: &Args) -> Result<(), Error> {
    let ctx = Context::try_from(args).map_err(Error::Settings)?;
    let bind = ctx.settings.service.bind.clone();
    let nb_threads = ctx.nb_threads;
    info!(
        "serving places on {} with {} workers, searching {}",
        bind,
        nb_threads,
        ctx.settings.search_config()
    );

    let prometheus = PrometheusMetrics::new(METRICS_PATH);
    HttpServer::new(move || {
        App::new()
            .data(ctx.clone())
            // NOTE: if some middlewares are added, don't forget to add them in the tests too (in PlacesHandler::new)
            .wrap(actix_cors::Cors::new().allowed_methods(vec!["GET"]))
            .wrap(prometheus.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_server)
            .default_service(web::route().to(default_404))
    })
    .bind(&bind)
    .map_err(Error::Io)?
    .workers(nb_threads)
    .run()
    .map_err(Error::Io)
}

