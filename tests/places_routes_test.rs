use actix_web::http::StatusCode;
use serde_json::json;
use tools::{place_doc, FakeSearchBackend, PlacesHandler};

pub fn places_routes_tests(backend: &FakeSearchBackend) {
    let mut places = PlacesHandler::new(backend);

    entry_point_test(&mut places);
    status_test(&mut places, backend);
    place_id_test(&mut places, backend);
    unknown_place_id_test(&mut places, backend);
    ambiguous_place_id_test(&mut places, backend);
    invalid_id_test(&mut places);
    null_id_test(&mut places);
    random_test(&mut places, backend);
    random_without_places_test(&mut places, backend);
    random_placetype_test(&mut places);
    sitemap_test(&mut places);
    robots_test(&mut places);
    errors_test(&mut places, backend);
    metrics_test(&mut places);
}

fn entry_point_test(places: &mut PlacesHandler) {
    let json = places.get_json("/");
    assert_eq!(json, json!({"description": "places service"}));
}

fn status_test(places: &mut PlacesHandler, backend: &FakeSearchBackend) {
    let json = places.get_json("/status");
    assert_eq!(json["status"], "good");
    assert_eq!(
        json["search"],
        format!("{}:{} (whosonfirst)", backend.host(), backend.port())
    );
}

fn place_id_test(places: &mut PlacesHandler, backend: &FakeSearchBackend) {
    backend.reply_hits(vec![place_doc(101751119, "Montréal", "locality")]);

    let feature = places.get_json("/id/101751119");
    assert_eq!(
        feature,
        json!({
            "type": "Feature",
            "properties": {
                "wof:id": 101751119,
                "wof:name": "Montréal",
                "wof:placetype": "locality"
            },
            "geometry": {}
        })
    );

    let req = backend.requests().pop().expect("no search done");
    assert_eq!(req.path, "/whosonfirst/_search");
    assert_eq!(req.query_string, "_from=0&size=100");
    assert_eq!(req.body, json!({"query": {"ids": {"values": [101751119]}}}));

    // with a trailing slash
    let feature = places.get_json("/id/101751119/");
    assert_eq!(feature["properties"]["wof:name"], "Montréal");
}

fn unknown_place_id_test(places: &mut PlacesHandler, backend: &FakeSearchBackend) {
    backend.reply_hits(vec![]);
    let (status, json) = places.get_unchecked_json("/id/42");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["short"], "bad request");
}

fn ambiguous_place_id_test(places: &mut PlacesHandler, backend: &FakeSearchBackend) {
    backend.reply_hits(vec![
        place_doc(42, "Springfield", "locality"),
        place_doc(43, "Springfield", "locality"),
    ]);
    assert_eq!(places.get_status("/id/42"), StatusCode::BAD_REQUEST);
}

fn invalid_id_test(places: &mut PlacesHandler) {
    assert_eq!(places.get_status("/id/montreal"), StatusCode::NOT_FOUND);
    assert_eq!(places.get_status("/id/-1"), StatusCode::NOT_FOUND);
}

fn null_id_test(places: &mut PlacesHandler) {
    assert_eq!(
        places.get_redirect("/id"),
        (StatusCode::SEE_OTHER, "/".to_string())
    );
    assert_eq!(
        places.get_redirect("/id/"),
        (StatusCode::SEE_OTHER, "/".to_string())
    );
}

fn random_test(places: &mut PlacesHandler, backend: &FakeSearchBackend) {
    backend.reply_hits(vec![place_doc(85922583, "San Francisco", "locality")]);

    assert_eq!(
        places.get_redirect("/random"),
        (StatusCode::SEE_OTHER, "/id/85922583".to_string())
    );
    let req = backend.requests().pop().expect("no search done");
    assert_eq!(req.query_string, "_from=0&size=1");
    assert!(req
        .body
        .pointer("/query/function_score/functions/0/random_score/seed")
        .and_then(|s| s.as_u64())
        .is_some());

    assert_eq!(
        places.get_redirect("/random/"),
        (StatusCode::SEE_OTHER, "/id/85922583".to_string())
    );
}

fn random_without_places_test(places: &mut PlacesHandler, backend: &FakeSearchBackend) {
    backend.reply_hits(vec![]);
    assert_eq!(places.get_status("/random"), StatusCode::NOT_FOUND);
}

fn random_placetype_test(places: &mut PlacesHandler) {
    assert_eq!(places.get_status("/random/airport"), StatusCode::NOT_FOUND);
    assert_eq!(places.get_status("/random/locality/"), StatusCode::NOT_FOUND);
}

fn sitemap_test(places: &mut PlacesHandler) {
    for path in &["/sitemap.xml", "/sitemaps.xml"] {
        assert_eq!(
            places.get_redirect(path),
            (StatusCode::SEE_OTHER, "/sitemaps/index.xml".to_string())
        );
    }
}

fn robots_test(places: &mut PlacesHandler) {
    let (status, location, _) = places.raw_get("/robots.txt");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(location, None);
    let (_, text) = places.get_text("/robots.txt");
    assert!(text.starts_with("User-agent: *"));
    let (_, content_type) = places.get_content_type("/robots.txt");
    let content_type = content_type.expect("no content type for robots.txt");
    assert!(
        content_type.starts_with("text/plain"),
        "invalid content type: {}",
        content_type
    );
}

fn errors_test(places: &mut PlacesHandler, backend: &FakeSearchBackend) {
    let (status, json) = places.get_unchecked_json("/500");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["short"], "internal error");

    let (status, json) = places.get_unchecked_json("/nowhere/to/be/found");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["short"], "not found");

    // a backend answering garbage aborts the request
    backend.reply_raw("<html>bad gateway</html>");
    let (status, json) = places.get_unchecked_json("/id/1");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["short"], "query error");

    // as does a backend answering something that is not a search response
    backend.reply(json!({"error": "index_not_found_exception"}));
    assert_eq!(
        places.get_status("/id/1"),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    backend.reply_hits(vec![]);
}

fn metrics_test(places: &mut PlacesHandler) {
    let (status, text) = places.get_text("/metrics");
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("places_http_requests_total"));
}

pub fn unreachable_backend_test() {
    // nothing listens on the discard port
    let mut places = PlacesHandler::with_args(www::Args {
        search_host: Some("127.0.0.1".to_string()),
        search_port: Some(9),
        search_index: Some("whosonfirst".to_string()),
        nb_threads: Some(1),
        ..Default::default()
    });
    let (status, json) = places.get_unchecked_json("/id/1");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["short"], "query error");
}
