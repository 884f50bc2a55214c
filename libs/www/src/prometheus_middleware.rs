use actix_service::{Service, Transform};
use actix_web::{
    dev::{Body, BodySize, MessageBody, ResponseBody, ServiceRequest, ServiceResponse},
    http::{Method, StatusCode},
    web::Bytes,
    Error,
};
use futures::future::{ok, FutureResult};
use futures::{Async, Future, Poll};
use prometheus::{self, Encoder, TextEncoder};
use slog_scope::error;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::SystemTime;

/// Name of the handler serving `path`, used as the `handler` label.
/// Paths with a parameter are folded on their route.
pub fn handler_name(path: &str) -> &'static str {
    let path = path.trim_end_matches('/');
    let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
    match first {
        "" => "index",
        "id" if path == "/id" => "null_id",
        "id" => "place_id",
        "random" if path == "/random" => "random",
        "random" => "random_placetype",
        "sitemap.xml" | "sitemaps.xml" => "sitemap",
        "robots.txt" => "robots",
        "status" => "status",
        "metrics" => "metrics",
        "500" => "server_error",
        _ => "unknown",
    }
}

lazy_static::lazy_static! {
    static ref HTTP_COUNTER: prometheus::CounterVec = prometheus::register_counter_vec!(
        "places_http_requests_total",
        "Total number of HTTP requests made.",
        &["handler", "method", "status"]
    )
    .expect("cannot register places_http_requests_total");

    static ref HTTP_REQ_HISTOGRAM: prometheus::HistogramVec = prometheus::register_histogram_vec!(
        "places_http_request_duration_seconds",
        "The HTTP request latencies in seconds.",
        &["handler", "method"],
        prometheus::exponential_buckets(0.001, 1.5, 25).expect("invalid buckets")
    )
    .expect("cannot register places_http_request_duration_seconds");

    static ref HTTP_IN_FLIGHT: prometheus::Gauge = prometheus::register_gauge!(
        "places_http_requests_in_flight",
        "current number of http request being served"
    )
    .expect("cannot register places_http_requests_in_flight");
}

/// Middleware counting and timing the requests. It also serves the
/// metrics on `endpoint`.
#[derive(Clone)]
#[must_use = "must be set up as middleware for actix-web"]
pub struct PrometheusMetrics {
    pub(crate) endpoint: String,
}

impl PrometheusMetrics {
    pub fn new(endpoint: &str) -> Self {
        PrometheusMetrics {
            endpoint: endpoint.to_string(),
        }
    }

    fn metrics(&self) -> String {
        let mut buffer = vec![];
        if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
            error!("impossible to encode the metrics: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn matches(&self, path: &str, method: &Method) -> bool {
        self.endpoint == path && method == Method::GET
    }

    fn update_metrics(&self, handler: &str, method: &Method, status: StatusCode, clock: SystemTime) {
        let method = method.to_string();
        let status = status.as_u16().to_string();

        if let Ok(elapsed) = clock.elapsed() {
            let duration =
                (elapsed.as_secs() as f64) + f64::from(elapsed.subsec_nanos()) / 1_000_000_000_f64;
            HTTP_REQ_HISTOGRAM
                .with_label_values(&[handler, &method])
                .observe(duration);
        }

        HTTP_COUNTER
            .with_label_values(&[handler, &method, &status])
            .inc();

        HTTP_IN_FLIGHT.dec();
    }
}

impl<S, B> Transform<S> for PrometheusMetrics
where
    B: MessageBody,
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<StreamLog<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = PrometheusMetricsMiddleware<S>;
    type Future = FutureResult<Self::Transform, Self::InitError>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(PrometheusMetricsMiddleware {
            service,
            inner: Arc::new(self.clone()),
        })
    }
}

#[doc(hidden)]
pub struct PrometheusMetricsMiddleware<S> {
    service: S,
    inner: Arc<PrometheusMetrics>,
}

impl<S, B> Service for PrometheusMetricsMiddleware<S>
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<StreamLog<B>>;
    type Error = S::Error;
    type Future = MetricsResponse<S, B>;

    fn poll_ready(&mut self) -> Poll<(), Self::Error> {
        self.service.poll_ready()
    }

    fn call(&mut self, req: ServiceRequest) -> Self::Future {
        HTTP_IN_FLIGHT.inc();
        MetricsResponse {
            fut: self.service.call(req),
            clock: SystemTime::now(),
            inner: self.inner.clone(),
            _t: PhantomData,
        }
    }
}

#[doc(hidden)]
pub struct MetricsResponse<S, B>
where
    B: MessageBody,
    S: Service,
{
    fut: S::Future,
    clock: SystemTime,
    inner: Arc<PrometheusMetrics>,
    _t: PhantomData<(B,)>,
}

impl<S, B> Future for MetricsResponse<S, B>
where
    B: MessageBody,
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    type Item = ServiceResponse<StreamLog<B>>;
    type Error = Error;

    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        let res = match self.fut.poll() {
            Ok(Async::Ready(res)) => res,
            Ok(Async::NotReady) => return Ok(Async::NotReady),
            Err(e) => {
                // no body will ever be streamed for this request
                HTTP_IN_FLIGHT.dec();
                return Err(e);
            }
        };

        let req = res.request();
        let inner = self.inner.clone();
        let method = req.method().clone();
        let path = req.path().to_string();
        let handler = handler_name(&path);
        let clock = self.clock;

        Ok(Async::Ready(res.map_body(move |head, mut body| {
            // the metrics endpoint is answered here, no route is needed for it
            if inner.matches(&path, &method) {
                head.status = StatusCode::OK;
                body = ResponseBody::Other(Body::from_message(inner.metrics()));
            }
            ResponseBody::Body(StreamLog {
                body,
                clock,
                inner,
                status: head.status,
                handler,
                method,
            })
        })))
    }
}

#[doc(hidden)]
pub struct StreamLog<B> {
    body: ResponseBody<B>,
    clock: SystemTime,
    inner: Arc<PrometheusMetrics>,
    status: StatusCode,
    handler: &'static str,
    method: Method,
}

impl<B> Drop for StreamLog<B> {
    fn drop(&mut self) {
        // the request is only over once its body has been sent
        self.inner
            .update_metrics(self.handler, &self.method, self.status, self.clock);
    }
}

impl<B: MessageBody> MessageBody for StreamLog<B> {
    fn size(&self) -> BodySize {
        self.body.size()
    }

    fn poll_next(&mut self) -> Poll<Option<Bytes>, Error> {
        self.body.poll_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::ErrorForbidden;
    use actix_web::test::TestRequest;
    use futures::future::{err, FutureResult};

    /// A service rejecting every request
    struct Rejecting;

    impl Service for Rejecting {
        type Request = ServiceRequest;
        type Response = ServiceResponse<Body>;
        type Error = Error;
        type Future = FutureResult<Self::Response, Self::Error>;

        fn poll_ready(&mut self) -> Poll<(), Self::Error> {
            Ok(Async::Ready(()))
        }

        fn call(&mut self, _: ServiceRequest) -> Self::Future {
            err(ErrorForbidden("rejected"))
        }
    }

    #[test]
    fn rejected_requests_are_not_left_in_flight() {
        let mut srv = PrometheusMetrics::new("/metrics")
            .new_transform(Rejecting)
            .wait()
            .unwrap();
        let before = HTTP_IN_FLIGHT.get();
        for _ in 0..3 {
            let res = srv.call(TestRequest::with_uri("/id/1").to_srv_request()).wait();
            assert!(res.is_err());
        }
        assert_eq!(HTTP_IN_FLIGHT.get(), before);
    }

    #[test]
    fn handler_names() {
        assert_eq!(handler_name("/"), "index");
        assert_eq!(handler_name("/id"), "null_id");
        assert_eq!(handler_name("/id/"), "null_id");
        assert_eq!(handler_name("/id/85922583"), "place_id");
        assert_eq!(handler_name("/id/85922583/"), "place_id");
        assert_eq!(handler_name("/random/"), "random");
        assert_eq!(handler_name("/random/airport"), "random_placetype");
        assert_eq!(handler_name("/sitemaps.xml"), "sitemap");
        assert_eq!(handler_name("/robots.txt"), "robots");
        assert_eq!(handler_name("/metrics"), "metrics");
        assert_eq!(handler_name("/foo/bar"), "unknown");
    }
}
