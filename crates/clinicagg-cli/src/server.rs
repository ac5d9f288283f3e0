//! HTTP search endpoint.
//!
//! `GET /?name=&state=&from=&to=` or `POST /` with a body shaped like a
//! result record. Every request refetches all providers.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use clinicagg_core::ClinicQuery;
use clinicagg_sync::{ClinicAggregator, FetchError};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const INVALID_REQUEST: &str = "Invalid request inputs passed";
const FETCH_FAILED: &str =
    "Something went wrong fetching request. Kindly try again or check network if error persists";
const INTERNAL_ERROR: &str = "Something went wrong";

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<ClinicAggregator>,
}

/// Build a query from query string pairs.
///
/// The first value of each key wins; `region` is an alias of `state`.
/// Missing keys are empty.
fn query_from_pairs(pairs: &[(String, String)]) -> ClinicQuery {
    let first = |keys: &[&str]| {
        pairs
            .iter()
            .find(|(k, _)| keys.contains(&k.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    ClinicQuery {
        name: first(&["name"]),
        region: first(&["state", "region"]),
        from: first(&["from"]),
        to: first(&["to"]),
    }
}

/// JSON request body, same shape as a result record. `null` reads as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchRequest {
    name: Option<String>,
    state: Option<String>,
    availability: Option<WindowRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WindowRequest {
    from: Option<String>,
    to: Option<String>,
}

impl From<SearchRequest> for ClinicQuery {
    fn from(r: SearchRequest) -> Self {
        let window = r.availability.unwrap_or_default();
        ClinicQuery {
            name: r.name.unwrap_or_default(),
            region: r.state.unwrap_or_default(),
            from: window.from.unwrap_or_default(),
            to: window.to.unwrap_or_default(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(search_get).post(search_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve searches until the process is stopped.
pub async fn serve(aggregator: ClinicAggregator, addr: SocketAddr) -> anyhow::Result<()> {
    let sources = aggregator.fetcher().sources().len();
    let app = router(AppState {
        aggregator: Arc::new(aggregator),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, sources, "clinic search listening");
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

async fn search_get(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    info!(method = "GET", "incoming request");
    match params {
        Ok(Query(pairs)) => respond(&state, query_from_pairs(&pairs)).await,
        Err(e) => {
            warn!(error = %e, "invalid search query string");
            status(StatusCode::BAD_REQUEST, INVALID_REQUEST)
        }
    }
}

async fn search_post(State(state): State<AppState>, body: Bytes) -> Response {
    info!(method = "POST", "incoming request");
    match serde_json::from_slice::<SearchRequest>(&body) {
        Ok(request) => respond(&state, request.into()).await,
        Err(e) => {
            warn!(error = %e, "invalid search request body");
            status(StatusCode::BAD_REQUEST, INVALID_REQUEST)
        }
    }
}

async fn respond(state: &AppState, query: ClinicQuery) -> Response {
    match state.aggregator.search_json(&query).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(FetchError::AllSourcesFailed) => {
            error!("every clinic source failed");
            status(StatusCode::BAD_GATEWAY, FETCH_FAILED)
        }
        Err(e) => {
            error!(error = %e, "clinic search failed");
            status(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}

fn status(code: StatusCode, message: &str) -> Response {
    (code, Json(serde_json::json!({ "status": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use clinicagg_sync::SourceFetcher;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    const DENTAL: &str =
        r#"[{"name":"A","stateName":"CA","availability":{"from":"9am","to":"5pm"}}]"#;
    const VET: &str =
        r#"[{"clinicName":"B","stateCode":"NY","opening":{"from":"8am","to":"4pm"}}]"#;

    async fn provider_server() -> SocketAddr {
        let app = Router::new()
            .route("/dental.json", get(|| async { DENTAL }))
            .route("/vet.json", get(|| async { VET }))
            .route("/broken.json", get(|| async { "not json" }))
            .route(
                "/down.json",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn app(paths: &[&str]) -> Router {
        let addr = provider_server().await;
        let sources = paths.iter().map(|p| format!("http://{addr}/{p}")).collect();
        let fetcher = SourceFetcher::new(sources, None).unwrap();
        router(AppState {
            aggregator: Arc::new(ClinicAggregator::new(fetcher)),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(request).await.unwrap();
        let code = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (code, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_filters_by_state() {
        let app = app(&["dental.json", "vet.json"]).await;
        let (code, body) = send(app, get_request("/?name=&state=CA")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(
            body,
            json!([{ "name": "A", "state": "CA", "availability": { "from": "9am", "to": "5pm" } }])
        );
    }

    #[tokio::test]
    async fn get_accepts_region_alias() {
        let app = app(&["dental.json", "vet.json"]).await;
        let (code, body) = send(app, get_request("/?region=NY")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body[0]["name"], "B");
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_without_parameters_returns_everything() {
        let app = app(&["dental.json", "vet.json"]).await;
        let (code, body) = send(app, get_request("/")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn post_filters_by_availability() {
        let app = app(&["dental.json", "vet.json"]).await;
        let (code, body) = send(
            app,
            post_request(r#"{"availability":{"from":"8am","to":""}}"#),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["state"], "NY");
    }

    #[tokio::test]
    async fn get_repeated_and_aliased_keys_use_first_value() {
        let app = app(&["dental.json", "vet.json"]).await;
        let (code, body) = send(app.clone(), get_request("/?state=CA&region=NY")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "A");

        let (code, body) = send(app.clone(), get_request("/?state=NY&state=CA")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body[0]["name"], "B");

        let (code, body) = send(app, get_request("/?region=CA&state=NY&name=A&name=B")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body[0]["name"], "A");
    }

    #[test]
    fn query_pairs_default_to_empty() {
        let pairs = vec![("from".to_string(), "9am".to_string())];
        assert_eq!(query_from_pairs(&pairs), ClinicQuery::new().with_from("9am"));
        assert_eq!(query_from_pairs(&[]), ClinicQuery::new());
    }

    #[tokio::test]
    async fn post_nulls_read_as_absent() {
        let app = app(&["dental.json", "vet.json"]).await;
        let (code, body) = send(app.clone(), post_request(r#"{"name":null,"state":"CA"}"#)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "A");

        let (code, body) = send(app.clone(), post_request(r#"{"availability":null}"#)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (code, body) = send(
            app,
            post_request(r#"{"state":null,"availability":{"from":null,"to":"4pm"}}"#),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body[0]["name"], "B");
    }

    #[tokio::test]
    async fn post_with_invalid_body_is_rejected() {
        let app = app(&["dental.json"]).await;
        let (code, body) = send(app, post_request("{not json")).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": INVALID_REQUEST }));
    }

    #[tokio::test]
    async fn no_matches_is_an_empty_array() {
        let app = app(&["dental.json", "vet.json"]).await;
        let (code, body) = send(app, get_request("/?name=Nobody")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn all_sources_down_is_distinguishable_from_no_matches() {
        let app = app(&["down.json", "missing.json"]).await;
        let (code, body) = send(app, get_request("/")).await;
        assert_eq!(code, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({ "status": FETCH_FAILED }));
    }

    #[tokio::test]
    async fn malformed_merge_is_an_empty_success() {
        let app = app(&["dental.json", "broken.json"]).await;
        let (code, body) = send(app, get_request("/")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
