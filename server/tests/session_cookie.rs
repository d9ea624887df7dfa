use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use oidc_helper::{
    config::OidcConfig,
    cookies::CookieSessionStore,
    oauth::{extract_query_param, OidcClient, SessionStore, STATE_KEY},
    routes::routes,
    state::AppState,
};
use tower::ServiceExt as _;
use tower_cookies::CookieManagerLayer;

async fn write_state(session: CookieSessionStore) -> &'static str {
    session.set_item(STATE_KEY, "abc123");
    "stored"
}

async fn read_state(session: CookieSessionStore) -> String {
    session
        .get_item(STATE_KEY)
        .unwrap_or_else(|| "<none>".to_string())
}

/// The page router plus two routes that touch the session directly, sharing
/// one cookie key
fn app() -> Router {
    let config = OidcConfig::default().with_provider_base("https://idp.example.test");
    let state = AppState::new(OidcClient::new(config).unwrap(), "localhost:3000");

    let session_routes = Router::new()
        .route("/session/write", get(write_state))
        .route("/session/read", get(read_state))
        .layer(CookieManagerLayer::new())
        .with_state(state.clone());

    routes(state).merge(session_routes)
}

async fn send(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// `name=value` part of the `Set-Cookie` header
fn cookie_pair(response: &Response) -> String {
    let raw = response.headers()[header::SET_COOKIE].to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_written_value_reads_back_through_cookie() {
    let app = app();

    let written = send(&app, "/session/write", None).await;
    let cookie = cookie_pair(&written);
    assert!(cookie.starts_with("state="));
    assert_ne!(cookie, "state=abc123");

    let read = send(&app, "/session/read", Some(&cookie)).await;
    assert_eq!(body_text(read).await, "abc123");
}

#[tokio::test]
async fn test_missing_or_tampered_cookie_reads_nothing() {
    let app = app();

    let read = send(&app, "/session/read", None).await;
    assert_eq!(body_text(read).await, "<none>");

    let read = send(&app, "/session/read", Some("state=abc123")).await;
    assert_eq!(body_text(read).await, "<none>");
}

#[tokio::test]
async fn test_stored_state_matches_state_sent_to_provider() {
    let app = app();

    let start = send(&app, "/?method=nbid", None).await;
    assert_eq!(start.status(), StatusCode::SEE_OTHER);
    let location = start.headers()[header::LOCATION].to_str().unwrap();
    let sent = extract_query_param("state", location).unwrap();
    let cookie = cookie_pair(&start);

    let read = send(&app, "/session/read", Some(&cookie)).await;
    assert_eq!(body_text(read).await, sent);
}
