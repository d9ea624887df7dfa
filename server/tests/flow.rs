use fixtures::idp::{self, IdpConfig};
use oidc_helper::{config::OidcConfig, oauth::OidcClient, routes::routes, state::AppState};
use reqwest::{header, redirect::Policy, StatusCode};

struct Running {
    page: String,
    browser: reqwest::Client,
}

/// Start the mock provider and the page server, wired to each other
async fn start() -> Running {
    let idp_addr = fixtures::spawn(idp::router(IdpConfig::default()))
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let page_addr = listener.local_addr().unwrap();

    let config = OidcConfig::default()
        .with_provider_base(&format!("http://{idp_addr}"))
        .with_credentials(idp::DEFAULT_CLIENT_ID, idp::DEFAULT_CLIENT_SECRET);
    let app = routes(AppState::new(
        OidcClient::new(config).unwrap(),
        &page_addr.to_string(),
    ));
    tokio::spawn(async move { axum::serve(listener, app).await });

    Running {
        page: format!("http://{page_addr}"),
        browser: reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap(),
    }
}

fn location(response: &reqwest::Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of the first `Set-Cookie` header
fn session_cookie(response: &reqwest::Response) -> String {
    let raw = response.headers()[header::SET_COOKIE].to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

impl Running {
    /// Start sign-in and follow the provider back to the page's callback URL
    async fn sign_in(&self, query: &str) -> (String, String) {
        let start = self
            .browser
            .get(format!("{}/?{query}", self.page))
            .send()
            .await
            .unwrap();
        assert_eq!(start.status(), StatusCode::SEE_OTHER);
        let cookie = session_cookie(&start);

        let approved = self.browser.get(location(&start)).send().await.unwrap();
        assert_eq!(approved.status(), StatusCode::SEE_OTHER);
        let callback = location(&approved);
        assert!(callback.starts_with(&format!("{}/?code=", self.page)));

        (callback, cookie)
    }

    async fn load(&self, url: &str, cookie: Option<&str>) -> String {
        let mut request = self.browser.get(url);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.text().await.unwrap()
    }
}

#[tokio::test]
async fn test_full_sign_in_shows_token_and_userinfo() {
    let app = start().await;

    let (callback, cookie) = app.sign_in("method=nbid&mode=get&t=abc").await;
    let body = app.load(&callback, Some(&cookie)).await;

    assert!(body.contains("Signed in"));
    assert!(body.contains("access-"));
    assert!(body.contains(idp::DEFAULT_SUBJECT));
    assert!(body.contains("urn:signicat:oidc:method:nbid"));
    assert!(body.contains("abc"));
    assert!(!body.contains("Whoops!"));
}

#[tokio::test]
async fn test_missing_session_state_does_not_block_sign_in() {
    let app = start().await;

    let (callback, _) = app.sign_in("method=sbid").await;
    let body = app.load(&callback, None).await;

    assert!(body.contains("Signed in"));
    assert!(body.contains(idp::DEFAULT_SUBJECT));
}

#[tokio::test]
async fn test_reused_code_shows_alert() {
    let app = start().await;

    let (callback, cookie) = app.sign_in("method=ftn").await;
    app.load(&callback, Some(&cookie)).await;
    let body = app.load(&callback, Some(&cookie)).await;

    assert!(body.contains("Sign-in failed"));
    assert!(body.contains("Whoops! Bad Request"));
    assert!(body.contains("invalid_grant"));
}
