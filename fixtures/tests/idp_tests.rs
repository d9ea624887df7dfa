use base64::{engine::general_purpose::STANDARD, Engine as _};
use fixtures::idp::{self, IdpConfig};
use serde_json::{json, Value};

async fn start_idp() -> String {
    let addr = fixtures::spawn(idp::router(IdpConfig::default()))
        .await
        .expect("Failed to start IdP fixture");
    format!("http://{addr}")
}

fn no_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn basic(id: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
}

fn query_value(location: &str, name: &str) -> Option<String> {
    let (_, query) = location.split_once('?')?;
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .ok()?
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

async fn authorize(base: &str, claims: Option<&str>) -> String {
    let mut query = vec![
        ("response_type", "code"),
        ("client_id", idp::DEFAULT_CLIENT_ID),
        ("redirect_uri", "http://localhost:3000/"),
        ("scope", "openid profile"),
        ("state", "s1"),
        ("acr_values", "urn:signicat:oidc:method:nbid"),
    ];
    if let Some(claims) = claims {
        query.push(("claims", claims));
    }

    let response = no_redirects()
        .get(format!("{base}/oidc/authorize"))
        .query(&query)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);

    response.headers()["location"].to_str().unwrap().to_string()
}

async fn exchange(base: &str, code: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/oidc/token"))
        .header(
            "authorization",
            basic(idp::DEFAULT_CLIENT_ID, idp::DEFAULT_CLIENT_SECRET),
        )
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", "http://localhost:3000/"),
        ])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_authorize_redirects_with_code_and_state() {
    let base = start_idp().await;

    let location = authorize(&base, None).await;

    assert!(location.starts_with("http://localhost:3000/?"));
    assert!(query_value(&location, "code").is_some());
    assert_eq!(query_value(&location, "state").as_deref(), Some("s1"));
}

#[tokio::test]
async fn test_authorize_rejects_unknown_client() {
    let base = start_idp().await;

    let response = no_redirects()
        .get(format!("{base}/oidc/authorize"))
        .query(&[
            ("response_type", "code"),
            ("client_id", "someone-else"),
            ("redirect_uri", "http://localhost:3000/"),
            ("state", "s1"),
        ])
        .send()
        .await
        .unwrap();

    let location = response.headers()["location"].to_str().unwrap();
    assert_eq!(
        query_value(location, "error").as_deref(),
        Some("unauthorized_client")
    );
    assert_eq!(query_value(location, "code"), None);
}

#[tokio::test]
async fn test_code_is_single_use() {
    let base = start_idp().await;
    let code = query_value(&authorize(&base, None).await, "code").unwrap();

    let first = exchange(&base, &code).await;
    assert_eq!(first.status(), reqwest::StatusCode::OK);
    let token: Value = first.json().await.unwrap();
    assert_eq!(token["token_type"], "Bearer");
    assert!(token["access_token"].is_string());

    let second = exchange(&base, &code).await;
    assert_eq!(second.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: Value = second.json().await.unwrap();
    assert_eq!(error["error"], "invalid_grant");
}

#[tokio::test]
async fn test_token_requires_client_authentication() {
    let base = start_idp().await;
    let code = query_value(&authorize(&base, None).await, "code").unwrap();

    let response = reqwest::Client::new()
        .post(format!("{base}/oidc/token"))
        .header("authorization", basic(idp::DEFAULT_CLIENT_ID, "wrong"))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", "http://localhost:3000/"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_userinfo_echoes_claim_values() {
    let base = start_idp().await;
    let claims = json!({"userinfo": {"t": {"value": "abc"}, "mt": {"value": "xyz"}}}).to_string();
    let code = query_value(&authorize(&base, Some(&claims)).await, "code").unwrap();

    let token: Value = exchange(&base, &code).await.json().await.unwrap();
    let access_token = token["access_token"].as_str().unwrap();

    let userinfo: Value = reqwest::Client::new()
        .get(format!("{base}/oidc/userinfo"))
        .bearer_auth(access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(userinfo["sub"], idp::DEFAULT_SUBJECT);
    assert_eq!(userinfo["acr"], "urn:signicat:oidc:method:nbid");
    assert_eq!(userinfo["t"], "abc");
    assert_eq!(userinfo["mt"], "xyz");
}

#[tokio::test]
async fn test_userinfo_rejects_unknown_token() {
    let base = start_idp().await;

    let response = reqwest::Client::new()
        .get(format!("{base}/oidc/userinfo"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}
