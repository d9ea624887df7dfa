//! In-memory OpenID Connect provider with the three endpoints the helper
//! talks to. Codes are single use; tokens live until the process exits.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

pub const DEFAULT_CLIENT_ID: &str = "fixture-client";
pub const DEFAULT_CLIENT_SECRET: &str = "fixture-secret";
pub const DEFAULT_SUBJECT: &str = "fixture-user";

#[derive(Clone, Debug)]
pub struct IdpConfig {
    pub client_id: String,
    pub client_secret: String,
    pub subject: String,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// What the user agreed to at the authorize endpoint
#[derive(Clone, Debug)]
struct Grant {
    redirect_uri: String,
    scope: String,
    acr_values: Option<String>,
    claims: Option<Value>,
}

#[derive(Clone)]
struct IdpState {
    config: Arc<IdpConfig>,
    counter: Arc<AtomicU64>,
    codes: Arc<Mutex<HashMap<String, Grant>>>,
    tokens: Arc<Mutex<HashMap<String, Grant>>>,
}

impl IdpState {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub fn router(config: IdpConfig) -> Router {
    let state = IdpState {
        config: Arc::new(config),
        counter: Arc::new(AtomicU64::new(0)),
        codes: Arc::default(),
        tokens: Arc::default(),
    };

    Router::new()
        .route("/oidc/authorize", get(authorize_get).post(authorize_post))
        .route("/oidc/token", axum::routing::post(token))
        .route("/oidc/userinfo", get(userinfo))
        .with_state(state)
}

#[derive(Deserialize, Debug)]
struct AuthorizeParams {
    response_type: String,
    client_id: String,
    redirect_uri: String,
    #[serde(default)]
    scope: String,
    state: Option<String>,
    acr_values: Option<String>,
    claims: Option<String>,
}

#[derive(Serialize)]
struct CallbackParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
}

async fn authorize_get(
    State(state): State<IdpState>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    authorize(state, params)
}

async fn authorize_post(
    State(state): State<IdpState>,
    Form(params): Form<AuthorizeParams>,
) -> Response {
    authorize(state, params)
}

/// Approve immediately and send the browser back with a code
fn authorize(state: IdpState, params: AuthorizeParams) -> Response {
    let callback = |query: CallbackParams| {
        let separator = if params.redirect_uri.contains('?') {
            '&'
        } else {
            '?'
        };
        let query = serde_urlencoded::to_string(query).unwrap_or_default();
        Redirect::to(&format!("{}{}{}", params.redirect_uri, separator, query)).into_response()
    };

    if params.client_id != state.config.client_id {
        warn!(client_id = %params.client_id, "IdP: unknown client");
        return callback(CallbackParams {
            code: None,
            error: Some("unauthorized_client"),
            error_description: Some("Unknown client_id"),
            state: params.state.as_deref(),
        });
    }

    if params.response_type != "code" {
        return callback(CallbackParams {
            code: None,
            error: Some("unsupported_response_type"),
            error_description: None,
            state: params.state.as_deref(),
        });
    }

    let claims = match params.claims.as_deref().map(serde_json::from_str::<Value>) {
        Some(Ok(claims)) => Some(claims),
        Some(Err(_)) => {
            return callback(CallbackParams {
                code: None,
                error: Some("invalid_request"),
                error_description: Some("claims is not valid JSON"),
                state: params.state.as_deref(),
            })
        }
        None => None,
    };

    let code = state.next_id("code");
    info!(%code, acr = params.acr_values.as_deref(), "IdP: issuing authorization code");

    if let Ok(mut codes) = state.codes.lock() {
        codes.insert(
            code.clone(),
            Grant {
                redirect_uri: params.redirect_uri.clone(),
                scope: params.scope.clone(),
                acr_values: params.acr_values.clone(),
                claims,
            },
        );
    }

    callback(CallbackParams {
        code: Some(&code),
        error: None,
        error_description: None,
        state: params.state.as_deref(),
    })
}

#[derive(Deserialize, Debug)]
struct TokenParams {
    grant_type: String,
    code: String,
    redirect_uri: String,
}

fn oauth_error(status: StatusCode, error: &str, description: &str) -> Response {
    (
        status,
        Json(json!({ "error": error, "error_description": description })),
    )
        .into_response()
}

fn client_authenticated(headers: &HeaderMap, config: &IdpConfig) -> bool {
    let Some(encoded) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
    else {
        return false;
    };

    let Some(decoded) = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return false;
    };

    decoded == format!("{}:{}", config.client_id, config.client_secret)
}

async fn token(
    State(state): State<IdpState>,
    headers: HeaderMap,
    Form(params): Form<TokenParams>,
) -> Response {
    if !client_authenticated(&headers, &state.config) {
        return oauth_error(
            StatusCode::UNAUTHORIZED,
            "invalid_client",
            "Client authentication failed",
        );
    }

    if params.grant_type != "authorization_code" {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            "Only authorization_code is supported",
        );
    }

    let grant = state
        .codes
        .lock()
        .ok()
        .and_then(|mut codes| codes.remove(&params.code));

    let Some(grant) = grant else {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_grant",
            "Unknown or already used code",
        );
    };

    if grant.redirect_uri != params.redirect_uri {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_grant",
            "redirect_uri does not match the authorization request",
        );
    }

    let access_token = state.next_id("access");
    info!("IdP: issuing access token");

    let scope = grant.scope.clone();
    if let Ok(mut tokens) = state.tokens.lock() {
        tokens.insert(access_token.clone(), grant);
    }

    Json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 600,
        "scope": scope,
    }))
    .into_response()
}

async fn userinfo(State(state): State<IdpState>, headers: HeaderMap) -> Response {
    let grant = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| state.tokens.lock().ok()?.get(token).cloned());

    let Some(grant) = grant else {
        return oauth_error(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Missing or unknown access token",
        );
    };

    let mut body = Map::new();
    body.insert("sub".to_string(), json!(state.config.subject));
    if let Some(acr) = grant.acr_values {
        body.insert("acr".to_string(), json!(acr));
    }

    // Requested userinfo claims with a value are echoed back
    let requested = grant.claims.as_ref().and_then(|c| c.get("userinfo"));
    if let Some(Value::Object(requested)) = requested {
        for (name, request) in requested {
            if let Some(value) = request.get("value") {
                body.insert(name.clone(), value.clone());
            }
        }
    }

    Json(Value::Object(body)).into_response()
}
