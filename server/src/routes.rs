use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use maud::{html, Markup, PreEscaped};
use tower_cookies::CookieManagerLayer;
use tracing::{info, warn};

use crate::{
    components::{
        form::AutoSubmitForm,
        layout::{Card, Page},
        ui::{button::Button, heading::Heading},
    },
    cookies::CookieSessionStore,
    errors::{ServerResult, WithStatus as _},
    oauth::{
        token::{self, TokenResponse},
        Alerts, AuthorizationRequest, ClaimHints, Navigation, NavigationMode, OidcHelper,
    },
    state::AppState,
};

/// Identity methods offered on the login page, as `(acr method, label)`
pub const LOGIN_METHODS: &[(&str, &str)] = &[
    ("nbid", "Norwegian BankID"),
    ("sbid", "Swedish BankID"),
    ("ftn", "Finnish Trust Network"),
    ("idin", "iDIN"),
];

/// Query parameters forwarded to the provider as userinfo claim hints
pub const CLAIM_HINT_PARAMS: &[&str] = &["t", "mt"];

type PageHelper = OidcHelper<CookieSessionStore, Alerts>;

/// Build the application router
pub fn routes(app_state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", get(page))
        .route("/healthz", get(|| async { "ok" }))
        .layer(CookieManagerLayer::new())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

/// The single page: starts the flow, receives the callback, or shows the
/// login choices depending on its query string.
async fn page(
    State(state): State<AppState>,
    session: CookieSessionStore,
    OriginalUri(uri): OriginalUri,
) -> ServerResult<Response, StatusCode> {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let alerts = Alerts::default();
    let helper = OidcHelper::new(
        state.oidc.clone(),
        state.page_url(path_and_query),
        session,
        alerts.clone(),
    );

    if let Some(error) = helper.query_param("error") {
        let description = helper.query_param("error_description");
        return Ok(provider_error_page(&error, description).into_response());
    }

    if let Some(code) = helper.query_param("code").filter(|c| !c.is_empty()) {
        return Ok(complete_authorization(&helper, &alerts, &code).await);
    }

    if let Some(method) = helper.query_param("method").filter(|m| !m.is_empty()) {
        return start_authorization(&helper, &method);
    }

    Ok(login_page().into_response())
}

fn start_authorization(helper: &PageHelper, method: &str) -> ServerResult<Response, StatusCode> {
    let scope = helper
        .query_param("scope")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| helper.client().config().default_scope.clone());

    let claims = CLAIM_HINT_PARAMS
        .iter()
        .fold(ClaimHints::new(), |claims, name| match helper.query_param(name) {
            Some(value) => claims.with(name, &value),
            None => claims,
        });

    let mode = match helper.query_param("mode").as_deref() {
        Some("get") => NavigationMode::Redirect,
        Some("post") => NavigationMode::FormPost,
        _ => NavigationMode::Auto,
    };

    let request = AuthorizationRequest::new(&scope, method)
        .with_claims(claims)
        .with_mode(mode);
    let navigation = helper
        .initiate_authorization(&request)
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(match navigation {
        Navigation::Redirect(url) => Redirect::to(&url).into_response(),
        Navigation::FormPost { action, fields } => {
            let content = html! {
                (Heading::h2("Redirecting to your identity provider"))
                (AutoSubmitForm::new(&action, &fields))
            };
            Page::new("Signing in", Card::new(content)).into_response()
        }
    })
}

async fn complete_authorization(helper: &PageHelper, alerts: &Alerts, code: &str) -> Response {
    if !helper.returned_state_matches() {
        warn!(
            stored = helper.stored_state().is_some(),
            "Returned state does not match the stored state"
        );
    }

    let mut token: Option<TokenResponse> = None;
    helper
        .exchange_code_for_token(code, |response| token = Some(response), &[])
        .await;

    let Some(token) = token else {
        return alert_page(&alerts.messages()).into_response();
    };

    let mut userinfo: Option<String> = None;
    match token::access_token(&token) {
        Some(access_token) => {
            helper
                .fetch_user_info(access_token, |body| userinfo = Some(body))
                .await
        }
        None => warn!("Token response carried no access_token"),
    }

    info!(userinfo = userinfo.is_some(), "Authorization completed");

    profile_page(&token, userinfo.as_deref(), &alerts.messages()).into_response()
}

fn login_page() -> Page {
    let content = html! {
        (Heading::h1("Sign in"))
        p class="text-gray-600 mb-6" { "Choose how you want to identify yourself." }
        div class="space-y-3" {
            @for (method, label) in LOGIN_METHODS {
                (Button::primary(label)
                    .href(&format!("/?method={}", urlencoding::encode(method)))
                    .full_width(true))
            }
        }
    };

    Page::new("Sign in", Card::new(content))
}

fn profile_page(token: &TokenResponse, userinfo: Option<&str>, alerts: &[String]) -> Page {
    let token_json = serde_json::to_string_pretty(token).unwrap_or_else(|_| token.to_string());
    let userinfo = userinfo.map(pretty_json);

    let content = html! {
        (Heading::h1("Signed in"))
        (alert_markup(alerts))
        (Heading::h2("Token response"))
        pre class="bg-gray-100 rounded p-3 text-xs overflow-x-auto mb-6" { (token_json) }
        @if let Some(userinfo) = userinfo {
            (Heading::h2("User info"))
            pre class="bg-gray-100 rounded p-3 text-xs overflow-x-auto mb-6" { (userinfo) }
        }
        (Button::new("Start over").href("/"))
    };

    Page::new("Signed in", Card::new(content).with_max_width("max-w-2xl"))
}

fn alert_page(alerts: &[String]) -> Page {
    let content = html! {
        (Heading::h1("Sign-in failed"))
        (alert_markup(alerts))
        (Button::primary("Try again").href("/"))
    };

    Page::new("Sign-in failed", Card::new(content))
}

fn provider_error_page(error: &str, description: Option<String>) -> Page {
    warn!(error, description = description.as_deref(), "Identity provider returned an error");

    let content = html! {
        (Heading::h1("Authentication Error"))
        p class="text-red-600 font-medium mb-2" { (error) }
        p class="text-gray-600 italic mb-6" {
            (description.unwrap_or_else(|| "No error description provided".to_string()))
        }
        (Button::primary("Return to sign in").href("/"))
    };

    Page::new("Authentication Error", Card::new(content))
}

/// Inline list of alerts plus a browser `alert()` for the first one
fn alert_markup(alerts: &[String]) -> Markup {
    let script = alerts.first().map(|message| {
        let literal = serde_json::to_string(message)
            .unwrap_or_default()
            .replace("</", "<\\/");
        format!("alert({literal});")
    });

    html! {
        @for message in alerts {
            div class="bg-red-50 border border-red-200 text-red-700 rounded p-3 mb-4" role="alert" { (message) }
        }
        @if let Some(script) = script {
            script { (PreEscaped(script)) }
        }
    }
}

fn pretty_json(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}
