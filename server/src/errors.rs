use std::fmt::Debug;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{html, Render};

use crate::components::layout::Page;

#[derive(Debug)]
pub struct ServerError<R: IntoResponse>(pub(crate) color_eyre::Report, pub(crate) R);

pub type ServerResult<S, F = Response> = Result<S, ServerError<F>>;

impl<R: IntoResponse> IntoResponse for ServerError<R> {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "Request Error");

        let is_dev_mode = std::env::var("DEVELOPMENT_MODE")
            .map(|v| v == "1")
            .unwrap_or(false);

        let response = self.1.into_response();
        if !is_dev_mode || response.status() != StatusCode::INTERNAL_SERVER_ERROR {
            return response;
        }

        // maud escapes the report text
        let content = html! {
            div class="max-w-3xl mx-auto bg-gray-900 text-white rounded-lg p-6" {
                h1 class="text-red-400 text-2xl mb-4" { "Development Mode - Internal Server Error" }
                pre class="whitespace-pre-wrap break-words font-mono text-sm" { (format!("{:?}", self.0)) }
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Page::new("Development Error - 500", content).render(),
        )
            .into_response()
    }
}

impl<E> From<E> for ServerError<StatusCode>
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        ServerError(err.into(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub(crate) trait WithStatus<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError<StatusCode>>;
}

impl<T> WithStatus<T> for Result<T, color_eyre::Report> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError<StatusCode>> {
        self.map_err(|err| ServerError(err, status))
    }
}
