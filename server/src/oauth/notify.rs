use std::sync::{Arc, Mutex};

use reqwest::StatusCode;

/// The one way a back-channel call can fail: the HTTP request did not
/// produce a usable response.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// Text shown to the user, `"Whoops! <status text>: <detail>"`
    pub fn alert_text(&self) -> String {
        let (status_text, detail) = match self {
            RequestError::Transport { source, .. } => ("error".to_string(), source.to_string()),
            RequestError::Status { status, body, .. } => (
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_u16().to_string()),
                body.trim().to_string(),
            ),
            RequestError::Decode { source, .. } => ("parsererror".to_string(), source.to_string()),
        };

        format!("Whoops! {}: {}", status_text, detail)
    }
}

/// Where failed requests are reported. Nothing is handed back to the code
/// that started the request.
pub trait Notifier {
    fn alert(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn alert(&self, message: &str) {
        (**self).alert(message)
    }
}

/// Collects alerts so the page being rendered can show them
#[derive(Clone, Debug, Default)]
pub struct Alerts {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Alerts {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

impl Notifier for Alerts {
    fn alert(&self, message: &str) {
        tracing::error!(alert = message, "Request failed");
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

/// Reports alerts through the log; used by the CLI
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, message: &str) {
        tracing::error!("{}", message);
    }
}
