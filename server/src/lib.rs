//! Helper for running an OpenID Connect authorization-code flow against a
//! third-party identity provider.
//!
//! The [`oauth`] module holds the helper itself. The rest of the crate is the
//! small page server (and CLI) that drives it: one page URL both starts the
//! flow and receives the provider's callback.

pub mod components;
pub mod config;
pub mod cookies;
pub mod docs;
pub mod errors;
pub mod oauth;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub type Result<T, E = color_eyre::Report> = std::result::Result<T, E>;
