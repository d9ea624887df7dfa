use color_eyre::eyre::WrapErr;
use opentelemetry::KeyValue;
use opentelemetry_sdk::{trace, Resource};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};
use tracing_tree::HierarchicalLayer;

const DEFAULT_FILTER: &str = "info,oidc_helper=debug,tower_http=debug";

/// Start Sentry when `SENTRY_DSN` is set. Keep the guard alive for the
/// lifetime of the process.
pub fn setup_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 1.0,
            ..Default::default()
        },
    )))
}

/// Install the global subscriber: env filter, tree-formatted output on
/// stderr, and an OTLP exporter when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn setup_tracing(service_name: &str) -> crate::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let tree = HierarchicalLayer::new(2)
        .with_writer(std::io::stderr)
        .with_targets(true)
        .with_bracketed_fields(true);

    let otel = match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(_) => {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(opentelemetry_otlp::new_exporter().http())
                .with_trace_config(trace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", service_name.to_string()),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)
                .wrap_err("Failed to install OpenTelemetry tracer")?;

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(otel)
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    Ok(())
}

/// Flush any spans still queued for export
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}
