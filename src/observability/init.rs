//! Subscriber installation.

use super::exporter;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const SERVICE_NAME: &str = "state-containers";

/// Installs the global tracing subscriber.
///
/// With [`Config::trace_file`] set, spans are exported to that file as OTLP
/// JSON lines. Otherwise events are formatted to stderr. If the trace file's
/// directory cannot be created, stderr is used instead.
///
/// Idempotent: only the first call in a process installs a subscriber.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL))
    });

    let otel_layer = config.trace_file.as_ref().and_then(|path| {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).ok()?;
        }
        let resource = Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)]);
        let provider = exporter::create_tracer_provider(path.clone(), resource);
        Some(OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME)))
    });

    let fmt_layer = otel_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        let config = Config {
            trace_level: Some("warn".to_string()),
            ..Config::default()
        };
        init_tracing(&config);
        init_tracing(&config);
        tracing::warn!("still running");
    }
}
