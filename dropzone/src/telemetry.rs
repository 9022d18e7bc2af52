//! Logging and tracing setup.
//!
//! Console logging through `tracing-subscriber` is always on, filtered by `RUST_LOG` (default
//! `info`). Span export over OTLP/HTTP is opt-in via `enable_otel_export` and is configured with
//! the standard OpenTelemetry environment variables:
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - collector URL (default `http://localhost:4318`)
//! - `OTEL_EXPORTER_OTLP_PROTOCOL` - `http/protobuf` or `http/json`
//! - `OTEL_EXPORTER_OTLP_HEADERS` - comma-separated `key=value` pairs, `%20` decodes to a space
//! - `OTEL_SERVICE_NAME` - defaults to `dropzone`
//!
//! If the exporter cannot be built the service still starts, with console logging only.

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{Protocol, WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::{SdkTracerProvider, Tracer};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_SERVICE_NAME: &str = "dropzone";
const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4318";

/// Kept so pending spans can be flushed on shutdown; `tracing-opentelemetry` only holds the tracer.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Install the global tracing subscriber.
pub fn init_telemetry(enable_otel_export: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if !enable_otel_export {
        registry.try_init()?;
        info!("Telemetry initialized (OTLP export disabled)");
        return Ok(());
    }

    match create_otlp_tracer() {
        Ok(tracer) => {
            registry.with(tracing_opentelemetry::layer().with_tracer(tracer)).try_init()?;
            info!("Telemetry initialized with OTLP export enabled");
        }
        Err(e) => {
            registry.try_init()?;
            info!("Telemetry initialized without OTLP export: {}", e);
        }
    }

    Ok(())
}

fn otlp_headers(raw: &str) -> HashMap<String, String> {
    raw.replace("%20", " ")
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn otlp_protocol(raw: Option<&str>) -> Protocol {
    match raw {
        Some("http/json") => Protocol::HttpJson,
        _ => Protocol::HttpBinary,
    }
}

fn create_otlp_tracer() -> anyhow::Result<Tracer> {
    let service_name = std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_else(|_| DEFAULT_OTLP_ENDPOINT.to_string());
    let headers = std::env::var("OTEL_EXPORTER_OTLP_HEADERS")
        .map(|raw| otlp_headers(&raw))
        .unwrap_or_default();
    let protocol = otlp_protocol(std::env::var("OTEL_EXPORTER_OTLP_PROTOCOL").ok().as_deref());

    // The subscriber is not installed yet, so this goes straight to stderr
    eprintln!(
        "[OTLP] service={} endpoint={} custom_headers={}",
        service_name,
        endpoint,
        headers.len()
    );

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(&endpoint)
        .with_protocol(protocol)
        .with_headers(headers)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder()
                .with_attribute(KeyValue::new("service.name", service_name.clone()))
                .build(),
        )
        .build();

    let tracer = provider.tracer(service_name);
    let _ = TRACER_PROVIDER.set(provider);

    Ok(tracer)
}

/// Flush and stop span export. A no-op when OTLP export was never enabled.
pub fn shutdown_telemetry() {
    if let Some(provider) = TRACER_PROVIDER.get()
        && let Err(e) = provider.shutdown()
    {
        tracing::error!("Failed to shutdown tracer provider: {}", e);
    }
}
