//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout only carries the itinerary. Spans are also
//! exported over OTLP/HTTP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

const SERVICE_NAME: &str = "travel-planner";

/// Flushes exported spans when dropped
#[must_use]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to flush traces: {e}");
            }
        }
    }
}

/// Filter from `RUST_LOG`, else the configured level (`debug` when verbose)
fn build_filter(logging: &LoggingConfig, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { logging.level.as_str() };
        EnvFilter::new(level)
    })
}

fn build_tracer_provider() -> Result<Option<SdkTracerProvider>> {
    let endpoint_set = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .is_ok_and(|endpoint| !endpoint.trim().is_empty());
    if !endpoint_set {
        return Ok(None);
    }

    let exporter = SpanExporter::builder()
        .with_http()
        .build()
        .context("Failed to create OTLP span exporter")?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build();

    Ok(Some(provider))
}

/// Install the global subscriber
pub fn init(logging: &LoggingConfig, verbose: bool) -> Result<TelemetryGuard> {
    let filter = build_filter(logging, verbose);
    let provider = build_tracer_provider()?;
    let otel_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));

    let registry = tracing_subscriber::registry().with(filter).with(otel_layer);

    let installed = if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    installed.context("Failed to initialize logging")?;

    Ok(TelemetryGuard { provider })
}
