//! Subscriber wiring for the gateway process.
//!
//! Request-level spans are the job of the api trace middleware and the
//! analytics sink; what is installed here covers process-level structured
//! logs (startup, gate rejections, webhook outcomes, the analytics export
//! stream) and can optionally bridge them to an OpenTelemetry exporter.

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Service name attached to the OTel resource and tracer.
const SERVICE_NAME: &str = "skillgate";

/// Filter applied when `RUST_LOG` is unset: dependencies at info, the
/// gateway crates at debug, and the analytics export stream kept visible.
const DEFAULT_FILTER: &str =
    "info,skillgate=debug,skillgate_api=debug,skillgate_core=debug,skillgate_infra=debug";

/// Held so buffered spans can be flushed on shutdown.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Always installs a structured `fmt` layer with the gateway default
/// filter. With `enable_otel`, process logs are additionally bridged to
/// an OpenTelemetry stdout exporter tagged with the gateway's service
/// resource; swap the exporter for OTLP when pointing at a collector.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer(SERVICE_NAME);

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Flush buffered spans and shut the tracer provider down. Safe to call
/// when OTel was never enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = %err, "tracer provider shutdown failed");
        }
    }
}
