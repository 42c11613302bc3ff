//! Tracing subscriber setup and optional OpenTelemetry export.
//!
//! Console output is always on. When `OTEL_EXPORTER_OTLP_ENDPOINT` is set,
//! spans, log events and metrics are also exported over OTLP/HTTP; the
//! exporters read their endpoint and headers from the standard `OTEL_*`
//! environment variables.

use std::{env, str::FromStr};

use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter};
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const SERVICE_NAME: &str = "pool-rebalancer";

const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Unknown log format: {}", other)),
        }
    }
}

/// Keeps the OpenTelemetry providers alive; call [`Telemetry::shutdown`]
/// before exit so buffered data is flushed.
#[derive(Default)]
pub struct Telemetry {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl Telemetry {
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shut down tracer provider: {}", e);
        }
        if let Some(provider) = self.logger_provider
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shut down logger provider: {}", e);
        }
        if let Some(provider) = self.meter_provider
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shut down meter provider: {}", e);
        }
    }
}

pub fn init(format: LogFormat) -> anyhow::Result<Telemetry> {
    let telemetry = if env::var_os(OTLP_ENDPOINT_VAR).is_some() {
        otlp_providers()?
    } else {
        Telemetry::default()
    };

    let fmt_layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(true).boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
    };

    let otel_trace_layer = telemetry
        .tracer_provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));
    let otel_log_layer = telemetry
        .logger_provider
        .as_ref()
        .map(|provider| OpenTelemetryTracingBridge::new(provider));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .try_init()?;

    Ok(telemetry)
}

fn otlp_providers() -> anyhow::Result<Telemetry> {
    let resource = Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attribute(KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")))
        .build();

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(SpanExporter::builder().with_http().build()?)
        .build();
    global::set_tracer_provider(tracer_provider.clone());

    let logger_provider = SdkLoggerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(LogExporter::builder().with_http().build()?)
        .build();

    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_periodic_exporter(MetricExporter::builder().with_http().build()?)
        .build();
    global::set_meter_provider(meter_provider.clone());

    Ok(Telemetry {
        tracer_provider: Some(tracer_provider),
        logger_provider: Some(logger_provider),
        meter_provider: Some(meter_provider),
    })
}

/// Log panics through `tracing` so they reach the same sinks as everything
/// else. The process keeps running; the scheduler contains the panic.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(%location, panic = %payload, "Uncaught panic");
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
