use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub const AUTH_REJECTED_TOTAL: &str = "kiroku_admin_auth_rejected_total";
pub const REQUEST_FAILURES_TOTAL: &str = "kiroku_http_request_failures_total";
pub const REQUEST_DURATION_MS: &str = "kiroku_http_request_duration_ms";

pub(crate) fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            AUTH_REJECTED_TOTAL,
            Unit::Count,
            "Admin requests rejected before reaching a handler."
        );
        describe_counter!(
            REQUEST_FAILURES_TOTAL,
            Unit::Count,
            "Responses with a 4xx or 5xx status."
        );
        describe_histogram!(
            REQUEST_DURATION_MS,
            Unit::Milliseconds,
            "Request handling latency in milliseconds."
        );
    });
}
