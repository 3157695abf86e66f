use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::metric_names::{
    METRIC_COALESCED_TOTAL, METRIC_LOCK_POISONED_TOTAL, METRIC_POINT_EVICT_TOTAL,
    METRIC_POINT_HIT_TOTAL, METRIC_POINT_MISS_TOTAL, METRIC_QUERY_EVICT_TOTAL,
    METRIC_QUERY_EXPIRED_TOTAL, METRIC_QUERY_HIT_TOTAL, METRIC_QUERY_MISS_TOTAL,
    METRIC_STORE_FETCH_MS,
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
        .map_err(|err| InfraError::subscriber(err.to_string()))
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_POINT_HIT_TOTAL,
            Unit::Count,
            "Total number of point cache hits, including remembered misses."
        );
        describe_counter!(
            METRIC_POINT_MISS_TOTAL,
            Unit::Count,
            "Total number of point cache misses."
        );
        describe_counter!(
            METRIC_POINT_EVICT_TOTAL,
            Unit::Count,
            "Total number of point cache evictions due to capacity."
        );
        describe_counter!(
            METRIC_QUERY_HIT_TOTAL,
            Unit::Count,
            "Total number of query cache hits."
        );
        describe_counter!(
            METRIC_QUERY_MISS_TOTAL,
            Unit::Count,
            "Total number of query cache misses."
        );
        describe_counter!(
            METRIC_QUERY_EXPIRED_TOTAL,
            Unit::Count,
            "Total number of query cache entries dropped after their TTL."
        );
        describe_counter!(
            METRIC_QUERY_EVICT_TOTAL,
            Unit::Count,
            "Total number of query cache evictions due to capacity."
        );
        describe_counter!(
            METRIC_COALESCED_TOTAL,
            Unit::Count,
            "Total number of lookups that joined an in-flight backend fetch."
        );
        describe_counter!(
            METRIC_LOCK_POISONED_TOTAL,
            Unit::Count,
            "Total number of poisoned cache locks recovered."
        );
        describe_histogram!(
            METRIC_STORE_FETCH_MS,
            Unit::Milliseconds,
            "Backend fetch latency in milliseconds."
        );
    });
}
