use std::time::Duration;

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

use crate::{action::Action, telemetry::SERVICE_NAME};

/// Keeper instruments. Without an installed meter provider these are no-ops.
#[derive(Clone)]
pub struct Metrics {
    actions: Counter<u64>,
    pool_failures: Counter<u64>,
    report_failures: Counter<u64>,
    cycle_duration: Histogram<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        let meter = global::meter(SERVICE_NAME);

        Self {
            actions: meter
                .u64_counter("rebalancer.actions")
                .with_description("Actions determined for due pools")
                .build(),
            pool_failures: meter
                .u64_counter("rebalancer.pool_failures")
                .with_description("Pools whose processing failed")
                .build(),
            report_failures: meter
                .u64_counter("rebalancer.report_failures")
                .with_description("Transaction reports rejected by the backend")
                .build(),
            cycle_duration: meter
                .f64_histogram("rebalancer.cycle.duration")
                .with_unit("s")
                .build(),
        }
    }

    pub fn record_action(&self, action: Action) {
        self.actions.add(1, &[KeyValue::new("action", action.as_str())]);
    }

    pub fn record_pool_failure(&self) {
        self.pool_failures.add(1, &[]);
    }

    pub fn record_report_failure(&self) {
        self.report_failures.add(1, &[]);
    }

    pub fn record_cycle(&self, elapsed: Duration) {
        self.cycle_duration.record(elapsed.as_secs_f64(), &[]);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
