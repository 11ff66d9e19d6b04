use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::domain::status::OrderStatus;

const SERVICE_NAME: &str = "order-service";
const MAX_SAMPLES: usize = 1000;
const MIN_P95_SAMPLES: usize = 20;

#[derive(Debug, Default)]
struct MetricsState {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    total_latency_ms: u64,
    request_latencies: VecDeque<u64>,
    database_latencies: VecDeque<u64>,
    kafka_latencies: VecDeque<u64>,
    orders_created: u64,
    status_counts: [u64; 6],
    stock_restored: u64,
    cache_hits: u64,
    cache_misses: u64,
}

fn push_sample(buffer: &mut VecDeque<u64>, sample: u64) {
    buffer.push_back(sample);
    if buffer.len() > MAX_SAMPLES {
        buffer.pop_front();
    }
}

fn mean(buffer: &VecDeque<u64>) -> f64 {
    if buffer.is_empty() {
        return 0.0;
    }
    buffer.iter().sum::<u64>() as f64 / buffer.len() as f64
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn status_index(status: OrderStatus) -> usize {
    OrderStatus::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or_default()
}

impl MetricsState {
    fn average_latency(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.total_latency_ms as f64 / self.total_requests as f64
    }

    fn error_rate(&self) -> f64 {
        percent(self.failed_requests, self.total_requests)
    }

    fn cache_hit_rate(&self) -> f64 {
        percent(self.cache_hits, self.cache_hits + self.cache_misses)
    }

    // Nearest-rank index over the rolling buffer in arrival order. The buffer
    // is not sorted, so this is the sample at that position rather than a
    // true percentile.
    fn p95_latency(&self) -> u64 {
        let len = self.request_latencies.len();
        if len < MIN_P95_SAMPLES {
            return 0;
        }
        self.request_latencies[len * 95 / 100]
    }

    fn status_count(&self, status: OrderStatus) -> u64 {
        self.status_counts[status_index(status)]
    }
}

/// Counters and latency samples for the order service.
///
/// Every writer and reader takes the same lock, so each accessor sees a
/// consistent state. Two separate accessor calls may observe different
/// states.
#[derive(Debug)]
pub struct OrderMetrics {
    started_at: Instant,
    state: Mutex<MetricsState>,
}

impl Default for OrderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            state: Mutex::new(MetricsState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        // A panic while holding the lock cannot leave the counters invalid.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_request(&self, failed: bool, latency_ms: u64) {
        let mut state = self.lock();
        state.total_requests += 1;
        state.total_latency_ms += latency_ms;
        push_sample(&mut state.request_latencies, latency_ms);
        if failed {
            state.failed_requests += 1;
        } else {
            state.successful_requests += 1;
        }
    }

    pub fn record_database_latency(&self, latency_ms: u64) {
        push_sample(&mut self.lock().database_latencies, latency_ms);
    }

    pub fn record_kafka_latency(&self, latency_ms: u64) {
        push_sample(&mut self.lock().kafka_latencies, latency_ms);
    }

    pub fn record_order_created(&self) {
        self.lock().orders_created += 1;
    }

    /// Count an order entering `status`.
    pub fn record_status(&self, status: OrderStatus) {
        self.lock().status_counts[status_index(status)] += 1;
    }

    /// Count `items` line items whose stock was put back.
    pub fn record_stock_restored(&self, items: u64) {
        self.lock().stock_restored += items;
    }

    // No cache sits in front of the store yet, so only tests record hits and
    // misses and `cache_hit_rate_percent` reads 0 in production.
    pub fn record_cache_hit(&self) {
        self.lock().cache_hits += 1;
    }

    pub fn record_cache_miss(&self) {
        self.lock().cache_misses += 1;
    }

    pub fn total_requests(&self) -> u64 {
        self.lock().total_requests
    }

    pub fn failed_requests(&self) -> u64 {
        self.lock().failed_requests
    }

    pub fn orders_created(&self) -> u64 {
        self.lock().orders_created
    }

    pub fn status_count(&self, status: OrderStatus) -> u64 {
        self.lock().status_count(status)
    }

    pub fn stock_restored(&self) -> u64 {
        self.lock().stock_restored
    }

    pub fn average_latency(&self) -> f64 {
        self.lock().average_latency()
    }

    pub fn average_database_latency(&self) -> f64 {
        mean(&self.lock().database_latencies)
    }

    pub fn average_kafka_latency(&self) -> f64 {
        mean(&self.lock().kafka_latencies)
    }

    /// Failed requests as a percentage of all requests.
    pub fn error_rate(&self) -> f64 {
        self.lock().error_rate()
    }

    pub fn p95_latency(&self) -> u64 {
        self.lock().p95_latency()
    }

    pub fn cache_hit_rate(&self) -> f64 {
        self.lock().cache_hit_rate()
    }

    /// Flat name/value view for the reporting side, computed under one lock.
    pub fn snapshot(&self) -> Map<String, Value> {
        let state = self.lock();
        let uptime = self.started_at.elapsed().as_secs_f64();
        let request_rate = if uptime > 0.0 {
            state.total_requests as f64 / uptime
        } else {
            0.0
        };

        let mut snapshot = Map::new();
        snapshot.insert("service".into(), json!(SERVICE_NAME));
        snapshot.insert("uptime_seconds".into(), json!(uptime));
        snapshot.insert("total_requests".into(), json!(state.total_requests));
        snapshot.insert("successful_requests".into(), json!(state.successful_requests));
        snapshot.insert("failed_requests".into(), json!(state.failed_requests));
        snapshot.insert("error_rate_percent".into(), json!(state.error_rate()));
        snapshot.insert("request_rate_per_sec".into(), json!(request_rate));
        snapshot.insert("average_latency_ms".into(), json!(state.average_latency()));
        snapshot.insert("p95_latency_ms".into(), json!(state.p95_latency()));
        snapshot.insert(
            "database_avg_latency_ms".into(),
            json!(mean(&state.database_latencies)),
        );
        snapshot.insert(
            "kafka_avg_latency_ms".into(),
            json!(mean(&state.kafka_latencies)),
        );
        snapshot.insert("orders_created".into(), json!(state.orders_created));
        for status in OrderStatus::ALL {
            snapshot.insert(format!("orders_{status}"), json!(state.status_count(status)));
        }
        snapshot.insert(
            "orders_completed".into(),
            json!(state.status_count(OrderStatus::Delivered)),
        );
        snapshot.insert("stock_restored_count".into(), json!(state.stock_restored));
        snapshot.insert("cache_hit_rate_percent".into(), json!(state.cache_hit_rate()));
        snapshot.insert("cache_hits".into(), json!(state.cache_hits));
        snapshot.insert("cache_misses".into(), json!(state.cache_misses));
        snapshot.insert(
            "timestamp".into(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        snapshot
    }
}
