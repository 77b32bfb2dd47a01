//! Inventory metrics for Prometheus
//!
//! Tracks lookup traffic, upstream fetch outcomes, and cache occupancy.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Inventory lookup operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOperation {
    ContainerByName,
    Containers,
}

impl LookupOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOperation::ContainerByName => "ContainerByName",
            LookupOperation::Containers => "Containers",
        }
    }
}

/// How a lookup resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOutcome {
    Found,
    NotFound,
    Empty,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Found => "found",
            LookupOutcome::NotFound => "not_found",
            LookupOutcome::Empty => "empty",
        }
    }
}

/// Upstream collections fetched during a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Containers,
    Hosts,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Containers => "containers",
            Collection::Hosts => "hosts",
        }
    }
}

/// Per-operation metrics
#[derive(Debug, Default)]
struct OperationMetrics {
    /// Total lookups
    requests_total: AtomicU64,
    /// Lookups that returned a value
    requests_found: AtomicU64,
    /// Lookups that missed a populated repository
    requests_not_found: AtomicU64,
    /// Lookups refused because nothing is cached yet
    requests_empty: AtomicU64,
    /// Latency sum in microseconds
    latency_sum_us: AtomicU64,
    /// Latency histogram bucket counts (per bucket, accumulated at export)
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    latency_buckets: [AtomicU64; 11],
}

const LATENCY_BUCKET_BOUNDARIES_MS: [u64; 11] =
    [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

impl OperationMetrics {
    fn record(&self, outcome: LookupOutcome, latency_us: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        match outcome {
            LookupOutcome::Found => self.requests_found.fetch_add(1, Ordering::Relaxed),
            LookupOutcome::NotFound => self.requests_not_found.fetch_add(1, Ordering::Relaxed),
            LookupOutcome::Empty => self.requests_empty.fetch_add(1, Ordering::Relaxed),
        };

        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);

        // Update histogram buckets; counts accumulate at export time
        let latency_ms = latency_us / 1000;
        for (i, &boundary) in LATENCY_BUCKET_BOUNDARIES_MS.iter().enumerate() {
            if latency_ms <= boundary {
                self.latency_buckets[i].fetch_add(1, Ordering::Relaxed);
                break;
            }
        }
    }
}

/// Fetch outcome tracking key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FetchKey {
    collection: Collection,
    outcome: String,
}

/// Inventory metrics collector
#[derive(Debug)]
pub struct InventoryMetrics {
    /// Per-lookup-operation metrics
    operations: RwLock<HashMap<LookupOperation, OperationMetrics>>,
    /// Upstream fetch counters by collection and outcome
    fetches: RwLock<HashMap<FetchKey, AtomicU64>>,
    /// Completed refresh cycles
    refresh_cycles: AtomicU64,
    /// Containers held after the last committed refresh
    container_count: AtomicU64,
    /// Hosts held after the last committed refresh
    host_count: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl InventoryMetrics {
    /// Create a new inventory metrics collector
    pub fn new() -> Self {
        Self {
            operations: RwLock::new(HashMap::new()),
            fetches: RwLock::new(HashMap::new()),
            refresh_cycles: AtomicU64::new(0),
            container_count: AtomicU64::new(0),
            host_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a lookup operation
    pub fn record_lookup(&self, op: LookupOperation, outcome: LookupOutcome, latency_us: u64) {
        let mut ops = self.operations.write().unwrap();
        let metrics = ops.entry(op).or_default();
        metrics.record(outcome, latency_us);
    }

    /// Record an upstream fetch outcome
    pub fn record_fetch(&self, collection: Collection, outcome: &str) {
        let key = FetchKey {
            collection,
            outcome: outcome.to_string(),
        };
        let mut fetches = self.fetches.write().unwrap();
        fetches
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed refresh cycle
    pub fn record_refresh_cycle(&self) {
        self.refresh_cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Update the cached container count
    pub fn set_container_count(&self, count: u64) {
        self.container_count.store(count, Ordering::Relaxed);
    }

    /// Update the cached host count
    pub fn set_host_count(&self, count: u64) {
        self.host_count.store(count, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::with_capacity(4 * 1024);

        // Gateway uptime
        let uptime_secs = self.start_time.elapsed().as_secs();
        writeln!(
            output,
            "# HELP muster_gateway_uptime_seconds Gateway uptime in seconds"
        )
        .unwrap();
        writeln!(output, "# TYPE muster_gateway_uptime_seconds counter").unwrap();
        writeln!(output, "muster_gateway_uptime_seconds {}", uptime_secs).unwrap();

        // Cache occupancy
        writeln!(
            output,
            "# HELP muster_inventory_containers Containers held in the cache"
        )
        .unwrap();
        writeln!(output, "# TYPE muster_inventory_containers gauge").unwrap();
        writeln!(
            output,
            "muster_inventory_containers {}",
            self.container_count.load(Ordering::Relaxed)
        )
        .unwrap();

        writeln!(
            output,
            "# HELP muster_inventory_hosts Hosts held in the cache"
        )
        .unwrap();
        writeln!(output, "# TYPE muster_inventory_hosts gauge").unwrap();
        writeln!(
            output,
            "muster_inventory_hosts {}",
            self.host_count.load(Ordering::Relaxed)
        )
        .unwrap();

        // Refresh cycles
        writeln!(
            output,
            "# HELP muster_metadata_refresh_cycles_total Completed metadata refresh cycles"
        )
        .unwrap();
        writeln!(output, "# TYPE muster_metadata_refresh_cycles_total counter").unwrap();
        writeln!(
            output,
            "muster_metadata_refresh_cycles_total {}",
            self.refresh_cycles.load(Ordering::Relaxed)
        )
        .unwrap();

        // Fetch outcomes
        let fetches = self.fetches.read().unwrap();
        if !fetches.is_empty() {
            writeln!(
                output,
                "# HELP muster_metadata_fetches_total Upstream fetches by collection and outcome"
            )
            .unwrap();
            writeln!(output, "# TYPE muster_metadata_fetches_total counter").unwrap();
            for (key, count) in fetches.iter() {
                writeln!(
                    output,
                    "muster_metadata_fetches_total{{collection=\"{}\",outcome=\"{}\"}} {}",
                    key.collection.as_str(),
                    key.outcome,
                    count.load(Ordering::Relaxed)
                )
                .unwrap();
            }
        }

        // Lookup metrics
        let ops = self.operations.read().unwrap();

        writeln!(
            output,
            "# HELP muster_inventory_requests_total Inventory lookups by operation and outcome"
        )
        .unwrap();
        writeln!(output, "# TYPE muster_inventory_requests_total counter").unwrap();
        for (op, metrics) in ops.iter() {
            let op_name = op.as_str();
            let found = metrics.requests_found.load(Ordering::Relaxed);
            let not_found = metrics.requests_not_found.load(Ordering::Relaxed);
            let empty = metrics.requests_empty.load(Ordering::Relaxed);

            writeln!(
                output,
                "muster_inventory_requests_total{{operation=\"{}\",outcome=\"found\"}} {}",
                op_name, found
            )
            .unwrap();
            writeln!(
                output,
                "muster_inventory_requests_total{{operation=\"{}\",outcome=\"not_found\"}} {}",
                op_name, not_found
            )
            .unwrap();
            writeln!(
                output,
                "muster_inventory_requests_total{{operation=\"{}\",outcome=\"empty\"}} {}",
                op_name, empty
            )
            .unwrap();
        }

        // Latency histogram
        writeln!(
            output,
            "# HELP muster_inventory_request_duration_seconds Inventory lookup duration histogram"
        )
        .unwrap();
        writeln!(
            output,
            "# TYPE muster_inventory_request_duration_seconds histogram"
        )
        .unwrap();
        for (op, metrics) in ops.iter() {
            let op_name = op.as_str();
            let total = metrics.requests_total.load(Ordering::Relaxed);
            let sum_us = metrics.latency_sum_us.load(Ordering::Relaxed);

            // Buckets
            let mut cumulative = 0u64;
            for (i, &boundary_ms) in LATENCY_BUCKET_BOUNDARIES_MS.iter().enumerate() {
                cumulative += metrics.latency_buckets[i].load(Ordering::Relaxed);
                writeln!(
                    output,
                    "muster_inventory_request_duration_seconds_bucket{{operation=\"{}\",le=\"{}\"}} {}",
                    op_name,
                    boundary_ms as f64 / 1000.0,
                    cumulative
                )
                .unwrap();
            }
            writeln!(
                output,
                "muster_inventory_request_duration_seconds_bucket{{operation=\"{}\",le=\"+Inf\"}} {}",
                op_name, total
            )
            .unwrap();
            writeln!(
                output,
                "muster_inventory_request_duration_seconds_sum{{operation=\"{}\"}} {}",
                op_name,
                sum_us as f64 / 1_000_000.0
            )
            .unwrap();
            writeln!(
                output,
                "muster_inventory_request_duration_seconds_count{{operation=\"{}\"}} {}",
                op_name, total
            )
            .unwrap();
        }

        output
    }
}

impl Default for InventoryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Global inventory metrics instance
static INVENTORY_METRICS: std::sync::OnceLock<InventoryMetrics> = std::sync::OnceLock::new();

/// Get the global inventory metrics instance
pub fn inventory_metrics() -> &'static InventoryMetrics {
    INVENTORY_METRICS.get_or_init(InventoryMetrics::new)
}

/// RAII guard for timing a lookup
pub struct LookupTimer {
    op: LookupOperation,
    start: Instant,
}

impl LookupTimer {
    /// Start timing a lookup
    pub fn new(op: LookupOperation) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }

    /// Complete the lookup with its outcome
    pub fn complete(self, outcome: LookupOutcome) {
        let latency_us = self.start.elapsed().as_micros() as u64;
        inventory_metrics().record_lookup(self.op, outcome, latency_us);
    }
}
