//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Orders ---
    pub orders_created: AtomicU64,
    pub orders_rejected: AtomicU64,
    pub proposals: AtomicU64,
    pub acceptances: AtomicU64,
    pub deliveries_scheduled: AtomicU64,
    pub pickups_scheduled: AtomicU64,

    // --- Lookups ---
    pub address_searches: AtomicU64,
    pub negotiation_views: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            orders_created: AtomicU64::new(0),
            orders_rejected: AtomicU64::new(0),
            proposals: AtomicU64::new(0),
            acceptances: AtomicU64::new(0),
            deliveries_scheduled: AtomicU64::new(0),
            pickups_scheduled: AtomicU64::new(0),
            address_searches: AtomicU64::new(0),
            negotiation_views: AtomicU64::new(0),
        }
    }

    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, open_orders: usize, requests: u64, uptime_secs: u64) -> String {
        let orders_created = self.orders_created.load(Ordering::Relaxed);
        let orders_rejected = self.orders_rejected.load(Ordering::Relaxed);
        let proposals = self.proposals.load(Ordering::Relaxed);
        let acceptances = self.acceptances.load(Ordering::Relaxed);
        let deliveries = self.deliveries_scheduled.load(Ordering::Relaxed);
        let pickups = self.pickups_scheduled.load(Ordering::Relaxed);
        let searches = self.address_searches.load(Ordering::Relaxed);
        let views = self.negotiation_views.load(Ordering::Relaxed);

        format!(
            "\
# HELP reprise_orders_created_total Reprise orders created.\n\
# TYPE reprise_orders_created_total counter\n\
reprise_orders_created_total {orders_created}\n\
# HELP reprise_orders_rejected_total Order creations rejected by validation.\n\
# TYPE reprise_orders_rejected_total counter\n\
reprise_orders_rejected_total {orders_rejected}\n\
# HELP reprise_proposals_total Balance counter-proposals.\n\
# TYPE reprise_proposals_total counter\n\
reprise_proposals_total {proposals}\n\
# HELP reprise_acceptances_total Balance proposals accepted.\n\
# TYPE reprise_acceptances_total counter\n\
reprise_acceptances_total {acceptances}\n\
# HELP reprise_deliveries_scheduled_total Orders shipped through a carrier.\n\
# TYPE reprise_deliveries_scheduled_total counter\n\
reprise_deliveries_scheduled_total {deliveries}\n\
# HELP reprise_pickups_scheduled_total Orders settled by in-person pickup.\n\
# TYPE reprise_pickups_scheduled_total counter\n\
reprise_pickups_scheduled_total {pickups}\n\
# HELP reprise_address_searches_total Address search requests.\n\
# TYPE reprise_address_searches_total counter\n\
reprise_address_searches_total {searches}\n\
# HELP reprise_negotiation_views_total Negotiation view fetches.\n\
# TYPE reprise_negotiation_views_total counter\n\
reprise_negotiation_views_total {views}\n\
# HELP reprise_open_orders Orders still pending or accepted.\n\
# TYPE reprise_open_orders gauge\n\
reprise_open_orders {open_orders}\n\
# HELP reprise_http_requests_total HTTP requests served.\n\
# TYPE reprise_http_requests_total counter\n\
reprise_http_requests_total {requests}\n\
# HELP reprise_uptime_seconds Seconds since start.\n\
# TYPE reprise_uptime_seconds gauge\n\
reprise_uptime_seconds {uptime_secs}\n"
        )
    }
}
