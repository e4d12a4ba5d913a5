use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request counter keyed by client address.
///
/// Clients whose window has fully expired are forgotten, so the table only
/// holds addresses seen within the last window.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    table: Arc<Mutex<HitTable>>,
    window: Duration,
    max_requests: usize,
}

#[derive(Debug)]
struct HitTable {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            table: Arc::new(Mutex::new(HitTable {
                hits: HashMap::new(),
                last_sweep: None,
            })),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    fn allow_at(&self, client: &str, now: Instant) -> bool {
        let mut table = self.table.lock();

        let sweep_due = table
            .last_sweep
            .map_or(true, |at| now.saturating_duration_since(at) >= self.window);
        if sweep_due {
            let window = self.window;
            table.hits.retain(|_, hits| {
                drop_expired(hits, now, window);
                !hits.is_empty()
            });
            table.last_sweep = Some(now);
        }

        let hits = table.hits.entry(client.to_string()).or_default();
        drop_expired(hits, now, self.window);
        if hits.len() >= self.max_requests {
            return false;
        }

        hits.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.table.lock().hits.len()
    }
}

fn drop_expired(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while hits
        .front()
        .is_some_and(|first| now.saturating_duration_since(*first) > window)
    {
        hits.pop_front();
    }
}
