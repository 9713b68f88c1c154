//! Scripted source loaders.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use synoptic::source::SourceLoader;
use synoptic::time_index::forecast_request;
use synoptic::{BoundingBox, Panels, Quantity, Result, ScatteredField, SynopticError};

use super::test_data::{full_coverage, snapshot, sparse_field};

type Key = (DateTime<Utc>, u32);

/// Serves synthetic snapshots, with per-request failures on demand.
pub struct ScriptedLoader {
    coverage: BoundingBox,
    failing: HashSet<Key>,
    sparse: HashMap<Key, Quantity>,
    delays: HashMap<Key, Duration>,
    calls: AtomicUsize,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self {
            coverage: full_coverage(),
            failing: HashSet::new(),
            sparse: HashMap::new(),
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Only provide samples inside `coverage`.
    pub fn with_coverage(mut self, coverage: BoundingBox) -> Self {
        self.coverage = coverage;
        self
    }

    /// Fail the fetch for these anchor-relative offsets.
    pub fn failing(mut self, anchor: DateTime<Utc>, offsets: &[i32]) -> Self {
        for &offset in offsets {
            self.failing.insert(key(anchor, offset));
        }
        self
    }

    /// Return too few samples for `quantity` at this offset.
    pub fn sparse(mut self, anchor: DateTime<Utc>, offset: i32, quantity: Quantity) -> Self {
        self.sparse.insert(key(anchor, offset), quantity);
        self
    }

    /// Sleep before answering this offset.
    pub fn delayed(mut self, anchor: DateTime<Utc>, offset: i32, delay: Duration) -> Self {
        self.delays.insert(key(anchor, offset), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn key(anchor: DateTime<Utc>, offset: i32) -> Key {
    let request = forecast_request(anchor, offset);
    (request.issue_time, request.lead_hours)
}

/// Hours since an arbitrary epoch, so each valid time gets distinct values.
pub fn snapshot_hours(issue_time: DateTime<Utc>, lead_hours: u32) -> f64 {
    (issue_time.timestamp() / 3600 % 1000) as f64 + lead_hours as f64
}

impl SourceLoader for ScriptedLoader {
    fn fetch(&self, issue_time: DateTime<Utc>, lead_hours: u32) -> Result<Panels<ScatteredField>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (issue_time, lead_hours);

        if let Some(delay) = self.delays.get(&key) {
            std::thread::sleep(*delay);
        }
        if self.failing.contains(&key) {
            return Err(SynopticError::Fetch {
                message: format!("no file for {} f{:03}", issue_time, lead_hours),
            });
        }

        let mut fields = snapshot(&self.coverage, snapshot_hours(issue_time, lead_hours));
        if let Some(&quantity) = self.sparse.get(&key) {
            *fields.get_mut(quantity) = sparse_field(quantity);
        }
        Ok(fields)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
