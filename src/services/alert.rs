use crate::{
    domain::{Alert, NewAlert},
    error::{AppError, AppResult},
    repository::Storage,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    alert: Alert,
}

/// Bounded in-process alert feed. Nothing here survives a restart.
#[derive(Clone)]
pub struct AlertFeed {
    entries: Arc<DashMap<Uuid, Entry>>,
    next_seq: Arc<AtomicU64>,
    /// Held across eviction and insert so the feed never exceeds `capacity`.
    publish_lock: Arc<Mutex<()>>,
    capacity: usize,
}

impl AlertFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            publish_lock: Arc::new(Mutex::new(())),
            capacity: capacity.max(1),
        }
    }

    pub fn publish(&self, new: NewAlert) -> Alert {
        let _guard = self.publish_lock.lock();
        while self.entries.len() >= self.capacity {
            if !self.evict_one() {
                break;
            }
        }

        let alert = Alert {
            id: Uuid::new_v4(),
            kind: new.kind,
            message: new.message,
            location: new.location,
            case_id: new.case_id,
            observed_at: new.observed_at,
            raised_by: new.raised_by,
            resolved: false,
            resolved_at: None,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            alert.id,
            Entry {
                seq,
                alert: alert.clone(),
            },
        );
        alert
    }

    /// Drop the oldest resolved alert, or the oldest alert when none is
    /// resolved yet.
    fn evict_one(&self) -> bool {
        let victim = self
            .entries
            .iter()
            .min_by_key(|e| (!e.alert.resolved, e.seq))
            .map(|e| *e.key());
        match victim {
            Some(id) => self.entries.remove(&id).is_some(),
            None => false,
        }
    }

    /// Every alert, most recently published first.
    pub fn list(&self) -> Vec<Alert> {
        let mut entries: Vec<Entry> = self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by_key(|e| Reverse(e.seq));
        entries.into_iter().map(|e| e.alert).collect()
    }

    /// Marks the alert resolved; resolving twice keeps the first timestamp.
    pub fn resolve(&self, id: Uuid) -> Option<Alert> {
        let mut entry = self.entries.get_mut(&id)?;
        if !entry.alert.resolved {
            entry.alert.resolved = true;
            entry.alert.resolved_at = Some(chrono::Utc::now().naive_utc());
        }
        Some(entry.alert.clone())
    }

    pub fn unresolved_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.alert.resolved).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The most recent alert (by observation time) that concerns `case_id`.
/// Ties go to the alert listed first.
pub fn correlate(alerts: &[Alert], case_id: i32) -> Option<&Alert> {
    alerts
        .iter()
        .filter(|a| a.case_id == Some(case_id))
        .min_by_key(|a| Reverse(a.observed_at))
}

/// All alerts for `case_id`, newest observation first.
pub fn alerts_for_case(alerts: &[Alert], case_id: i32) -> Vec<&Alert> {
    let mut matched: Vec<&Alert> = alerts
        .iter()
        .filter(|a| a.case_id == Some(case_id))
        .collect();
    matched.sort_by_key(|a| Reverse(a.observed_at));
    matched
}

pub struct AlertService {
    storage: Storage,
    feed: AlertFeed,
}

impl AlertService {
    pub fn new(storage: Storage, feed: AlertFeed) -> Self {
        Self { storage, feed }
    }

    async fn ensure_case_exists(&self, case_id: i32) -> AppResult<()> {
        match self.storage.reports.find(case_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!(
                "case_id {} does not refer to a report",
                case_id
            ))),
        }
    }

    pub async fn publish(&self, new: NewAlert) -> AppResult<Alert> {
        if let Some(case_id) = new.case_id {
            self.ensure_case_exists(case_id).await?;
        }
        let alert = self.feed.publish(new);
        tracing::info!(
            alert_id = %alert.id,
            kind = %alert.kind,
            case_id = ?alert.case_id,
            "alert published"
        );
        Ok(alert)
    }

    pub fn list(&self, case_id: Option<i32>, unresolved_only: bool) -> Vec<Alert> {
        self.feed
            .list()
            .into_iter()
            .filter(|a| case_id.map_or(true, |id| a.case_id == Some(id)))
            .filter(|a| !unresolved_only || !a.resolved)
            .collect()
    }

    pub fn resolve(&self, id: Uuid) -> AppResult<Alert> {
        self.feed.resolve(id).ok_or(AppError::NotFound)
    }

    /// Latest alert and full alert list for one report.
    pub async fn for_case(&self, case_id: i32) -> AppResult<(Option<Alert>, Vec<Alert>)> {
        if self.storage.reports.find(case_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        let alerts = self.feed.list();
        let latest = correlate(&alerts, case_id).cloned();
        let all = alerts_for_case(&alerts, case_id)
            .into_iter()
            .cloned()
            .collect();
        Ok((latest, all))
    }

    pub fn unresolved_count(&self) -> usize {
        self.feed.unresolved_count()
    }
}
