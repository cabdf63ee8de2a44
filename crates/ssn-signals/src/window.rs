//! Rolling signal window.
//!
//! Single writer, many readers. The window holds an `Arc<Vec<Signal>>` behind
//! a lock and replaces it wholesale on every mutation, so a reader that took a
//! snapshot keeps a consistent view for the whole call no matter what is
//! ingested meanwhile.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use ssn_config::SignalsConfig;
use ssn_schemas::{ActiveSignal, RawSignalItem, Signal};
use tracing::debug;

use crate::decay::{curve_from_config, DecayCurve};
use crate::normalizer::{normalize_signal, MalformedSignalError};

#[derive(Debug)]
pub struct SignalWindow {
    horizon: Duration,
    epsilon: f64,
    decay: Arc<dyn DecayCurve>,
    signals: RwLock<Arc<Vec<Signal>>>,
}

impl SignalWindow {
    /// Empty window using the decay curve named in `cfg`.
    pub fn new(cfg: &SignalsConfig) -> Self {
        Self::with_decay(cfg, curve_from_config(cfg))
    }

    /// Empty window with an explicit decay strategy.
    pub fn with_decay(cfg: &SignalsConfig, decay: Arc<dyn DecayCurve>) -> Self {
        Self {
            horizon: cfg.horizon,
            epsilon: cfg.epsilon,
            decay,
            signals: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Normalize and append a raw item.
    ///
    /// A second item with an already-held `source_id` is a no-op; the signal
    /// that is actually held is returned either way.
    pub fn ingest(&self, raw: &RawSignalItem) -> Result<Signal, MalformedSignalError> {
        let signal = normalize_signal(raw)?;
        Ok(self.insert(signal))
    }

    /// Append an already-normalized signal (deduplicated by `source_id`).
    pub fn insert(&self, signal: Signal) -> Signal {
        let mut guard = self.write();
        if let Some(existing) = guard.iter().find(|s| s.source_id == signal.source_id) {
            debug!(source_id = %signal.source_id, "signal already in window; keeping first copy");
            return existing.clone();
        }

        debug!(
            source_id = %signal.source_id,
            raw_severity = signal.raw_severity,
            published_at = %signal.published_at,
            "signal ingested"
        );
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(signal.clone());
        *guard = Arc::new(next);
        signal
    }

    /// Current contents, unscored. Cheap: clones the `Arc` only.
    pub fn snapshot(&self) -> Arc<Vec<Signal>> {
        Arc::clone(&self.read())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every signal older than the horizon at `now`. Returns how many were removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.write();
        self.evict_locked(&mut guard, now)
    }

    /// Signals whose effective severity at `now` exceeds epsilon, strongest first.
    ///
    /// Ties go to the most recent `published_at`, then `source_id`. Expired
    /// entries are evicted lazily when the write lock is free.
    pub fn active_signals(&self, now: DateTime<Utc>) -> Vec<ActiveSignal> {
        let snapshot = self.snapshot();

        let active: Vec<ActiveSignal> = snapshot
            .iter()
            .filter_map(|s| {
                let effective_severity = self.effective_severity(s, now);
                (effective_severity > self.epsilon).then(|| ActiveSignal {
                    signal: s.clone(),
                    effective_severity,
                })
            })
            .collect();

        if snapshot.iter().any(|s| self.is_expired(s, now)) {
            if let Ok(mut guard) = self.signals.try_write() {
                self.evict_locked(&mut guard, now);
            }
        }

        rank_active(active)
    }

    /// `raw_severity * decay(now - published_at)`.
    pub fn effective_severity(&self, signal: &Signal, now: DateTime<Utc>) -> f64 {
        let age = now - signal.published_at;
        (signal.raw_severity * self.decay.factor(age, self.horizon)).clamp(0.0, 1.0)
    }

    fn is_expired(&self, signal: &Signal, now: DateTime<Utc>) -> bool {
        now - signal.published_at > self.horizon
    }

    fn evict_locked(&self, guard: &mut Arc<Vec<Signal>>, now: DateTime<Utc>) -> usize {
        let before = guard.len();
        let kept: Vec<Signal> = guard
            .iter()
            .filter(|s| !self.is_expired(s, now))
            .cloned()
            .collect();
        let evicted = before - kept.len();
        if evicted > 0 {
            debug!(evicted, remaining = kept.len(), "expired signals evicted");
            *guard = Arc::new(kept);
        }
        evicted
    }

    fn read(&self) -> RwLockReadGuard<'_, Arc<Vec<Signal>>> {
        self.signals.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<Vec<Signal>>> {
        self.signals.write().unwrap_or_else(|p| p.into_inner())
    }
}

/// Deterministic active-signal order: effective severity desc, then
/// `published_at` desc, then `source_id` asc.
pub fn rank_active(mut active: Vec<ActiveSignal>) -> Vec<ActiveSignal> {
    active.sort_by(|a, b| {
        b.effective_severity
            .total_cmp(&a.effective_severity)
            .then_with(|| b.signal.published_at.cmp(&a.signal.published_at))
            .then_with(|| a.signal.source_id.cmp(&b.signal.source_id))
    });
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ssn_schemas::Tag;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn sig(id: &str, sev: f64, hours_ago: i64) -> Signal {
        Signal {
            source_id: id.to_string(),
            headline: format!("headline {id}"),
            published_at: now() - Duration::hours(hours_ago),
            affected_industries: [Tag::new("energy")].into_iter().collect(),
            affected_regions: Default::default(),
            raw_severity: sev,
        }
    }

    #[test]
    fn duplicate_source_id_keeps_first_copy() {
        let w = SignalWindow::new(&SignalsConfig::default());
        w.insert(sig("a", 0.8, 1));
        let held = w.insert(sig("a", 0.2, 0));
        assert_eq!(w.len(), 1);
        assert_eq!(held.raw_severity, 0.8);
    }

    #[test]
    fn active_signals_filter_epsilon_and_sort() {
        let w = SignalWindow::new(&SignalsConfig::default());
        w.insert(sig("weak", 0.04, 0));
        w.insert(sig("old", 0.9, 24)); // 0.225
        w.insert(sig("fresh", 0.6, 0));
        w.insert(sig("twin", 0.6, 0));

        let ids: Vec<String> = w
            .active_signals(now())
            .into_iter()
            .map(|a| a.signal.source_id)
            .collect();
        assert_eq!(ids, vec!["fresh", "twin", "old"]);
    }

    #[test]
    fn equal_severity_prefers_most_recent() {
        let w = SignalWindow::new(&SignalsConfig::default());
        // 1.0 at 12h ago and 0.5 now both score 0.5.
        w.insert(sig("older", 1.0, 12));
        w.insert(sig("newer", 0.5, 0));
        let active = w.active_signals(now());
        assert_eq!(active[0].signal.source_id, "newer");
        assert!((active[0].effective_severity - active[1].effective_severity).abs() < 1e-12);
    }

    #[test]
    fn expired_signals_are_evicted_lazily_on_read() {
        let w = SignalWindow::new(&SignalsConfig::default());
        w.insert(sig("ancient", 1.0, 80));
        w.insert(sig("live", 0.7, 2));
        assert_eq!(w.len(), 2);

        let active = w.active_signals(now());
        assert_eq!(active.len(), 1);
        assert_eq!(w.len(), 1, "expired entry must be gone after a read");
    }

    #[test]
    fn explicit_eviction_reports_count() {
        let w = SignalWindow::new(&SignalsConfig::default());
        w.insert(sig("a", 1.0, 100));
        w.insert(sig("b", 1.0, 90));
        w.insert(sig("c", 1.0, 1));
        assert_eq!(w.evict_expired(now()), 2);
        assert_eq!(w.evict_expired(now()), 0);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_ingest() {
        let w = SignalWindow::new(&SignalsConfig::default());
        w.insert(sig("a", 0.5, 0));
        let snap = w.snapshot();
        w.insert(sig("b", 0.5, 0));
        assert_eq!(snap.len(), 1);
        assert_eq!(w.snapshot().len(), 2);
    }
}
