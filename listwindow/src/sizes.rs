use alloc::vec::Vec;

use crate::key::{ItemKey, KeyMap};

/// Tunables for [`SizeTracker`] and scroll compensation.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizePolicy {
    /// Size changes at least this large (in pixels) bypass the coalesced flush.
    pub immediate_threshold: u32,
    /// Scroll compensation is skipped for this long after the last user scroll event.
    pub compensation_grace_ms: u64,
}

impl SizePolicy {
    pub const DEFAULT_IMMEDIATE_THRESHOLD: u32 = 120;
    pub const DEFAULT_COMPENSATION_GRACE_MS: u64 = 120;

    pub fn with_immediate_threshold(mut self, px: u32) -> Self {
        self.immediate_threshold = px;
        self
    }

    pub fn with_compensation_grace_ms(mut self, ms: u64) -> Self {
        self.compensation_grace_ms = ms;
        self
    }
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self {
            immediate_threshold: Self::DEFAULT_IMMEDIATE_THRESHOLD,
            compensation_grace_ms: Self::DEFAULT_COMPENSATION_GRACE_MS,
        }
    }
}

/// A measured size that replaced a previous value.
///
/// `previous` is `0` when the key had never been measured (its size came from an estimate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SizeChange<K> {
    pub key: K,
    pub previous: u32,
    pub next: u32,
}

impl<K> SizeChange<K> {
    pub fn delta(&self) -> i64 {
        self.next as i64 - self.previous as i64
    }

    /// Whether the item had a measured size before this change.
    pub fn was_measured(&self) -> bool {
        self.previous > 0
    }
}

/// Outcome of [`SizeTracker::report`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SizeReport<K> {
    /// The measurement was invalid or did not change anything.
    Ignored,
    /// The value was staged for the next flush. When `schedule_flush` is `true` no flush was
    /// outstanding and the caller must schedule one.
    Staged { schedule_flush: bool },
    /// The change was large enough to be applied right away.
    Applied(SizeChange<K>),
}

/// Measured item heights keyed by stable item identity.
///
/// Small changes are staged and applied together by [`Self::flush`], so a burst of
/// measurements for rows that are still settling costs a single offset rebuild. Changes of at
/// least [`SizePolicy::immediate_threshold`] are applied as soon as they are reported.
///
/// The tracker only records sizes; it does not know about offsets or scroll position. Every
/// applied change is returned to the caller, who rebuilds offsets and compensates scrolling.
#[derive(Clone, Debug)]
pub struct SizeTracker<K> {
    policy: SizePolicy,
    sizes: KeyMap<K, u32>,
    pending: KeyMap<K, u32>,
    flush_scheduled: bool,
    revision: u64,
}

impl<K: ItemKey + Clone> SizeTracker<K> {
    pub fn new(policy: SizePolicy) -> Self {
        Self {
            policy,
            sizes: KeyMap::new(),
            pending: KeyMap::new(),
            flush_scheduled: false,
            revision: 0,
        }
    }

    pub fn policy(&self) -> SizePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SizePolicy) {
        self.policy = policy;
    }

    /// Authoritative size for `key`, ignoring staged values.
    pub fn get(&self, key: &K) -> Option<u32> {
        self.sizes.get(key).copied()
    }

    /// Staged size for `key` awaiting the next flush.
    pub fn pending(&self, key: &K) -> Option<u32> {
        self.pending.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_flush_scheduled(&self) -> bool {
        self.flush_scheduled
    }

    /// Incremented every time an authoritative size changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Records a measurement for `key`.
    pub fn report(&mut self, key: K, measured: u32) -> SizeReport<K> {
        if measured == 0 {
            return SizeReport::Ignored;
        }
        let previous = self
            .pending
            .get(&key)
            .or_else(|| self.sizes.get(&key))
            .copied()
            .unwrap_or(0);
        if previous == measured {
            return SizeReport::Ignored;
        }

        let delta = previous.abs_diff(measured);
        if delta >= self.policy.immediate_threshold {
            self.pending.remove(&key);
            self.sizes.insert(key.clone(), measured);
            self.revision = self.revision.wrapping_add(1);
            lwdebug!(previous, next = measured, delta, "size applied immediately");
            return SizeReport::Applied(SizeChange {
                key,
                previous,
                next: measured,
            });
        }

        self.pending.insert(key, measured);
        let schedule_flush = !self.flush_scheduled;
        self.flush_scheduled = true;
        lwtrace!(previous, next = measured, schedule_flush, "size staged");
        SizeReport::Staged { schedule_flush }
    }

    /// Applies every staged size and clears the outstanding-flush flag.
    ///
    /// Returns the changes that actually modified a record; staged values equal to the
    /// authoritative size are dropped silently.
    pub fn flush(&mut self) -> Vec<SizeChange<K>> {
        self.flush_scheduled = false;
        if self.pending.is_empty() {
            return Vec::new();
        }
        let mut changes = Vec::with_capacity(self.pending.len());
        let pending = core::mem::take(&mut self.pending);
        for (key, next) in pending {
            let previous = self.sizes.get(&key).copied().unwrap_or(0);
            if previous == next {
                continue;
            }
            self.sizes.insert(key.clone(), next);
            changes.push(SizeChange {
                key,
                previous,
                next,
            });
        }
        if !changes.is_empty() {
            self.revision = self.revision.wrapping_add(1);
        }
        lwdebug!(changed = changes.len(), "size flush");
        changes
    }

    /// Forgets the outstanding flush without applying staged values (used on teardown).
    pub fn cancel_flush(&mut self) {
        self.flush_scheduled = false;
    }

    /// Drops records and staged values whose key fails `keep`.
    ///
    /// Returns the number of authoritative records removed.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let before = self.sizes.len();
        self.sizes.retain(|k, _| keep(k));
        self.pending.retain(|k, _| keep(k));
        let removed = before - self.sizes.len();
        if removed > 0 {
            lwdebug!(removed, "size records collected");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
        self.pending.clear();
        self.revision = self.revision.wrapping_add(1);
    }

    /// Iterates over the authoritative sizes without allocations.
    pub fn for_each_size(&self, mut f: impl FnMut(&K, u32)) {
        for (k, v) in self.sizes.iter() {
            f(k, *v);
        }
    }
}

impl<K: ItemKey + Clone> Default for SizeTracker<K> {
    fn default() -> Self {
        Self::new(SizePolicy::default())
    }
}

/// Converts a raw host measurement to a size record value, rounding up.
///
/// Returns `None` for zero, negative, or non-finite measurements.
pub fn measured_px(raw: f64) -> Option<u32> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    let px = ceil_positive(raw);
    if px >= u32::MAX as f64 {
        return Some(u32::MAX);
    }
    Some(px as u32)
}

// `f64::ceil` needs std.
fn ceil_positive(x: f64) -> f64 {
    let t = x as u64 as f64;
    if t < x { t + 1.0 } else { t }
}

/// How far to shift the scroll position after an item changed size, so the content below the
/// viewport top stays where it is on screen.
///
/// Only items lying entirely above the viewport are compensated: the item's previous bottom
/// edge (`item_top + previous`) must be at or above `viewport_top`. An item that straddles the
/// viewport top, or starts below it, grows downwards without scrolling.
pub fn compensation_delta<K>(item_top: u64, change: &SizeChange<K>, viewport_top: u64) -> i64 {
    if !change.was_measured() {
        return 0;
    }
    let previous_bottom = item_top.saturating_add(change.previous as u64);
    if previous_bottom <= viewport_top {
        change.delta()
    } else {
        0
    }
}
