use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Callback invoked with the new tick value after the viewport layout changed.
pub type LayoutSubscriber = Box<dyn FnMut(u64)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A "viewport changed" event source.
///
/// The application root owns one `LayoutTick` and passes clones of it to every tracker that
/// caches layout-dependent state. Clones share the same counter and subscriber list.
///
/// Consumers can either subscribe, or remember the last [`Self::tick`] they saw and compare it
/// on their next update (see [`Self::changed_since`]).
///
/// Host resize/orientation events should call [`Self::request_bump`]; the first request in a
/// frame returns `true` so the host schedules exactly one frame callback, which then calls
/// [`Self::on_frame`]. Hosts without frame callbacks call [`Self::bump`] directly.
#[derive(Clone, Default)]
pub struct LayoutTick {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    tick: Cell<u64>,
    pending: Cell<bool>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    subs: RefCell<Vec<(SubscriptionId, LayoutSubscriber)>>,
    /// Ids of the subscribers detached while callbacks run.
    detached: RefCell<Vec<SubscriptionId>>,
    dropped: RefCell<Vec<SubscriptionId>>,
}

impl LayoutTick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        self.inner.tick.get()
    }

    pub fn changed_since(&self, seen: u64) -> bool {
        self.inner.tick.get() != seen
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }

    pub fn subscribe(&self, f: impl FnMut(u64) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.subs.borrow_mut().push((id, Box::new(f)));
        id
    }

    /// Removes a subscriber. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if self.inner.notifying.get() && self.inner.detached.borrow().contains(&id) {
            // The list is detached while callbacks run; drop the entry when it is reattached.
            let mut dropped = self.inner.dropped.borrow_mut();
            if dropped.contains(&id) {
                return false;
            }
            dropped.push(id);
            return true;
        }
        let mut subs = self.inner.subs.borrow_mut();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subs.borrow().len()
    }

    /// Records a layout change to be published on the next frame.
    ///
    /// Returns `true` if this is the first request since the last frame, i.e. the caller should
    /// schedule a frame callback.
    pub fn request_bump(&self) -> bool {
        !self.inner.pending.replace(true)
    }

    /// Publishes a pending layout change, if any. Returns whether a bump happened.
    pub fn on_frame(&self) -> bool {
        if !self.inner.pending.replace(false) {
            return false;
        }
        self.bump();
        true
    }

    /// Drops a pending request without publishing it (e.g. the frame was cancelled).
    pub fn cancel_pending(&self) {
        self.inner.pending.set(false);
    }

    /// Increments the tick immediately and notifies subscribers.
    pub fn bump(&self) -> u64 {
        let tick = self.inner.tick.get().wrapping_add(1);
        self.inner.tick.set(tick);
        lwdebug!(tick, "LayoutTick::bump");
        self.notify(tick);
        tick
    }

    fn notify(&self, tick: u64) {
        if self.inner.notifying.replace(true) {
            // Re-entrant bump from a subscriber: the outer loop is still running and the new
            // value is already visible through `tick()`.
            return;
        }
        let mut subs = core::mem::take(&mut *self.inner.subs.borrow_mut());
        *self.inner.detached.borrow_mut() = subs.iter().map(|(id, _)| *id).collect();
        for (_, f) in subs.iter_mut() {
            f(tick);
        }
        self.inner.notifying.set(false);
        self.inner.detached.borrow_mut().clear();

        let dropped = core::mem::take(&mut *self.inner.dropped.borrow_mut());
        let mut cur = self.inner.subs.borrow_mut();
        subs.retain(|(id, _)| !dropped.contains(id));
        cur.retain(|(id, _)| !dropped.contains(id));
        subs.append(&mut cur);
        *cur = subs;
    }
}

impl fmt::Debug for LayoutTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTick")
            .field("tick", &self.inner.tick.get())
            .field("pending", &self.inner.pending.get())
            .field("subscribers", &self.inner.subs.borrow().len())
            .finish_non_exhaustive()
    }
}
