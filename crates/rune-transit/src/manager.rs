//! Per-category animation bookkeeping.
//!
//! A [`CategoryManager`] owns the requests of one category and tracks where
//! each of them is in its lifecycle:
//!
//! ```text
//! enqueue ──► Pending ──run(deferred)──► Deferred batch ──timer──┐
//!                │                           │                   ▼
//!                └──────run(immediate)───────┼──────────────► Active ──end──► gone
//!                                            │
//!              end_pending / end_deferred ◄──┘  (finished before starting)
//! ```
//!
//! An item appears in at most one of Pending, Deferred and Active within a
//! manager. Every transition to a terminal outcome runs exactly one of the
//! category's lifecycle hooks and records exactly one `Finished` event.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::easing::EasingFunction;
use crate::events::EventQueue;
use crate::hooks::{self, CategoryHooks};
use crate::listener::ListenerTable;
use crate::request::ItemRequest;
use crate::timer::DeferredTimers;
use crate::tween::{TweenContext, TweenDriver};
use crate::types::{BatchId, Category, ItemId, ItemState, Occupant, RequestId, TweenHandle};

/// Borrowed coordinator state a manager needs while it changes state.
pub(crate) struct Dispatch<'a> {
    pub driver: &'a mut dyn TweenDriver,
    pub events: &'a mut EventQueue,
    pub timers: &'a mut DeferredTimers,
    pub now: Duration,
}

#[derive(Debug)]
struct DeferredBatch {
    id: BatchId,
    requests: Vec<RequestId>,
}

/// Bookkeeping for one animation category.
#[derive(Debug)]
pub struct CategoryManager<R> {
    hooks: CategoryHooks<R>,
    duration: Duration,
    easing: EasingFunction,
    requests: HashMap<RequestId, R>,
    pending: Vec<RequestId>,
    deferred: Vec<DeferredBatch>,
    active: HashSet<ItemId>,
    listeners: ListenerTable,
    next_request: u64,
    next_batch: u64,
}

impl<R: ItemRequest> CategoryManager<R> {
    pub fn new(duration: Duration) -> Self {
        Self::with_hooks(duration, R::default_hooks())
    }

    pub fn with_hooks(duration: Duration, hooks: CategoryHooks<R>) -> Self {
        Self {
            hooks,
            duration,
            easing: hooks::default_easing(R::CATEGORY),
            requests: HashMap::new(),
            pending: Vec::new(),
            deferred: Vec::new(),
            active: HashSet::new(),
            listeners: ListenerTable::default(),
            next_request: 0,
            next_batch: 0,
        }
    }

    pub fn category(&self) -> Category {
        R::CATEGORY
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Affects requests started after the change.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn easing(&self) -> EasingFunction {
        self.easing
    }

    pub fn set_easing(&mut self, easing: EasingFunction) {
        self.easing = easing;
    }

    pub fn hooks(&self) -> CategoryHooks<R> {
        self.hooks
    }

    pub fn set_hooks(&mut self, hooks: CategoryHooks<R>) {
        self.hooks = hooks;
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// True while anything is pending, deferred or active.
    pub fn is_running(&self) -> bool {
        !self.pending.is_empty() || !self.deferred.is_empty() || !self.active.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn deferred_batches(&self) -> usize {
        self.deferred.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, item: ItemId) -> bool {
        self.active.contains(&item)
    }

    pub fn state_of(&self, item: ItemId) -> ItemState {
        if self.active.contains(&item) {
            ItemState::Active
        } else if self
            .deferred
            .iter()
            .any(|b| b.requests.iter().any(|id| self.touches(*id, Some(item))))
        {
            ItemState::Deferred
        } else if self.pending.iter().any(|id| self.touches(*id, Some(item))) {
            ItemState::Pending
        } else {
            ItemState::Absent
        }
    }

    /// Number of unspent requests, in any state.
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Leave `item` in Active with no tween behind it.
    #[cfg(test)]
    pub(crate) fn strand_active(&mut self, item: ItemId) {
        self.active.insert(item);
    }

    /// Append a request to Pending.
    ///
    /// # Panics
    ///
    /// Panics if the request has no target.
    pub(crate) fn enqueue(&mut self, request: R) -> RequestId {
        assert!(
            !request.targets().is_fully_spent(),
            "{} request enqueued without a target",
            R::CATEGORY
        );
        let id = RequestId(self.next_request);
        self.next_request += 1;
        log::trace!("{} pending: {request:?}", R::CATEGORY);
        self.requests.insert(id, request);
        self.pending.push(id);
        id
    }

    /// Request matches `item`, or any item when `item` is `None`.
    fn touches(&self, id: RequestId, item: Option<ItemId>) -> bool {
        self.requests
            .get(&id)
            .is_some_and(|r| item.is_none_or(|i| r.targets().contains(i)))
    }

    /// Finish the targets of a not-yet-started request. Returns true once
    /// the request is spent.
    fn end_not_started(
        &mut self,
        id: RequestId,
        item: Option<ItemId>,
        cx: &mut Dispatch<'_>,
    ) -> bool {
        let hooks = self.hooks;
        let Some(request) = self.requests.get_mut(&id) else {
            return true;
        };
        let targets: Vec<(Occupant, ItemId)> = request
            .targets()
            .iter()
            .filter(|(_, t)| item.is_none_or(|i| i == *t))
            .collect();
        for (occupant, target) in targets {
            (hooks.ended_before_started)(request, target, &mut *cx.driver);
            cx.events.finished(R::CATEGORY, target, occupant);
            request.targets_mut().clear(target);
        }
        let spent = request.targets().is_fully_spent();
        if spent {
            self.requests.remove(&id);
        }
        spent
    }

    fn start_request(&mut self, id: RequestId, cx: &mut Dispatch<'_>) {
        let Some(request) = self.requests.get(&id) else {
            return;
        };
        let mut tween_cx = TweenContext::new(&mut *cx.driver, self.duration, self.easing);
        (self.hooks.create)(request, &mut tween_cx);
        let created = tween_cx.into_created();

        let mut seen = HashSet::new();
        for (item, _) in &created {
            assert!(
                request.targets().contains(*item),
                "{} hook animated {item}, which is not a target of the request",
                R::CATEGORY
            );
            assert!(
                seen.insert(*item),
                "{} hook built more than one tween for {item}",
                R::CATEGORY
            );
        }
        let unanimated: Vec<ItemId> = request
            .targets()
            .iter()
            .map(|(_, item)| item)
            .filter(|item| !seen.contains(item))
            .collect();

        log::debug!(
            "{} starting {} tween(s) at {:?}",
            R::CATEGORY,
            created.len(),
            cx.now
        );
        for (item, handle) in created {
            self.listeners.bind(handle, id, item);
            self.active.insert(item);
            cx.driver.start(handle);
        }
        for item in unanimated {
            log::warn!("{} hook built no tween for {item}", R::CATEGORY);
            self.end_not_started(id, Some(item), cx);
        }
    }

    fn cancel_tween(&mut self, handle: TweenHandle, cx: &mut Dispatch<'_>) {
        cx.driver.cancel(handle);
        CategoryOps::on_tween_cancelled(self, handle, cx);
        CategoryOps::on_tween_ended(self, handle, cx);
    }
}

/// Type-erased view of a manager, so the coordinator can walk categories in
/// a fixed order.
pub(crate) trait CategoryOps {
    fn duration(&self) -> Duration;
    fn has_pending(&self) -> bool;
    fn is_running(&self) -> bool;
    fn state_of(&self, item: ItemId) -> ItemState;
    fn owns_tween(&self, handle: TweenHandle) -> bool;

    /// Move everything pending to a new deferred batch or start it now.
    fn run_pending_animations(&mut self, deferred: bool, delay: Duration, cx: &mut Dispatch<'_>);

    /// Start whatever is left of a deferred batch. Returns false if the
    /// batch no longer exists.
    fn fire_deferred(&mut self, batch: BatchId, cx: &mut Dispatch<'_>) -> bool;

    fn end_pending_animations(&mut self, item: Option<ItemId>, cx: &mut Dispatch<'_>);
    fn end_deferred_ready_animations(&mut self, item: Option<ItemId>, cx: &mut Dispatch<'_>);

    /// Cancel every running tween. Returns how many were cancelled.
    fn cancel_all_started_animations(&mut self, cx: &mut Dispatch<'_>) -> usize;

    /// Cancel the running tweens of `item`.
    fn cancel_item(&mut self, item: ItemId, cx: &mut Dispatch<'_>) -> usize;

    /// Drop `item` from Active. Returns whether it was there.
    fn remove_from_active(&mut self, item: ItemId) -> bool;

    fn on_tween_started(&mut self, handle: TweenHandle, cx: &mut Dispatch<'_>);
    fn on_tween_cancelled(&mut self, handle: TweenHandle, cx: &mut Dispatch<'_>);

    /// Returns false when the handle was already detached.
    fn on_tween_ended(&mut self, handle: TweenHandle, cx: &mut Dispatch<'_>) -> bool;

    /// How many of Pending, the deferred batches and Active hold `item`,
    /// counting every entry.
    #[cfg(test)]
    fn occurrences(&self, item: ItemId) -> usize;
}

impl<R: ItemRequest> CategoryOps for CategoryManager<R> {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn has_pending(&self) -> bool {
        CategoryManager::has_pending(self)
    }

    fn is_running(&self) -> bool {
        CategoryManager::is_running(self)
    }

    fn state_of(&self, item: ItemId) -> ItemState {
        CategoryManager::state_of(self, item)
    }

    fn owns_tween(&self, handle: TweenHandle) -> bool {
        self.listeners.contains(handle)
    }

    fn run_pending_animations(&mut self, deferred: bool, delay: Duration, cx: &mut Dispatch<'_>) {
        if self.pending.is_empty() {
            return;
        }
        let ready = std::mem::take(&mut self.pending);
        if deferred {
            let id = BatchId(self.next_batch);
            self.next_batch += 1;
            log::debug!(
                "{} deferring {} request(s) by {delay:?}",
                R::CATEGORY,
                ready.len()
            );
            self.deferred.push(DeferredBatch {
                id,
                requests: ready,
            });
            cx.timers.schedule(cx.now + delay, R::CATEGORY, id);
        } else {
            for id in ready {
                self.start_request(id, cx);
            }
        }
    }

    fn fire_deferred(&mut self, batch: BatchId, cx: &mut Dispatch<'_>) -> bool {
        let Some(pos) = self.deferred.iter().position(|b| b.id == batch) else {
            log::trace!("{} batch {batch:?} already drained", R::CATEGORY);
            return false;
        };
        let batch = self.deferred.remove(pos);
        for id in batch.requests {
            self.start_request(id, cx);
        }
        true
    }

    fn end_pending_animations(&mut self, item: Option<ItemId>, cx: &mut Dispatch<'_>) {
        let mut pending = std::mem::take(&mut self.pending);
        pending.retain(|&id| !(self.touches(id, item) && self.end_not_started(id, item, cx)));
        // Nothing can enqueue while hooks run, so the taken list is complete.
        self.pending = pending;
    }

    fn end_deferred_ready_animations(&mut self, item: Option<ItemId>, cx: &mut Dispatch<'_>) {
        let mut deferred = std::mem::take(&mut self.deferred);
        for batch in &mut deferred {
            batch
                .requests
                .retain(|&id| !(self.touches(id, item) && self.end_not_started(id, item, cx)));
        }
        deferred.retain(|b| !b.requests.is_empty());
        self.deferred = deferred;
    }

    fn cancel_all_started_animations(&mut self, cx: &mut Dispatch<'_>) -> usize {
        let handles = self.listeners.handles();
        for &handle in &handles {
            self.cancel_tween(handle, cx);
        }
        handles.len()
    }

    fn cancel_item(&mut self, item: ItemId, cx: &mut Dispatch<'_>) -> usize {
        let handles = self.listeners.handles_for(item);
        for &handle in &handles {
            self.cancel_tween(handle, cx);
        }
        handles.len()
    }

    fn remove_from_active(&mut self, item: ItemId) -> bool {
        if !self.active.remove(&item) {
            return false;
        }
        self.listeners.detach_item(item);
        true
    }

    fn on_tween_started(&mut self, handle: TweenHandle, cx: &mut Dispatch<'_>) {
        let Some(binding) = self.listeners.get(handle) else {
            return;
        };
        let occupant = self
            .requests
            .get(&binding.request)
            .and_then(|r| r.targets().occupant_of(binding.item))
            .unwrap_or(Occupant::Sole);
        cx.events.starting(R::CATEGORY, binding.item, occupant);
    }

    fn on_tween_cancelled(&mut self, handle: TweenHandle, cx: &mut Dispatch<'_>) {
        let Some(binding) = self.listeners.mark_cancelled(handle) else {
            return;
        };
        log::debug!("{} cancelled for {}", R::CATEGORY, binding.item);
        if let Some(request) = self.requests.get(&binding.request) {
            (self.hooks.cancelled)(request, binding.item, &mut *cx.driver);
        }
    }

    fn on_tween_ended(&mut self, handle: TweenHandle, cx: &mut Dispatch<'_>) -> bool {
        let Some(binding) = self.listeners.detach(handle) else {
            return false;
        };
        let hooks = self.hooks;
        if let Some(request) = self.requests.get_mut(&binding.request) {
            let occupant = request
                .targets()
                .occupant_of(binding.item)
                .unwrap_or(Occupant::Sole);
            if !binding.cancelled {
                (hooks.ended_successfully)(request, binding.item, &mut *cx.driver);
            }
            cx.events.finished(R::CATEGORY, binding.item, occupant);
            request.targets_mut().clear(binding.item);
            if request.targets().is_fully_spent() {
                self.requests.remove(&binding.request);
            }
        }
        self.active.remove(&binding.item);
        true
    }

    #[cfg(test)]
    fn occurrences(&self, item: ItemId) -> usize {
        let pending = self
            .pending
            .iter()
            .filter(|id| self.touches(**id, Some(item)))
            .count();
        let deferred = self
            .deferred
            .iter()
            .flat_map(|b| &b.requests)
            .filter(|id| self.touches(**id, Some(item)))
            .count();
        pending + deferred + usize::from(self.active.contains(&item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TransitionEvent;
    use crate::request::{InsertRequest, Motion, ReplaceRequest};
    use crate::sim::SimulatedTweens;
    use crate::types::ItemProperty;

    struct Harness {
        driver: SimulatedTweens,
        events: EventQueue,
        timers: DeferredTimers,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                driver: SimulatedTweens::new(),
                events: EventQueue::new(),
                timers: DeferredTimers::default(),
            }
        }

        fn cx(&mut self) -> Dispatch<'_> {
            Dispatch {
                driver: &mut self.driver,
                events: &mut self.events,
                timers: &mut self.timers,
                now: Duration::ZERO,
            }
        }

        fn finished(&self) -> Vec<ItemId> {
            self.events
                .iter()
                .filter(|e| e.is_finished())
                .filter_map(TransitionEvent::item)
                .collect()
        }
    }

    fn insert_manager() -> CategoryManager<InsertRequest> {
        CategoryManager::new(Duration::from_millis(100))
    }

    #[test]
    fn test_enqueue_makes_pending() {
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));

        assert!(manager.has_pending());
        assert!(manager.is_running());
        assert_eq!(manager.state_of(ItemId(1)), ItemState::Pending);
        assert_eq!(manager.state_of(ItemId(2)), ItemState::Absent);
    }

    #[test]
    fn test_run_immediate_moves_to_active() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));
        manager.enqueue(InsertRequest::new(ItemId(2)));

        manager.run_pending_animations(false, Duration::ZERO, &mut h.cx());

        assert!(!manager.has_pending());
        assert_eq!(manager.active_len(), 2);
        assert_eq!(manager.state_of(ItemId(1)), ItemState::Active);
        assert_eq!(h.driver.running_count(), 2);
    }

    #[test]
    fn test_run_deferred_schedules_batch() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));

        manager.run_pending_animations(true, Duration::from_millis(50), &mut h.cx());

        assert_eq!(manager.deferred_batches(), 1);
        assert_eq!(manager.state_of(ItemId(1)), ItemState::Deferred);
        assert_eq!(h.timers.next_due(), Some(Duration::from_millis(50)));

        let (_, batch) = h.timers.pop_due(Duration::from_millis(50)).unwrap();
        assert!(manager.fire_deferred(batch, &mut h.cx()));
        assert_eq!(manager.state_of(ItemId(1)), ItemState::Active);
        assert_eq!(manager.deferred_batches(), 0);

        // A batch fires at most once.
        assert!(!manager.fire_deferred(batch, &mut h.cx()));
    }

    #[test]
    fn test_run_with_nothing_pending_is_noop() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.run_pending_animations(true, Duration::from_millis(50), &mut h.cx());
        assert_eq!(manager.deferred_batches(), 0);
        assert_eq!(h.timers.len(), 0);
    }

    #[test]
    fn test_end_pending_for_one_item() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));
        manager.enqueue(InsertRequest::new(ItemId(2)));

        manager.end_pending_animations(Some(ItemId(2)), &mut h.cx());

        assert_eq!(manager.pending_len(), 1);
        assert_eq!(manager.state_of(ItemId(2)), ItemState::Absent);
        assert_eq!(h.finished(), vec![ItemId(2)]);
        // ended_before_started restores opacity.
        assert_eq!(h.driver.value(ItemId(2), ItemProperty::Alpha), 1.0);
    }

    #[test]
    fn test_end_deferred_drops_empty_batch() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));
        manager.run_pending_animations(true, Duration::from_millis(50), &mut h.cx());

        manager.end_deferred_ready_animations(None, &mut h.cx());

        assert_eq!(manager.deferred_batches(), 0);
        assert!(!manager.is_running());
        assert_eq!(h.finished(), vec![ItemId(1)]);
    }

    #[test]
    fn test_cancel_runs_end_chain_once() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));
        manager.run_pending_animations(false, Duration::ZERO, &mut h.cx());
        let handle = h.driver.handles_for(ItemId(1))[0];

        assert_eq!(manager.cancel_all_started_animations(&mut h.cx()), 1);
        assert!(!manager.is_running());
        assert_eq!(h.finished(), vec![ItemId(1)]);
        assert_eq!(h.driver.cancelled(), &[handle]);

        // Late reports from the driver are ignored.
        assert!(!manager.owns_tween(handle));
        assert!(!manager.on_tween_ended(handle, &mut h.cx()));
        assert_eq!(h.finished().len(), 1);
    }

    #[test]
    fn test_replace_spent_after_both_ends() {
        let mut h = Harness::new();
        let mut manager: CategoryManager<ReplaceRequest> =
            CategoryManager::new(Duration::from_millis(100));
        manager.enqueue(ReplaceRequest::new(
            Some(ItemId(1)),
            Some(ItemId(2)),
            Motion::new(0.0, 0.0, 0.0, 40.0),
        ));
        manager.run_pending_animations(false, Duration::ZERO, &mut h.cx());
        assert_eq!(manager.active_len(), 2);

        manager.cancel_item(ItemId(1), &mut h.cx());
        assert_eq!(manager.request_count(), 1);
        assert_eq!(manager.state_of(ItemId(2)), ItemState::Active);

        manager.cancel_item(ItemId(2), &mut h.cx());
        assert_eq!(manager.request_count(), 0);
        assert!(!manager.is_running());
    }

    #[test]
    fn test_hook_without_tween_finishes_target() {
        let mut h = Harness::new();
        let mut hooks = InsertRequest::default_hooks();
        hooks.create = |_, _| {};
        let mut manager = CategoryManager::with_hooks(Duration::from_millis(100), hooks);
        manager.enqueue(InsertRequest::new(ItemId(3)));

        manager.run_pending_animations(false, Duration::ZERO, &mut h.cx());

        assert!(!manager.is_running());
        assert_eq!(h.finished(), vec![ItemId(3)]);
    }

    #[test]
    fn test_remove_from_active() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));
        manager.run_pending_animations(false, Duration::ZERO, &mut h.cx());

        assert!(manager.remove_from_active(ItemId(1)));
        assert!(!manager.remove_from_active(ItemId(1)));
        assert!(!manager.is_active(ItemId(1)));
    }

    #[test]
    fn test_item_held_in_one_place() {
        let mut h = Harness::new();
        let mut manager = insert_manager();
        manager.enqueue(InsertRequest::new(ItemId(1)));
        assert_eq!(manager.occurrences(ItemId(1)), 1);

        manager.run_pending_animations(true, Duration::from_millis(50), &mut h.cx());
        assert_eq!(manager.occurrences(ItemId(1)), 1);

        let (_, batch) = h.timers.pop_due(Duration::from_millis(50)).unwrap();
        manager.fire_deferred(batch, &mut h.cx());
        assert_eq!(manager.occurrences(ItemId(1)), 1);

        manager.cancel_item(ItemId(1), &mut h.cx());
        assert_eq!(manager.occurrences(ItemId(1)), 0);

        // A stray Active entry next to a pending request counts twice.
        manager.enqueue(InsertRequest::new(ItemId(2)));
        manager.strand_active(ItemId(2));
        assert_eq!(manager.occurrences(ItemId(2)), 2);
    }

    #[test]
    #[should_panic(expected = "without a target")]
    fn test_enqueue_empty_request_panics() {
        let mut manager: CategoryManager<ReplaceRequest> =
            CategoryManager::new(Duration::from_millis(100));
        manager.enqueue(ReplaceRequest::new(None, None, Motion::default()));
    }
}
