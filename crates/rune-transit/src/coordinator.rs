//! Cross-category coordination.
//!
//! The [`Coordinator`] owns one [`CategoryManager`] per category, turns list
//! mutations into requests, decides when each category's pending batch
//! starts and tells the owner once everything has gone idle.
//!
//! It is single-threaded and never blocks. Three inputs drive it:
//!
//! - mutation notifications (`notify_*` / [`enqueue`](Coordinator::enqueue))
//!   followed by [`run_pending_animations`](Coordinator::run_pending_animations)
//! - tween lifecycle reports via [`handle_tween_event`](Coordinator::handle_tween_event)
//! - the passage of time via [`advance`](Coordinator::advance), which fires
//!   deferred-ready batches whose delay has elapsed
//!
//! Output is the [`EventQueue`], drained with
//! [`drain_events`](Coordinator::drain_events).

use std::time::Duration;

use rune_config::RuneConfig;

use crate::events::{EventQueue, TransitionEvent};
use crate::manager::{CategoryManager, CategoryOps, Dispatch};
use crate::request::{
    AnimationRequest, InsertRequest, Motion, RemoveRequest, ReplaceRequest, RepositionRequest,
};
use crate::schedule::{LAUNCH_ORDER, PendingSummary, ScheduleRule, default_schedule};
use crate::timer::DeferredTimers;
use crate::tween::{TweenDriver, TweenEvent};
use crate::types::{Category, CategoryMap, ItemId, ItemProperty, ItemState, Occupant};

/// Order in which one item's not-yet-started work is ended.
const END_ITEM_ORDER: [Category; 4] = [
    Category::Reposition,
    Category::Replace,
    Category::Remove,
    Category::Insert,
];

/// The four category managers.
#[derive(Debug)]
pub struct Managers {
    pub insert: CategoryManager<InsertRequest>,
    pub remove: CategoryManager<RemoveRequest>,
    pub reposition: CategoryManager<RepositionRequest>,
    pub replace: CategoryManager<ReplaceRequest>,
}

impl Managers {
    fn new(durations: CategoryMap<Duration>) -> Self {
        Self {
            insert: CategoryManager::new(durations.insert),
            remove: CategoryManager::new(durations.remove),
            reposition: CategoryManager::new(durations.reposition),
            replace: CategoryManager::new(durations.replace),
        }
    }

    pub(crate) fn get(&self, category: Category) -> &dyn CategoryOps {
        match category {
            Category::Insert => &self.insert,
            Category::Remove => &self.remove,
            Category::Reposition => &self.reposition,
            Category::Replace => &self.replace,
        }
    }

    pub(crate) fn get_mut(&mut self, category: Category) -> &mut dyn CategoryOps {
        match category {
            Category::Insert => &mut self.insert,
            Category::Remove => &mut self.remove,
            Category::Reposition => &mut self.reposition,
            Category::Replace => &mut self.replace,
        }
    }
}

/// Coordinates transitions for one visual container.
pub struct Coordinator<D> {
    driver: D,
    managers: Managers,
    timers: DeferredTimers,
    events: EventQueue,
    now: Duration,
    schedule: ScheduleRule,
    /// Set when work is enqueued; cleared when `AllFinished` is reported.
    finish_armed: bool,
    strict_consistency: bool,
}

impl<D: TweenDriver> Coordinator<D> {
    /// Coordinator with default durations.
    pub fn new(driver: D) -> Self {
        Self::from_config(driver, &RuneConfig::default())
    }

    pub fn from_config(driver: D, config: &RuneConfig) -> Self {
        let transitions = &config.transitions;
        let durations = CategoryMap {
            insert: transitions.insert_duration(),
            remove: transitions.remove_duration(),
            reposition: transitions.reposition_duration(),
            replace: transitions.replace_duration(),
        };
        log::debug!("transition durations: {durations:?}");
        Self {
            driver,
            managers: Managers::new(durations),
            timers: DeferredTimers::default(),
            events: EventQueue::new(),
            now: Duration::ZERO,
            schedule: default_schedule,
            finish_armed: false,
            strict_consistency: config.diagnostics.strict_consistency,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn managers(&self) -> &Managers {
        &self.managers
    }

    /// Per-category hooks, easing and duration are configured here.
    pub fn managers_mut(&mut self) -> &mut Managers {
        &mut self.managers
    }

    pub fn duration(&self, category: Category) -> Duration {
        self.managers.get(category).duration()
    }

    pub fn set_duration(&mut self, category: Category, duration: Duration) {
        match category {
            Category::Insert => self.managers.insert.set_duration(duration),
            Category::Remove => self.managers.remove.set_duration(duration),
            Category::Reposition => self.managers.reposition.set_duration(duration),
            Category::Replace => self.managers.replace.set_duration(duration),
        }
    }

    /// Replace the rule that orders categories against each other.
    pub fn set_schedule_rule(&mut self, rule: ScheduleRule) {
        self.schedule = rule;
    }

    /// Panic instead of logging when an item is still active after its
    /// animation was ended. Only a driver or hook that breaks the tween
    /// lifecycle contract can cause that; debug builds always panic.
    pub fn set_strict_consistency(&mut self, strict: bool) {
        self.strict_consistency = strict;
    }

    /// Coordinator clock, advanced by [`advance`](Self::advance).
    pub fn now(&self) -> Duration {
        self.now
    }

    /// When the next deferred-ready batch is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn item_state(&self, category: Category, item: ItemId) -> ItemState {
        self.managers.get(category).state_of(item)
    }

    // Mutation intake

    /// An item was added to the container.
    pub fn notify_insert(&mut self, item: ItemId) -> bool {
        log::debug!("insert {item}");
        self.end_animation(item);
        self.driver
            .set_immediate_property(item, ItemProperty::Alpha, 0.0);
        self.push_request(InsertRequest::new(item).into());
        true
    }

    /// An item was removed from the container.
    pub fn notify_remove(&mut self, item: ItemId) -> bool {
        log::debug!("remove {item}");
        self.end_animation(item);
        self.push_request(RemoveRequest::new(item).into());
        true
    }

    /// An item the user swiped off screen was removed from the container.
    ///
    /// The item stays at its swiped translation, rounded to whole pixels,
    /// and is not faded.
    pub fn notify_swipe_dismiss(&mut self, item: ItemId) -> bool {
        let translation_x = self
            .driver
            .property_value(item, ItemProperty::TranslationX)
            .round();
        let translation_y = self
            .driver
            .property_value(item, ItemProperty::TranslationY)
            .round();
        log::debug!("swipe dismiss {item} at ({translation_x}, {translation_y})");
        self.end_animation(item);
        self.driver
            .set_immediate_property(item, ItemProperty::TranslationX, translation_x);
        self.driver
            .set_immediate_property(item, ItemProperty::TranslationY, translation_y);
        self.push_request(RemoveRequest::dismissed(item).into());
        true
    }

    /// An item moved from `(from_x, from_y)` to `(to_x, to_y)`.
    ///
    /// Movement is measured in whole pixels. Returns false when the item did
    /// not move by at least one pixel; it is finished on the spot and nothing
    /// is enqueued.
    pub fn notify_reposition(
        &mut self,
        item: ItemId,
        from_x: f32,
        from_y: f32,
        to_x: f32,
        to_y: f32,
    ) -> bool {
        // Start from where the item is drawn, not where it was laid out.
        let from_x = from_x + self.driver.property_value(item, ItemProperty::TranslationX);
        let from_y = from_y + self.driver.property_value(item, ItemProperty::TranslationY);
        self.end_animation(item);

        let dx = (to_x - from_x).trunc();
        let dy = (to_y - from_y).trunc();
        if dx == 0.0 && dy == 0.0 {
            log::debug!("reposition {item}: no movement");
            self.events
                .finished(Category::Reposition, item, Occupant::Sole);
            return false;
        }

        log::debug!("reposition {item} by ({dx}, {dy})");
        if dx != 0.0 {
            self.driver
                .set_immediate_property(item, ItemProperty::TranslationX, -dx);
        }
        if dy != 0.0 {
            self.driver
                .set_immediate_property(item, ItemProperty::TranslationY, -dy);
        }
        let motion = Motion::new(to_x - dx, to_y - dy, to_x, to_y);
        self.push_request(RepositionRequest::new(item, motion).into());
        true
    }

    /// The occupant of a slot changed from `old` to `new`.
    ///
    /// An item changed in place (`old == new`) is animated once, as the
    /// incoming occupant: it slides in from the old position and fades in.
    ///
    /// # Panics
    ///
    /// Panics if both occupants are `None`.
    pub fn notify_replace(
        &mut self,
        old: Option<ItemId>,
        new: Option<ItemId>,
        from_x: f32,
        from_y: f32,
        to_x: f32,
        to_y: f32,
    ) -> bool {
        assert!(
            old.is_some() || new.is_some(),
            "replace needs at least one occupant"
        );
        let motion = Motion::new(from_x, from_y, to_x, to_y);
        let (mut dx, mut dy) = (motion.delta_x(), motion.delta_y());
        log::debug!("replace {old:?} -> {new:?}");

        if let Some(old) = old {
            let translation_x = self.driver.property_value(old, ItemProperty::TranslationX);
            let translation_y = self.driver.property_value(old, ItemProperty::TranslationY);
            let alpha = self.driver.property_value(old, ItemProperty::Alpha);
            self.end_animation(old);
            dx -= translation_x;
            dy -= translation_y;
            // Ending may have reset the old item; carry on from where it was.
            self.driver
                .set_immediate_property(old, ItemProperty::TranslationX, translation_x);
            self.driver
                .set_immediate_property(old, ItemProperty::TranslationY, translation_y);
            self.driver
                .set_immediate_property(old, ItemProperty::Alpha, alpha);
        }

        let (dx, dy) = (dx.trunc(), dy.trunc());
        if let Some(new) = new {
            if Some(new) != old {
                self.end_animation(new);
            }
            self.driver
                .set_immediate_property(new, ItemProperty::TranslationX, -dx);
            self.driver
                .set_immediate_property(new, ItemProperty::TranslationY, -dy);
            self.driver
                .set_immediate_property(new, ItemProperty::Alpha, 0.0);
        }

        self.push_request(ReplaceRequest::new(old, new, motion).into());
        true
    }

    /// Enqueue a prepared request as-is, without any visual preparation.
    /// Earlier animations of its targets are ended first.
    ///
    /// # Panics
    ///
    /// Panics if the request has no target.
    pub fn enqueue(&mut self, request: impl Into<AnimationRequest>) {
        let request = request.into();
        assert!(
            !request.targets().is_fully_spent(),
            "{} request enqueued without a target",
            request.category()
        );
        let targets: Vec<ItemId> = request.targets().iter().map(|(_, item)| item).collect();
        for item in targets {
            self.end_animation(item);
        }
        self.push_request(request);
    }

    fn push_request(&mut self, request: AnimationRequest) {
        match request {
            AnimationRequest::Insert(r) => self.managers.insert.enqueue(r),
            AnimationRequest::Remove(r) => self.managers.remove.enqueue(r),
            AnimationRequest::Reposition(r) => self.managers.reposition.enqueue(r),
            AnimationRequest::Replace(r) => self.managers.replace.enqueue(r),
        };
        self.finish_armed = true;
    }

    // Scheduling

    pub fn has_pending_animations(&self) -> bool {
        Category::ALL
            .iter()
            .any(|c| self.managers.get(*c).has_pending())
    }

    /// Start or defer every category's pending batch per the schedule rule.
    pub fn run_pending_animations(&mut self) {
        if !self.has_pending_animations() {
            return;
        }
        let summary = PendingSummary {
            pending: CategoryMap::from_fn(|c| self.managers.get(c).has_pending()),
            durations: CategoryMap::from_fn(|c| self.managers.get(c).duration()),
        };
        let plan = (self.schedule)(&summary);
        log::debug!("running pending transitions at {:?}: {plan:?}", self.now);

        self.finish_armed = true;
        for category in LAUNCH_ORDER {
            if !summary.pending[category] {
                continue;
            }
            let Some(launch) = plan[category] else {
                log::trace!("{category} left pending by schedule rule");
                continue;
            };
            self.with_manager(category, |m, cx| {
                m.run_pending_animations(launch.is_deferred(), launch.delay(), cx)
            });
        }
        self.dispatch_finished_when_done();
    }

    /// Advance the coordinator clock and fire every batch now due.
    pub fn advance(&mut self, delta: Duration) {
        self.now += delta;
        while let Some((category, batch)) = self.timers.pop_due(self.now) {
            log::trace!("{category} batch {batch:?} due at {:?}", self.now);
            self.with_manager(category, |m, cx| m.fire_deferred(batch, cx));
        }
        self.dispatch_finished_when_done();
    }

    // Tween intake

    /// Feed a lifecycle report from the tween driver.
    ///
    /// Reports for handles the coordinator no longer tracks are ignored.
    pub fn handle_tween_event(&mut self, event: TweenEvent) {
        let handle = event.handle();
        let Some(category) = Category::ALL
            .into_iter()
            .find(|c| self.managers.get(*c).owns_tween(handle))
        else {
            log::debug!("ignoring {event:?} for detached tween");
            return;
        };
        match event {
            TweenEvent::Started(h) => {
                self.with_manager(category, |m, cx| m.on_tween_started(h, cx));
            }
            TweenEvent::Cancelled(h) => {
                self.with_manager(category, |m, cx| m.on_tween_cancelled(h, cx));
            }
            TweenEvent::Ended(h) => {
                self.with_manager(category, |m, cx| m.on_tween_ended(h, cx));
                self.dispatch_finished_when_done();
            }
        }
    }

    // Ending

    /// Bring every animation of `item` to a terminal outcome, in every
    /// category and every state.
    pub fn end_animation(&mut self, item: ItemId) {
        for category in Category::ALL {
            self.with_manager(category, |m, cx| m.cancel_item(item, cx));
        }
        for category in END_ITEM_ORDER {
            self.with_manager(category, |m, cx| m.end_pending_animations(Some(item), cx));
        }
        for category in END_ITEM_ORDER {
            self.with_manager(category, |m, cx| {
                m.end_deferred_ready_animations(Some(item), cx)
            });
        }
        for category in [
            Category::Remove,
            Category::Insert,
            Category::Replace,
            Category::Reposition,
        ] {
            if self.managers.get_mut(category).remove_from_active(item) {
                self.report_inconsistency(category, item);
            }
        }
        self.dispatch_finished_when_done();
    }

    /// Bring every animation of every item to a terminal outcome.
    pub fn end_animations(&mut self) {
        log::debug!("ending all transitions");
        for category in [
            Category::Reposition,
            Category::Remove,
            Category::Insert,
            Category::Replace,
        ] {
            self.with_manager(category, |m, cx| m.end_pending_animations(None, cx));
        }

        if self.is_running() {
            for category in [
                Category::Reposition,
                Category::Insert,
                Category::Replace,
                Category::Remove,
            ] {
                self.with_manager(category, |m, cx| m.end_deferred_ready_animations(None, cx));
            }
            self.timers.clear();
            for category in [
                Category::Remove,
                Category::Reposition,
                Category::Insert,
                Category::Replace,
            ] {
                self.with_manager(category, |m, cx| m.cancel_all_started_animations(cx));
            }
        }

        debug_assert!(!self.is_running(), "transitions still running after end");
        self.dispatch_finished_when_done();
    }

    /// True while any category has pending, deferred or active work.
    pub fn is_running(&self) -> bool {
        Category::ALL
            .iter()
            .any(|c| self.managers.get(*c).is_running())
    }

    /// Report `AllFinished` if every category is idle and work has been
    /// enqueued since the last report. Returns whether everything is idle.
    pub fn dispatch_finished_when_done(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        if std::mem::take(&mut self.finish_armed) {
            log::debug!("all transitions finished at {:?}", self.now);
            self.events.push(TransitionEvent::AllFinished);
        }
        true
    }

    fn report_inconsistency(&self, category: Category, item: ItemId) {
        log::error!("{item} was still active in {category} after its animation ended");
        if self.strict_consistency || cfg!(debug_assertions) {
            panic!("{item} was still active in {category} after its animation ended");
        }
    }

    fn with_manager<T>(
        &mut self,
        category: Category,
        f: impl FnOnce(&mut dyn CategoryOps, &mut Dispatch<'_>) -> T,
    ) -> T {
        let Self {
            driver,
            managers,
            timers,
            events,
            now,
            ..
        } = self;
        let mut cx = Dispatch {
            driver,
            events,
            timers,
            now: *now,
        };
        f(managers.get_mut(category), &mut cx)
    }

    // Events

    /// Drain all transition events in the order they were recorded.
    pub fn drain_events(&mut self) -> impl Iterator<Item = TransitionEvent> + '_ {
        self.events.drain()
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn pop_event(&mut self) -> Option<TransitionEvent> {
        self.events.pop()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}
