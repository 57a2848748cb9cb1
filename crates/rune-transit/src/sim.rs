//! In-memory tween driver.
//!
//! [`SimulatedTweens`] keeps item properties in a map and interpolates them as
//! time is advanced manually. It backs the demo binary and the tests, and is
//! a reference for how a real rendering layer should report lifecycle events:
//! `Started` on the first advance after `start`, `Ended` once the elapsed time
//! reaches the duration, and nothing at all after `cancel`.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::coordinator::Coordinator;
use crate::easing::EasingFunction;
use crate::tween::{TweenDriver, TweenEvent};
use crate::types::{ItemId, ItemProperty, PropertyTarget, TweenHandle};

#[derive(Debug, Clone, Copy)]
struct Channel {
    property: ItemProperty,
    from: f32,
    to: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimState {
    Created,
    Running,
}

#[derive(Debug, Clone)]
struct SimTween {
    target: ItemId,
    channels: Vec<Channel>,
    duration: Duration,
    elapsed: Duration,
    easing: EasingFunction,
    state: SimState,
}

impl SimTween {
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Tween driver that runs on a manually advanced clock.
#[derive(Debug, Default)]
pub struct SimulatedTweens {
    now: Duration,
    values: HashMap<(ItemId, ItemProperty), f32>,
    tweens: BTreeMap<TweenHandle, SimTween>,
    queued: Vec<TweenEvent>,
    cancelled: Vec<TweenHandle>,
    next_handle: u64,
}

impl SimulatedTweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time advanced so far.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn value(&self, item: ItemId, property: ItemProperty) -> f32 {
        self.values
            .get(&(item, property))
            .copied()
            .unwrap_or_else(|| property.resting_value())
    }

    /// Tweens that have been started and not yet ended or cancelled.
    pub fn running_count(&self) -> usize {
        self.tweens
            .values()
            .filter(|t| t.state == SimState::Running)
            .count()
    }

    pub fn is_animating(&self, item: ItemId) -> bool {
        self.tweens
            .values()
            .any(|t| t.target == item && t.state == SimState::Running)
    }

    /// Live handles targeting `item`.
    pub fn handles_for(&self, item: ItemId) -> Vec<TweenHandle> {
        self.tweens
            .iter()
            .filter(|(_, t)| t.target == item)
            .map(|(h, _)| *h)
            .collect()
    }

    /// Every handle cancelled so far, in cancellation order.
    pub fn cancelled(&self) -> &[TweenHandle] {
        &self.cancelled
    }

    /// Advance the clock and interpolate running tweens.
    ///
    /// Returns the lifecycle reports in the order they occurred.
    pub fn advance(&mut self, delta: Duration) -> Vec<TweenEvent> {
        self.now += delta;
        let mut events = std::mem::take(&mut self.queued);
        let mut done = Vec::new();

        for (handle, tween) in &mut self.tweens {
            if tween.state != SimState::Running {
                continue;
            }
            tween.elapsed += delta;
            let eased = tween.easing.evaluate(tween.progress());
            for channel in &tween.channels {
                let value = channel.from + (channel.to - channel.from) * eased;
                self.values.insert((tween.target, channel.property), value);
            }
            if tween.is_complete() {
                done.push(*handle);
            }
        }

        for handle in done {
            if let Some(tween) = self.tweens.remove(&handle) {
                for channel in &tween.channels {
                    self.values
                        .insert((tween.target, channel.property), channel.to);
                }
                log::trace!("sim tween {handle:?} ended at {:?}", self.now);
                events.push(TweenEvent::Ended(handle));
            }
        }
        events
    }

    /// Report an external cancellation of `handle`: the tween stops where it
    /// is and the driver emits `Cancelled` then `Ended`.
    pub fn interrupt(&mut self, handle: TweenHandle) -> Vec<TweenEvent> {
        if self.tweens.remove(&handle).is_none() {
            return Vec::new();
        }
        self.queued.retain(|e| e.handle() != handle);
        vec![TweenEvent::Cancelled(handle), TweenEvent::Ended(handle)]
    }
}

impl TweenDriver for SimulatedTweens {
    fn create_tween(
        &mut self,
        target: ItemId,
        properties: &[PropertyTarget],
        duration: Duration,
        easing: EasingFunction,
    ) -> TweenHandle {
        let handle = TweenHandle(self.next_handle);
        self.next_handle += 1;
        let channels = properties
            .iter()
            .map(|p| Channel {
                property: p.property,
                from: 0.0,
                to: p.value,
            })
            .collect();
        self.tweens.insert(
            handle,
            SimTween {
                target,
                channels,
                duration,
                elapsed: Duration::ZERO,
                easing,
                state: SimState::Created,
            },
        );
        handle
    }

    fn start(&mut self, tween: TweenHandle) {
        let Some(mut state) = self.tweens.remove(&tween) else {
            return;
        };
        for channel in &mut state.channels {
            channel.from = self.value(state.target, channel.property);
        }
        state.state = SimState::Running;
        self.tweens.insert(tween, state);
        self.queued.push(TweenEvent::Started(tween));
    }

    fn cancel(&mut self, tween: TweenHandle) {
        // Values stay wherever the last advance left them.
        if self.tweens.remove(&tween).is_some() {
            self.queued.retain(|e| e.handle() != tween);
            self.cancelled.push(tween);
        }
    }

    fn set_immediate_property(&mut self, target: ItemId, property: ItemProperty, value: f32) {
        self.values.insert((target, property), value);
    }

    fn property_value(&self, target: ItemId, property: ItemProperty) -> f32 {
        self.value(target, property)
    }
}

impl Coordinator<SimulatedTweens> {
    /// Advance the simulated driver and the coordinator clock by one frame.
    ///
    /// Driver reports are handled first so batches that finish this frame
    /// are idle before timers due this frame fire.
    pub fn step(&mut self, delta: Duration) {
        let reports = self.driver_mut().advance(delta);
        for report in reports {
            self.handle_tween_event(report);
        }
        self.advance(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_tween_runs_to_completion() {
        let mut sim = SimulatedTweens::new();
        let item = ItemId(1);
        sim.set_immediate_property(item, ItemProperty::Alpha, 0.0);

        let handle = sim.create_tween(
            item,
            &[PropertyTarget::alpha(1.0)],
            ms(100),
            EasingFunction::Linear,
        );
        sim.start(handle);

        let events = sim.advance(ms(50));
        assert_eq!(events, vec![TweenEvent::Started(handle)]);
        assert!((sim.value(item, ItemProperty::Alpha) - 0.5).abs() < 1e-5);
        assert!(sim.is_animating(item));

        let events = sim.advance(ms(50));
        assert_eq!(events, vec![TweenEvent::Ended(handle)]);
        assert_eq!(sim.value(item, ItemProperty::Alpha), 1.0);
        assert_eq!(sim.running_count(), 0);
    }

    #[test]
    fn test_unstarted_tween_does_not_run() {
        let mut sim = SimulatedTweens::new();
        let handle = sim.create_tween(
            ItemId(1),
            &[PropertyTarget::alpha(0.0)],
            ms(10),
            EasingFunction::Linear,
        );
        assert!(sim.advance(ms(20)).is_empty());
        assert_eq!(sim.handles_for(ItemId(1)), vec![handle]);
        assert_eq!(sim.value(ItemId(1), ItemProperty::Alpha), 1.0);
    }

    #[test]
    fn test_cancel_freezes_and_silences() {
        let mut sim = SimulatedTweens::new();
        let item = ItemId(2);
        let handle = sim.create_tween(
            item,
            &[PropertyTarget::translation_y(100.0)],
            ms(100),
            EasingFunction::Linear,
        );
        sim.start(handle);
        sim.advance(ms(25));

        sim.cancel(handle);
        assert!(sim.advance(ms(100)).is_empty());
        assert!((sim.value(item, ItemProperty::TranslationY) - 25.0).abs() < 1e-3);
        assert_eq!(sim.cancelled(), &[handle]);
    }

    #[test]
    fn test_cancel_before_first_advance_drops_started() {
        let mut sim = SimulatedTweens::new();
        let handle = sim.create_tween(
            ItemId(3),
            &[PropertyTarget::alpha(0.0)],
            ms(10),
            EasingFunction::Linear,
        );
        sim.start(handle);
        sim.cancel(handle);
        assert!(sim.advance(ms(1)).is_empty());
    }

    #[test]
    fn test_zero_duration_ends_on_next_advance() {
        let mut sim = SimulatedTweens::new();
        let handle = sim.create_tween(
            ItemId(4),
            &[PropertyTarget::alpha(0.0)],
            Duration::ZERO,
            EasingFunction::Linear,
        );
        sim.start(handle);
        let events = sim.advance(Duration::ZERO);
        assert_eq!(
            events,
            vec![TweenEvent::Started(handle), TweenEvent::Ended(handle)]
        );
        assert_eq!(sim.value(ItemId(4), ItemProperty::Alpha), 0.0);
    }

    #[test]
    fn test_interrupt_reports_cancel_then_end() {
        let mut sim = SimulatedTweens::new();
        let handle = sim.create_tween(
            ItemId(5),
            &[PropertyTarget::alpha(0.0)],
            ms(10),
            EasingFunction::Linear,
        );
        sim.start(handle);
        assert_eq!(
            sim.interrupt(handle),
            vec![TweenEvent::Cancelled(handle), TweenEvent::Ended(handle)]
        );
        assert!(sim.interrupt(handle).is_empty());
    }
}
