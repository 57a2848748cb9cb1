//! The seam to the external tween primitive.
//!
//! A [`TweenDriver`] owns the actual interpolation and the visual container's
//! item properties. The coordinator creates and starts tweens through it and
//! the host feeds the driver's lifecycle reports back as [`TweenEvent`]s via
//! [`Coordinator::handle_tween_event`](crate::coordinator::Coordinator::handle_tween_event).
//!
//! # Cancellation
//!
//! `cancel` is synchronous-to-callback from the coordinator's point of view:
//! when the coordinator cancels a tween it detaches the handle and runs the
//! cancel hook and the end chain itself before returning. After `cancel` the
//! driver must not report further events for that handle; any it does report
//! are ignored. A tween cancelled by someone other than the coordinator is
//! reported as `Cancelled` followed by `Ended`.

use std::time::Duration;

use crate::easing::EasingFunction;
use crate::types::{ItemId, ItemProperty, PropertyTarget, TweenHandle};

/// Lifecycle report from a tween driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenEvent {
    Started(TweenHandle),
    Ended(TweenHandle),
    Cancelled(TweenHandle),
}

impl TweenEvent {
    pub fn handle(&self) -> TweenHandle {
        match self {
            Self::Started(h) | Self::Ended(h) | Self::Cancelled(h) => *h,
        }
    }
}

/// Rendering-layer animation primitive plus item geometry.
pub trait TweenDriver {
    /// Build a tween driving `properties` of `target` to their target values.
    /// The tween does not run until [`start`](Self::start).
    fn create_tween(
        &mut self,
        target: ItemId,
        properties: &[PropertyTarget],
        duration: Duration,
        easing: EasingFunction,
    ) -> TweenHandle;

    fn start(&mut self, tween: TweenHandle);

    fn cancel(&mut self, tween: TweenHandle);

    /// Set a property without animating it.
    fn set_immediate_property(&mut self, target: ItemId, property: ItemProperty, value: f32);

    /// Current value of a property as displayed by the container.
    fn property_value(&self, target: ItemId, property: ItemProperty) -> f32;

    /// Reset alpha and translation to their resting values.
    fn reset_item(&mut self, target: ItemId) {
        for property in [
            ItemProperty::Alpha,
            ItemProperty::TranslationX,
            ItemProperty::TranslationY,
        ] {
            self.set_immediate_property(target, property, property.resting_value());
        }
    }
}

/// Handed to a category's `create` hook while a request is being started.
///
/// Every tween built through [`animate`](Self::animate) is recorded so the
/// manager can bind it to the request and start it once the hook returns.
pub struct TweenContext<'a> {
    driver: &'a mut dyn TweenDriver,
    duration: Duration,
    easing: EasingFunction,
    created: Vec<(ItemId, TweenHandle)>,
}

impl<'a> TweenContext<'a> {
    pub(crate) fn new(
        driver: &'a mut dyn TweenDriver,
        duration: Duration,
        easing: EasingFunction,
    ) -> Self {
        Self {
            driver,
            duration,
            easing,
            created: Vec::new(),
        }
    }

    /// Category duration for this request.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Build a tween for `item` with the category's duration and easing.
    pub fn animate(&mut self, item: ItemId, properties: &[PropertyTarget]) -> TweenHandle {
        let easing = self.easing;
        self.animate_with(item, properties, easing)
    }

    /// Build a tween for `item` with an explicit easing curve.
    pub fn animate_with(
        &mut self,
        item: ItemId,
        properties: &[PropertyTarget],
        easing: EasingFunction,
    ) -> TweenHandle {
        let handle = self
            .driver
            .create_tween(item, properties, self.duration, easing);
        self.created.push((item, handle));
        handle
    }

    pub fn set_immediate(&mut self, item: ItemId, property: ItemProperty, value: f32) {
        self.driver.set_immediate_property(item, property, value);
    }

    pub fn value(&self, item: ItemId, property: ItemProperty) -> f32 {
        self.driver.property_value(item, property)
    }

    pub(crate) fn into_created(self) -> Vec<(ItemId, TweenHandle)> {
        self.created
    }
}
