//! Per-category hook tables.
//!
//! Each category manager is built with a [`CategoryHooks`] table: plain
//! function pointers chosen once at construction. The defaults below fade
//! inserted and removed items, slide repositioned items back to their resting
//! offset and cross-fade replaced items. Swiped-away removals are not faded;
//! they stay where the swipe left them until the removal ends. Every terminal
//! outcome other than a natural end restores the resting state.

use std::fmt;

use crate::easing::EasingFunction;
use crate::request::{InsertRequest, RemoveRequest, ReplaceRequest, RepositionRequest};
use crate::tween::{TweenContext, TweenDriver};
use crate::types::{Category, ItemId, ItemProperty, PropertyTarget};

/// Builds and returns the tweens for a request that is starting.
pub type CreateHook<R> = fn(&R, &mut TweenContext<'_>);

/// Restores or finalizes an item's visual state after a lifecycle transition.
pub type LifecycleHook<R> = fn(&R, ItemId, &mut dyn TweenDriver);

/// Function table for one category.
pub struct CategoryHooks<R> {
    /// Build the tween(s) for a request; one per present target.
    pub create: CreateHook<R>,
    /// The tween ran to completion.
    pub ended_successfully: LifecycleHook<R>,
    /// The request was ended while pending or deferred.
    pub ended_before_started: LifecycleHook<R>,
    /// The running tween was cancelled.
    pub cancelled: LifecycleHook<R>,
}

impl<R> Clone for CategoryHooks<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for CategoryHooks<R> {}

impl<R> fmt::Debug for CategoryHooks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryHooks").finish_non_exhaustive()
    }
}

/// Easing a category uses unless overridden.
pub fn default_easing(category: Category) -> EasingFunction {
    match category {
        Category::Remove | Category::Reposition => EasingFunction::AccelerateDecelerate,
        Category::Insert | Category::Replace => EasingFunction::Linear,
    }
}

fn keep<R>(_: &R, _: ItemId, _: &mut dyn TweenDriver) {}

fn restore_alpha<R>(_: &R, item: ItemId, driver: &mut dyn TweenDriver) {
    driver.set_immediate_property(item, ItemProperty::Alpha, 1.0);
}

fn restore_all<R>(_: &R, item: ItemId, driver: &mut dyn TweenDriver) {
    driver.reset_item(item);
}

fn restore_removed(request: &RemoveRequest, item: ItemId, driver: &mut dyn TweenDriver) {
    if request.is_dismissed() {
        driver.set_immediate_property(item, ItemProperty::TranslationX, 0.0);
        driver.set_immediate_property(item, ItemProperty::TranslationY, 0.0);
    } else {
        driver.set_immediate_property(item, ItemProperty::Alpha, 1.0);
    }
}

pub fn insert_hooks() -> CategoryHooks<InsertRequest> {
    CategoryHooks {
        create: |request, cx| {
            if let Some(item) = request.item() {
                cx.animate(item, &[PropertyTarget::alpha(1.0)]);
            }
        },
        ended_successfully: keep,
        ended_before_started: restore_alpha,
        cancelled: restore_alpha,
    }
}

pub fn remove_hooks() -> CategoryHooks<RemoveRequest> {
    CategoryHooks {
        create: |request, cx| {
            let Some(item) = request.item() else {
                return;
            };
            if request.is_dismissed() {
                // Already off screen; the tween only times the removal.
                cx.animate(item, &[]);
            } else {
                cx.animate(item, &[PropertyTarget::alpha(0.0)]);
            }
        },
        // The container recycles the item; hand it back at rest.
        ended_successfully: restore_removed,
        ended_before_started: restore_removed,
        cancelled: restore_removed,
    }
}

pub fn reposition_hooks() -> CategoryHooks<RepositionRequest> {
    CategoryHooks {
        create: |request, cx| {
            let Some(item) = request.item() else {
                return;
            };
            let mut properties = Vec::with_capacity(2);
            if request.motion.delta_x() != 0.0 {
                properties.push(PropertyTarget::translation_x(0.0));
            }
            if request.motion.delta_y() != 0.0 {
                properties.push(PropertyTarget::translation_y(0.0));
            }
            cx.animate(item, &properties);
        },
        ended_successfully: keep,
        ended_before_started: |_, item, driver| {
            driver.set_immediate_property(item, ItemProperty::TranslationX, 0.0);
            driver.set_immediate_property(item, ItemProperty::TranslationY, 0.0);
        },
        cancelled: |request, item, driver| {
            if request.motion.delta_x() != 0.0 {
                driver.set_immediate_property(item, ItemProperty::TranslationX, 0.0);
            }
            if request.motion.delta_y() != 0.0 {
                driver.set_immediate_property(item, ItemProperty::TranslationY, 0.0);
            }
        },
    }
}

pub fn replace_hooks() -> CategoryHooks<ReplaceRequest> {
    CategoryHooks {
        create: |request, cx| {
            if let Some(old) = request.old_item() {
                cx.animate(
                    old,
                    &[
                        PropertyTarget::translation_x(request.motion.delta_x()),
                        PropertyTarget::translation_y(request.motion.delta_y()),
                        PropertyTarget::alpha(0.0),
                    ],
                );
            }
            if let Some(new) = request.new_item() {
                cx.animate(
                    new,
                    &[
                        PropertyTarget::translation_x(0.0),
                        PropertyTarget::translation_y(0.0),
                        PropertyTarget::alpha(1.0),
                    ],
                );
            }
        },
        ended_successfully: restore_all,
        ended_before_started: restore_all,
        cancelled: restore_all,
    }
}
