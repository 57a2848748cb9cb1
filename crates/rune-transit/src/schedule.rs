//! Cross-category start ordering.
//!
//! When pending work is flushed, a [`ScheduleRule`] decides for every pending
//! category whether it starts now or after a delay. The coordinator then
//! launches categories in [`LAUNCH_ORDER`].
//!
//! The default rule lets removals clear space first, starts repositions and
//! replacements once removals are done, and holds insertions until all prior
//! motion has finished so new items land in their final slot.

use std::time::Duration;

use crate::types::{Category, CategoryMap};

/// Order in which categories are launched within one flush.
pub const LAUNCH_ORDER: [Category; 4] = [
    Category::Remove,
    Category::Reposition,
    Category::Replace,
    Category::Insert,
];

/// When a category's pending batch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Immediate,
    /// Held as a deferred-ready batch until the delay elapses. A zero delay
    /// still defers to the next timer pass.
    Deferred(Duration),
}

impl Launch {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    pub fn delay(&self) -> Duration {
        match self {
            Self::Immediate => Duration::ZERO,
            Self::Deferred(delay) => *delay,
        }
    }
}

/// Input to a schedule rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingSummary {
    /// Whether each category has pending work.
    pub pending: CategoryMap<bool>,
    /// Configured duration of each category.
    pub durations: CategoryMap<Duration>,
}

/// Launch decision per category. `None` leaves the category pending.
pub type SchedulePlan = CategoryMap<Option<Launch>>;

/// Caller-supplied replacement for [`default_schedule`].
pub type ScheduleRule = fn(&PendingSummary) -> SchedulePlan;

/// The default ordering between categories.
pub fn default_schedule(summary: &PendingSummary) -> SchedulePlan {
    let removals = summary.pending.remove;
    let repositions = summary.pending.reposition;
    let replacements = summary.pending.replace;
    let insertions = summary.pending.insert;

    let duration_if = |pending: bool, category: Category| {
        if pending {
            summary.durations[category]
        } else {
            Duration::ZERO
        }
    };
    let remove_duration = duration_if(removals, Category::Remove);
    let reposition_duration = duration_if(repositions, Category::Reposition);
    let replace_duration = duration_if(replacements, Category::Replace);

    let mut plan = SchedulePlan::default();

    if removals {
        plan.remove = Some(Launch::Immediate);
    }

    let after_removals = if removals {
        Launch::Deferred(remove_duration)
    } else {
        Launch::Immediate
    };
    if repositions {
        plan.reposition = Some(after_removals);
    }
    if replacements {
        plan.replace = Some(after_removals);
    }

    if insertions {
        plan.insert = Some(if removals || repositions || replacements {
            Launch::Deferred(remove_duration + reposition_duration.max(replace_duration))
        } else {
            Launch::Immediate
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(insert: bool, remove: bool, reposition: bool, replace: bool) -> PendingSummary {
        PendingSummary {
            pending: CategoryMap {
                insert,
                remove,
                reposition,
                replace,
            },
            durations: CategoryMap {
                insert: Duration::from_millis(120),
                remove: Duration::from_millis(150),
                reposition: Duration::from_millis(250),
                replace: Duration::from_millis(300),
            },
        }
    }

    #[test]
    fn test_inserts_alone_start_immediately() {
        let plan = default_schedule(&summary(true, false, false, false));
        assert_eq!(plan.insert, Some(Launch::Immediate));
        assert_eq!(plan.remove, None);
        assert_eq!(plan.reposition, None);
        assert_eq!(plan.replace, None);
    }

    #[test]
    fn test_repositions_wait_for_removals() {
        let plan = default_schedule(&summary(false, true, true, false));
        assert_eq!(plan.remove, Some(Launch::Immediate));
        assert_eq!(
            plan.reposition,
            Some(Launch::Deferred(Duration::from_millis(150)))
        );
    }

    #[test]
    fn test_replacements_without_removals_start_immediately() {
        let plan = default_schedule(&summary(false, false, true, true));
        assert_eq!(plan.reposition, Some(Launch::Immediate));
        assert_eq!(plan.replace, Some(Launch::Immediate));
    }

    #[test]
    fn test_inserts_wait_for_everything() {
        let plan = default_schedule(&summary(true, true, true, true));
        // 150 remove + max(250 reposition, 300 replace)
        assert_eq!(
            plan.insert,
            Some(Launch::Deferred(Duration::from_millis(450)))
        );
    }

    #[test]
    fn test_insert_delay_ignores_idle_categories() {
        let plan = default_schedule(&summary(true, false, true, false));
        assert_eq!(
            plan.insert,
            Some(Launch::Deferred(Duration::from_millis(250)))
        );

        let plan = default_schedule(&summary(true, true, false, false));
        assert_eq!(
            plan.insert,
            Some(Launch::Deferred(Duration::from_millis(150)))
        );
    }

    #[test]
    fn test_zero_remove_duration_still_defers() {
        let mut s = summary(false, true, true, false);
        s.durations.remove = Duration::ZERO;
        let plan = default_schedule(&s);
        assert_eq!(plan.reposition, Some(Launch::Deferred(Duration::ZERO)));
        assert!(plan.reposition.unwrap().is_deferred());
    }

    #[test]
    fn test_nothing_pending_yields_empty_plan() {
        let plan = default_schedule(&summary(false, false, false, false));
        assert_eq!(plan, SchedulePlan::default());
    }
}
