//! Weekly planning: runs the daily planner over each scheduled day.
//!
//! One `WeekUsage` accumulator is threaded through the week so later days
//! see which exercises and body parts earlier days already used.

use crate::config::WeeklyConfig;
use crate::daily::DailyPlanner;
use crate::types::{DayPlan, ScheduleSlot, WeekUsage, WeeklyPlan};
use crate::Catalog;

/// Result of planning one week
#[derive(Clone, Debug, PartialEq)]
pub struct WeekOutcome {
    pub plan: WeeklyPlan,
    /// Diversity penalty for the week; lower is better
    pub cost: f64,
    pub usage: WeekUsage,
}

/// Plans a week day by day and scores its body-part diversity
#[derive(Clone, Debug, Default)]
pub struct WeeklyPlanner {
    daily: DailyPlanner,
    config: WeeklyConfig,
}

impl WeeklyPlanner {
    pub fn new(daily: DailyPlanner, config: WeeklyConfig) -> Self {
        Self { daily, config }
    }

    pub fn daily(&self) -> &DailyPlanner {
        &self.daily
    }

    /// Plan `slots` in the order given as week number `week` (1-based)
    pub fn plan_week(
        &self,
        catalog: &Catalog,
        slots: &[ScheduleSlot],
        body_weight_kg: f64,
        week: u32,
    ) -> WeekOutcome {
        let mut usage = WeekUsage::new();
        let mut days = Vec::with_capacity(slots.len());

        for slot in slots {
            let selection =
                self.daily
                    .select_daily(catalog, slot.available_minutes, body_weight_kg, &usage);

            tracing::debug!(
                "Week {} {}: {} exercises, {:.1} kcal",
                week,
                slot.day,
                selection.len(),
                selection.calories(body_weight_kg)
            );

            usage.record(&selection);
            days.push(DayPlan {
                day: slot.day.clone(),
                selection,
            });
        }

        let cost = self.diversity_cost(&usage);
        WeekOutcome {
            plan: WeeklyPlan { week, days },
            cost,
            usage,
        }
    }

    /// Flat penalty when the week touched too few distinct body parts
    pub fn diversity_cost(&self, usage: &WeekUsage) -> f64 {
        let distinct = usage.distinct_body_parts();
        if distinct < self.config.diversity_threshold {
            tracing::debug!(
                "Only {} distinct body parts (< {}), adding diversity penalty {}",
                distinct,
                self.config.diversity_threshold,
                self.config.diversity_penalty
            );
            self.config.diversity_penalty
        } else {
            0.0
        }
    }
}

/// Plan one week with default settings
pub fn plan_week(
    catalog: &Catalog,
    slots: &[ScheduleSlot],
    body_weight_kg: f64,
    week: u32,
) -> WeekOutcome {
    WeeklyPlanner::default().plan_week(catalog, slots, body_weight_kg, week)
}
