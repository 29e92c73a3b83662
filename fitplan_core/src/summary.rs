//! Weight-loss goal summaries and calorie reports for finished plans.

use crate::types::{ScheduleEntry, WeeklyPlan};
use crate::{Error, Result};
use serde::Serialize;

/// Approximate energy content of one kilogram of body fat
pub const KCAL_PER_KG: f64 = 7700.0;

/// Planning months are counted as four weeks
pub const WEEKS_PER_MONTH: u32 = 4;

/// Number of planning weeks in `months`
pub fn weeks_for_months(months: u32) -> Result<u32> {
    months.checked_mul(WEEKS_PER_MONTH).ok_or_else(|| {
        Error::InvalidInput(format!("{} months is too long a plan", months))
    })
}

/// What the user wants to achieve and the calorie budget that implies
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoalSummary {
    pub current_weight_kg: f64,
    pub target_weight_kg: f64,
    pub months: u32,
    pub total_weeks: u32,
    pub days: Vec<String>,
    /// Training minutes available per week across all days
    pub weekly_exercise_minutes: u32,
    pub weekly_calorie_deficit: f64,
    pub total_calories_to_burn: f64,
}

impl GoalSummary {
    /// Validate the goal inputs and derive the calorie targets
    pub fn compute(
        current_weight_kg: f64,
        target_weight_kg: f64,
        months: u32,
        entries: &[ScheduleEntry],
    ) -> Result<Self> {
        for (label, value) in [("Current", current_weight_kg), ("Target", target_weight_kg)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} weight must be a positive number of kg, got {}",
                    label, value
                )));
            }
        }
        if target_weight_kg >= current_weight_kg {
            return Err(Error::InvalidInput(
                "Target weight should be less than current weight".into(),
            ));
        }
        if months == 0 {
            return Err(Error::InvalidInput("Plan must cover at least one month".into()));
        }
        if entries.is_empty() {
            return Err(Error::InvalidInput(
                "Select at least one exercise day".into(),
            ));
        }
        if let Some(entry) = entries.iter().find(|e| e.start_hour >= e.end_hour) {
            return Err(Error::InvalidInput(format!(
                "Start time for {} should be earlier than end time",
                entry.day
            )));
        }

        let total_weeks = weeks_for_months(months)?;
        let total_loss = current_weight_kg - target_weight_kg;
        let total_calories_to_burn = total_loss * KCAL_PER_KG;

        Ok(Self {
            current_weight_kg,
            target_weight_kg,
            months,
            total_weeks,
            days: entries.iter().map(|e| e.day.clone()).collect(),
            weekly_exercise_minutes: entries
                .iter()
                .map(ScheduleEntry::available_minutes)
                .fold(0, u32::saturating_add),
            weekly_calorie_deficit: total_calories_to_burn / f64::from(total_weeks),
            total_calories_to_burn,
        })
    }
}

/// One day of a report
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayReport {
    pub day: String,
    pub exercise_count: usize,
    /// Exercise time plus rest between consecutive exercises
    pub minutes: u32,
    pub calories: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeekReport {
    pub week: u32,
    pub days: Vec<DayReport>,
    pub calories: f64,
}

/// Calorie totals for a schedule, optionally measured against a goal
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanReport {
    pub weeks: Vec<WeekReport>,
    pub first_week_calories: f64,
    pub total_calories: f64,
    /// First week's burn as a percentage of the weekly deficit
    pub first_week_achievement_pct: Option<f64>,
    /// Whole plan's burn as a percentage of the total calories to burn
    pub overall_achievement_pct: Option<f64>,
}

impl PlanReport {
    pub fn build(
        plans: &[WeeklyPlan],
        body_weight_kg: f64,
        rest_buffer_minutes: u32,
        goal: Option<&GoalSummary>,
    ) -> Self {
        let weeks: Vec<WeekReport> = plans
            .iter()
            .map(|plan| week_report(plan, body_weight_kg, rest_buffer_minutes))
            .collect();

        let first_week_calories = weeks.first().map(|w| w.calories).unwrap_or(0.0);
        let total_calories = weeks.iter().map(|w| w.calories).sum();

        let (first_week_achievement_pct, overall_achievement_pct) = match goal {
            Some(goal) => (
                Some(percentage(first_week_calories, goal.weekly_calorie_deficit)),
                Some(percentage(total_calories, goal.total_calories_to_burn)),
            ),
            None => (None, None),
        };

        Self {
            weeks,
            first_week_calories,
            total_calories,
            first_week_achievement_pct,
            overall_achievement_pct,
        }
    }
}

fn week_report(plan: &WeeklyPlan, body_weight_kg: f64, rest_buffer_minutes: u32) -> WeekReport {
    let days: Vec<DayReport> = plan
        .days
        .iter()
        .map(|day| {
            let count = day.selection.len();
            let exercise_minutes: u32 = day.selection.iter().map(|e| e.time).sum();
            let rests = count.saturating_sub(1) as u32;
            DayReport {
                day: day.day.clone(),
                exercise_count: count,
                minutes: exercise_minutes + rests * rest_buffer_minutes,
                calories: day.selection.calories(body_weight_kg),
            }
        })
        .collect();

    let calories = days.iter().map(|d| d.calories).sum();
    WeekReport {
        week: plan.week,
        days,
        calories,
    }
}

fn percentage(achieved: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        achieved / goal * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DailySelection, DayPlan, Exercise, Strength};

    fn entries() -> Vec<ScheduleEntry> {
        vec![
            ScheduleEntry::new("Monday", 7, 9),
            ScheduleEntry::new("Thursday", 18, 19),
        ]
    }

    #[test]
    fn test_goal_summary() {
        let goal = GoalSummary::compute(80.0, 76.0, 1, &entries()).unwrap();

        assert_eq!(goal.total_weeks, 4);
        assert_eq!(goal.weekly_exercise_minutes, 180);
        assert!((goal.total_calories_to_burn - 30_800.0).abs() < 1e-6);
        assert!((goal.weekly_calorie_deficit - 7_700.0).abs() < 1e-6);
        assert_eq!(goal.days, vec!["Monday", "Thursday"]);
    }

    #[test]
    fn test_goal_rejects_overlong_plan() {
        let result = GoalSummary::compute(80.0, 76.0, u32::MAX, &entries());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(weeks_for_months(3).unwrap(), 12);
    }

    #[test]
    fn test_goal_rejects_gain() {
        let result = GoalSummary::compute(70.0, 75.0, 1, &entries());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_goal_rejects_no_days() {
        let result = GoalSummary::compute(80.0, 75.0, 2, &[]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_goal_rejects_inverted_window() {
        let bad = vec![ScheduleEntry::new("Tuesday", 10, 9)];
        let result = GoalSummary::compute(80.0, 75.0, 2, &bad);
        match result {
            Err(Error::InvalidInput(message)) => assert!(message.contains("Tuesday")),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_report_totals() {
        let plan = WeeklyPlan {
            week: 1,
            days: vec![DayPlan {
                day: "Monday".into(),
                selection: DailySelection::new(vec![
                    Exercise::new("A", 5.0, "Legs", Strength::High, 20),
                    Exercise::new("B", 4.0, "Arms", Strength::Medium, 15),
                ]),
            }],
        };
        let mut second = plan.clone();
        second.week = 2;

        let goal = GoalSummary::compute(80.0, 79.0, 1, &entries()).unwrap();
        let report = PlanReport::build(&[plan, second], 70.0, 2, Some(&goal));

        let day = &report.weeks[0].days[0];
        assert_eq!(day.minutes, 37);
        assert_eq!(day.exercise_count, 2);

        let weekly = 5.0 * 70.0 * (20.0 / 60.0) + 4.0 * 70.0 * (15.0 / 60.0);
        assert!((report.first_week_calories - weekly).abs() < 1e-9);
        assert!((report.total_calories - 2.0 * weekly).abs() < 1e-9);

        let first_pct = report.first_week_achievement_pct.unwrap();
        assert!((first_pct - weekly / (7700.0 / 4.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_report_without_goal() {
        let report = PlanReport::build(&[], 70.0, 2, None);
        assert!(report.weeks.is_empty());
        assert_eq!(report.total_calories, 0.0);
        assert!(report.overall_achievement_pct.is_none());
    }
}
