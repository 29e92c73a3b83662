//! Multi-week scheduling.
//!
//! The scheduler is a small frontier search over `SchedulerState`s:
//! - States are popped cheapest-first from a priority queue
//! - A pruning policy decides whether a state is worth expanding
//! - Expansion asks a `WeeklyStrategy` for the next week and applies the
//!   pure `transition` function
//!
//! With the single weekly strategy every state has exactly one successor,
//! so a run is one forward pass; the structure is what lets alternative
//! strategies compete without changing the driver.

use crate::types::{ScheduleSlot, WeeklyPlan};
use crate::weekly::{WeekOutcome, WeeklyPlanner};
use crate::{Catalog, Config, Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

// ============================================================================
// State
// ============================================================================

/// A partial schedule: the weeks planned so far and what they cost
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchedulerState {
    /// Number of weeks planned so far
    pub week_index: u32,
    /// Sum of weekly penalties; lower is better
    pub cumulative_cost: f64,
    pub plans: Vec<WeeklyPlan>,
    /// Every exercise name used in any planned week
    pub used_exercises: BTreeSet<String>,
}

impl SchedulerState {
    pub fn initial() -> Self {
        Self::default()
    }
}

/// Extend `state` by one planned week
pub fn transition(state: SchedulerState, outcome: WeekOutcome) -> SchedulerState {
    let SchedulerState {
        week_index,
        cumulative_cost,
        mut plans,
        mut used_exercises,
    } = state;

    used_exercises.extend(outcome.usage.exercises);
    plans.push(outcome.plan);

    SchedulerState {
        week_index: week_index + 1,
        cumulative_cost: cumulative_cost + outcome.cost,
        plans,
        used_exercises,
    }
}

/// Completed schedule handed back to the caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub plans: Vec<WeeklyPlan>,
    pub cumulative_cost: f64,
    pub used_exercises: BTreeSet<String>,
}

impl From<SchedulerState> for ScheduleOutcome {
    fn from(state: SchedulerState) -> Self {
        Self {
            plans: state.plans,
            cumulative_cost: state.cumulative_cost,
            used_exercises: state.used_exercises,
        }
    }
}

// ============================================================================
// Strategy and pruning seams
// ============================================================================

/// Produces the week that follows a state
pub trait WeeklyStrategy {
    fn plan_next_week(
        &self,
        state: &SchedulerState,
        catalog: &Catalog,
        slots: &[ScheduleSlot],
        body_weight_kg: f64,
    ) -> WeekOutcome;
}

impl WeeklyStrategy for WeeklyPlanner {
    fn plan_next_week(
        &self,
        state: &SchedulerState,
        catalog: &Catalog,
        slots: &[ScheduleSlot],
        body_weight_kg: f64,
    ) -> WeekOutcome {
        self.plan_week(catalog, slots, body_weight_kg, state.week_index + 1)
    }
}

/// Decides whether a dequeued state should be expanded
pub trait Pruning {
    fn admit(&mut self, state: &SchedulerState) -> bool;
}

/// Keeps the best cost seen per week index; only strict improvements pass
#[derive(Clone, Debug, Default)]
pub struct BestCostTable {
    best: HashMap<u32, f64>,
}

impl BestCostTable {
    pub fn best_cost(&self, week_index: u32) -> Option<f64> {
        self.best.get(&week_index).copied()
    }
}

impl Pruning for BestCostTable {
    fn admit(&mut self, state: &SchedulerState) -> bool {
        match self.best.get(&state.week_index) {
            Some(&best) if state.cumulative_cost >= best => false,
            _ => {
                self.best.insert(state.week_index, state.cumulative_cost);
                true
            }
        }
    }
}

// ============================================================================
// Frontier
// ============================================================================

struct Queued {
    seq: u64,
    state: SchedulerState,
}

impl Queued {
    fn key(&self) -> (f64, u64) {
        (self.state.cumulative_cost, self.seq)
    }
}

impl Ord for Queued {
    // Reversed: BinaryHeap is a max-heap and we want the cheapest, oldest state first
    fn cmp(&self, other: &Self) -> Ordering {
        let (cost, seq) = self.key();
        let (other_cost, other_seq) = other.key();
        other_cost
            .total_cmp(&cost)
            .then_with(|| other_seq.cmp(&seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

/// Priority queue of pending states ordered by (cost, insertion order)
#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: SchedulerState) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { seq, state });
    }

    pub fn pop(&mut self) -> Option<SchedulerState> {
        self.heap.pop().map(|queued| queued.state)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Drives a weekly strategy forward until the requested number of weeks
#[derive(Clone, Debug)]
pub struct Scheduler<S = WeeklyPlanner> {
    strategy: S,
}

impl Scheduler<WeeklyPlanner> {
    /// Scheduler over the weekly planner with default settings
    pub fn with_defaults() -> Self {
        Self::new(WeeklyPlanner::default())
    }

    /// Build the default scheduler from configuration
    pub fn from_config(config: &Config) -> Self {
        let daily = crate::daily::DailyPlanner::new(config.planner.clone());
        Self::new(WeeklyPlanner::new(daily, config.weekly.clone()))
    }
}

impl<S: WeeklyStrategy> Scheduler<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Plan `total_weeks` weeks, pruning with a per-week best-cost table
    pub fn run(
        &self,
        catalog: &Catalog,
        slots: &[ScheduleSlot],
        body_weight_kg: f64,
        total_weeks: u32,
    ) -> Result<ScheduleOutcome> {
        self.run_with(
            catalog,
            slots,
            body_weight_kg,
            total_weeks,
            &mut BestCostTable::default(),
        )
    }

    /// Plan `total_weeks` weeks with a caller-supplied pruning policy
    pub fn run_with<P: Pruning>(
        &self,
        catalog: &Catalog,
        slots: &[ScheduleSlot],
        body_weight_kg: f64,
        total_weeks: u32,
        pruning: &mut P,
    ) -> Result<ScheduleOutcome> {
        validate_parameters(slots, body_weight_kg, total_weeks)?;

        tracing::info!(
            "Scheduling {} weeks over {} days from {} exercises",
            total_weeks,
            slots.len(),
            catalog.len()
        );

        let mut frontier = Frontier::new();
        frontier.push(SchedulerState::initial());
        let mut furthest = 0;

        while let Some(state) = frontier.pop() {
            if state.week_index == total_weeks {
                tracing::info!(
                    "Schedule complete: {} weeks, cumulative cost {:.1}",
                    total_weeks,
                    state.cumulative_cost
                );
                return Ok(state.into());
            }

            if !pruning.admit(&state) {
                tracing::debug!(
                    "Pruned state at week {} with cost {:.1}",
                    state.week_index,
                    state.cumulative_cost
                );
                continue;
            }

            let outcome = self
                .strategy
                .plan_next_week(&state, catalog, slots, body_weight_kg);
            let next = transition(state, outcome);
            furthest = furthest.max(next.week_index);
            frontier.push(next);
        }

        tracing::warn!(
            "Scheduler exhausted after {} of {} weeks",
            furthest,
            total_weeks
        );
        Err(Error::SchedulerExhausted {
            reached: furthest,
            requested: total_weeks,
        })
    }
}

fn validate_parameters(slots: &[ScheduleSlot], body_weight_kg: f64, total_weeks: u32) -> Result<()> {
    if !body_weight_kg.is_finite() || body_weight_kg <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Body weight must be a positive number of kg, got {}",
            body_weight_kg
        )));
    }
    if total_weeks == 0 {
        return Err(Error::InvalidInput("Total weeks must be at least 1".into()));
    }

    let mut seen = BTreeSet::new();
    if let Some(slot) = slots.iter().find(|slot| !seen.insert(slot.day.as_str())) {
        return Err(Error::InvalidInput(format!(
            "Day '{}' is scheduled more than once",
            slot.day
        )));
    }
    Ok(())
}

/// Plan `total_weeks` weeks with default settings and return the weekly plans
pub fn schedule(
    catalog: &Catalog,
    slots: &[ScheduleSlot],
    body_weight_kg: f64,
    total_weeks: u32,
) -> Result<Vec<WeeklyPlan>> {
    Scheduler::with_defaults()
        .run(catalog, slots, body_weight_kg, total_weeks)
        .map(|outcome| outcome.plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exercise, Strength, WeekUsage};
    use std::cell::Cell;

    fn slots() -> Vec<ScheduleSlot> {
        vec![
            ScheduleSlot::new("Monday", 120),
            ScheduleSlot::new("Thursday", 60),
        ]
    }

    #[test]
    fn test_returns_exactly_total_weeks_in_order() {
        let catalog = crate::catalog::default_catalog();
        let plans = schedule(catalog, &slots(), 70.0, 4).unwrap();

        assert_eq!(plans.len(), 4);
        let weeks: Vec<_> = plans.iter().map(|p| p.week).collect();
        assert_eq!(weeks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_each_week_is_unique_internally() {
        let catalog = crate::catalog::default_catalog();
        let plans = schedule(catalog, &slots(), 70.0, 3).unwrap();

        for plan in &plans {
            let names = plan.exercise_names();
            let unique: BTreeSet<_> = names.iter().collect();
            assert_eq!(names.len(), unique.len(), "Week {} repeats", plan.week);
        }
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let catalog = crate::catalog::default_catalog();
        assert!(matches!(
            schedule(catalog, &slots(), 0.0, 4),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            schedule(catalog, &slots(), -70.0, 4),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            schedule(catalog, &slots(), f64::NAN, 4),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            schedule(catalog, &slots(), 70.0, 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_days() {
        let catalog = crate::catalog::default_catalog();
        let slots = vec![
            ScheduleSlot::new("Monday", 60),
            ScheduleSlot::new("Tuesday", 30),
            ScheduleSlot::new("Monday", 90),
        ];
        match schedule(catalog, &slots, 70.0, 2) {
            Err(Error::InvalidInput(message)) => assert!(message.contains("Monday")),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_cumulative_cost_and_history() {
        let catalog = Catalog::new(vec![
            Exercise::new("Squat", 5.0, "Legs", Strength::High, 20),
            Exercise::new("Lunge", 4.0, "Legs", Strength::Medium, 15),
        ]);
        let outcome = Scheduler::with_defaults()
            .run(&catalog, &[ScheduleSlot::new("Monday", 45)], 70.0, 3)
            .unwrap();

        // One body part per week is under the diversity threshold every week
        assert_eq!(outcome.cumulative_cost, 150.0);
        assert_eq!(outcome.plans.len(), 3);
        assert!(outcome.used_exercises.contains("Squat"));
    }

    #[test]
    fn test_empty_catalog_still_yields_all_weeks() {
        let plans = schedule(&Catalog::default(), &slots(), 70.0, 2).unwrap();
        assert_eq!(plans.len(), 2);
        assert!(plans
            .iter()
            .all(|p| p.days.iter().all(|d| d.selection.is_empty())));
    }

    struct RejectAll;

    impl Pruning for RejectAll {
        fn admit(&mut self, _state: &SchedulerState) -> bool {
            false
        }
    }

    #[test]
    fn test_exhausted_frontier_is_an_error() {
        let catalog = crate::catalog::default_catalog();
        let result =
            Scheduler::with_defaults().run_with(catalog, &slots(), 70.0, 4, &mut RejectAll);

        assert!(matches!(
            result,
            Err(Error::SchedulerExhausted {
                reached: 0,
                requested: 4
            })
        ));
    }

    /// Counts calls so the single-successor shape is observable
    struct CountingStrategy {
        calls: Cell<u32>,
    }

    impl WeeklyStrategy for CountingStrategy {
        fn plan_next_week(
            &self,
            state: &SchedulerState,
            _catalog: &Catalog,
            _slots: &[ScheduleSlot],
            _body_weight_kg: f64,
        ) -> WeekOutcome {
            self.calls.set(self.calls.get() + 1);
            WeekOutcome {
                plan: WeeklyPlan {
                    week: state.week_index + 1,
                    days: vec![],
                },
                cost: 1.0,
                usage: WeekUsage::new(),
            }
        }
    }

    #[test]
    fn test_one_expansion_per_week() {
        let scheduler = Scheduler::new(CountingStrategy {
            calls: Cell::new(0),
        });
        let mut table = BestCostTable::default();
        let outcome = scheduler
            .run_with(&Catalog::default(), &[], 70.0, 5, &mut table)
            .unwrap();

        assert_eq!(scheduler.strategy.calls.get(), 5);
        assert_eq!(outcome.cumulative_cost, 5.0);
        assert_eq!(table.best_cost(0), Some(0.0));
        assert_eq!(table.best_cost(4), Some(4.0));
        assert_eq!(table.best_cost(5), None);
    }

    #[test]
    fn test_best_cost_table_requires_strict_improvement() {
        let mut table = BestCostTable::default();
        let mut state = SchedulerState::initial();
        state.cumulative_cost = 10.0;

        assert!(table.admit(&state));
        assert!(!table.admit(&state));

        state.cumulative_cost = 9.5;
        assert!(table.admit(&state));
        assert_eq!(table.best_cost(0), Some(9.5));
    }

    #[test]
    fn test_frontier_pops_cheapest_then_oldest() {
        let mut frontier = Frontier::new();
        for (week_index, cost) in [(1, 5.0), (2, 1.0), (3, 1.0)] {
            frontier.push(SchedulerState {
                week_index,
                cumulative_cost: cost,
                ..SchedulerState::default()
            });
        }

        let order: Vec<_> = std::iter::from_fn(|| frontier.pop())
            .map(|s| s.week_index)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_transition_accumulates() {
        let catalog = crate::catalog::default_catalog();
        let planner = WeeklyPlanner::default();
        let outcome = planner.plan_week(catalog, &slots(), 70.0, 1);
        let week_names: BTreeSet<String> = outcome.usage.exercises.iter().cloned().collect();

        let next = transition(SchedulerState::initial(), outcome);
        assert_eq!(next.week_index, 1);
        assert_eq!(next.plans.len(), 1);
        assert_eq!(next.used_exercises, week_names);
    }
}
