//! Daily exercise selection.
//!
//! Picks an ordered set of exercises for one day's minute budget:
//! - Knapsack DP over integer minutes (default)
//! - Greedy MET-first fill, used only when the budget is larger than the
//!   configured DP ceiling
//! - A final reorder so neighbouring exercises target different body parts
//!   whenever the chosen set allows it

use crate::config::PlannerConfig;
use crate::types::{DailySelection, Exercise, WeekUsage};
use crate::Catalog;

/// Everything a strategy needs to plan one day
#[derive(Clone, Copy, Debug)]
pub struct DailyRequest<'a> {
    pub catalog: &'a [Exercise],
    pub available_minutes: u32,
    pub body_weight_kg: f64,
    /// Exercises and body parts used earlier this week (read-only)
    pub usage: &'a WeekUsage,
}

/// A way of choosing one day's exercises
pub trait DailyStrategy {
    fn name(&self) -> &'static str;

    /// Choose exercises whose total effective minutes fit the request's budget
    fn select(&self, request: &DailyRequest<'_>) -> DailySelection;
}

// ============================================================================
// Knapsack strategy
// ============================================================================

/// Bounded 0/1 knapsack over minutes, maximizing calories minus penalties
#[derive(Clone, Debug)]
pub struct KnapsackStrategy {
    config: PlannerConfig,
}

/// Best plan found for "at most t minutes"
#[derive(Clone, Debug, Default)]
struct Cell {
    score: f64,
    picks: Vec<usize>,
}

impl KnapsackStrategy {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Repeat penalty for one request: the configured value, raised above the
    /// whole catalog's burn so a repeat can never outscore leaving it out
    fn repeat_penalty(&self, request: &DailyRequest<'_>) -> f64 {
        let ceiling: f64 = request
            .catalog
            .iter()
            .map(|e| e.calories(request.body_weight_kg).max(0.0))
            .sum();
        self.config.repeat_penalty.max(ceiling + 1.0)
    }

    /// Penalty that doesn't depend on what precedes the exercise
    fn fixed_penalty(&self, exercise: &Exercise, usage: &WeekUsage, repeat_penalty: f64) -> f64 {
        let mut penalty = 0.0;
        if usage.contains_exercise(&exercise.name) {
            penalty -= repeat_penalty;
        }
        if usage.body_part_count(&exercise.body_part) > 0 {
            penalty -= self.config.weekly_body_part_penalty;
        }
        penalty
    }
}

impl DailyStrategy for KnapsackStrategy {
    fn name(&self) -> &'static str {
        "knapsack"
    }

    fn select(&self, request: &DailyRequest<'_>) -> DailySelection {
        let budget = request.available_minutes as usize;
        if budget == 0 {
            return DailySelection::default();
        }

        let catalog = request.catalog;
        let repeat_penalty = self.repeat_penalty(request);
        let mut best = vec![Cell::default(); budget + 1];

        for (index, exercise) in catalog.iter().enumerate() {
            let cost = exercise.effective_minutes(self.config.rest_buffer_minutes) as usize;
            if cost == 0 || cost > budget {
                continue;
            }

            let gross = exercise.calories(request.body_weight_kg);
            let fixed = self.fixed_penalty(exercise, request.usage, repeat_penalty);

            // Descending t so each exercise is used at most once per pass
            for t in (cost..=budget).rev() {
                let prev = &best[t - cost];
                let follows_same_part = prev
                    .picks
                    .last()
                    .is_some_and(|&last| catalog[last].body_part == exercise.body_part);
                let adjacency = if follows_same_part {
                    -self.config.adjacent_body_part_penalty
                } else {
                    0.0
                };

                let candidate = prev.score + gross + fixed + adjacency;
                if candidate > best[t].score {
                    let mut picks = Vec::with_capacity(prev.picks.len() + 1);
                    picks.extend_from_slice(&prev.picks);
                    picks.push(index);
                    best[t] = Cell {
                        score: candidate,
                        picks,
                    };
                }
            }
        }

        // First maximum scanning upward, so ties favour the shorter day
        let mut chosen = 0;
        for t in 1..=budget {
            if best[t].score > best[chosen].score {
                chosen = t;
            }
        }

        tracing::debug!(
            "Knapsack picked {} exercises using <= {} of {} minutes (score {:.1})",
            best[chosen].picks.len(),
            chosen,
            budget,
            best[chosen].score
        );

        DailySelection::new(
            best[chosen]
                .picks
                .iter()
                .map(|&i| catalog[i].clone())
                .collect(),
        )
    }
}

// ============================================================================
// Greedy strategy
// ============================================================================

/// Highest-MET-first fill; skips repeats and same-body-part neighbours
#[derive(Clone, Debug)]
pub struct GreedyStrategy {
    rest_buffer_minutes: u32,
}

impl GreedyStrategy {
    pub fn new(rest_buffer_minutes: u32) -> Self {
        Self {
            rest_buffer_minutes,
        }
    }
}

impl DailyStrategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn select(&self, request: &DailyRequest<'_>) -> DailySelection {
        let budget = request.available_minutes;
        let mut ranked: Vec<&Exercise> = request.catalog.iter().collect();
        // Stable sort keeps catalog order among equal METs
        ranked.sort_by(|a, b| b.met.total_cmp(&a.met));

        let mut selected: Vec<Exercise> = Vec::new();
        let mut used_minutes = 0;

        for exercise in ranked {
            if used_minutes >= budget {
                break;
            }
            if request.usage.contains_exercise(&exercise.name) {
                continue;
            }
            if selected
                .last()
                .is_some_and(|last| last.body_part == exercise.body_part)
            {
                continue;
            }

            let cost = exercise.effective_minutes(self.rest_buffer_minutes);
            if cost <= budget - used_minutes {
                used_minutes += cost;
                selected.push(exercise.clone());
            }
        }

        tracing::debug!(
            "Greedy picked {} exercises using {} of {} minutes",
            selected.len(),
            used_minutes,
            budget
        );

        DailySelection::new(selected)
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Chooses a strategy per day and applies the body-part spreading pass
#[derive(Clone, Debug)]
pub struct DailyPlanner {
    config: PlannerConfig,
    knapsack: KnapsackStrategy,
    greedy: GreedyStrategy,
}

impl Default for DailyPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl DailyPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            knapsack: KnapsackStrategy::new(config.clone()),
            greedy: GreedyStrategy::new(config.rest_buffer_minutes),
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The knapsack table is bounded by `dp_minutes_ceiling`; larger days go greedy
    pub fn strategy_for(&self, available_minutes: u32) -> &dyn DailyStrategy {
        if available_minutes > self.config.dp_minutes_ceiling {
            &self.greedy
        } else {
            &self.knapsack
        }
    }

    /// Select exercises for one day.
    ///
    /// `usage` is never modified; the caller records the result into it
    /// before planning the next day.
    pub fn select_daily(
        &self,
        catalog: &Catalog,
        available_minutes: u32,
        body_weight_kg: f64,
        usage: &WeekUsage,
    ) -> DailySelection {
        if available_minutes == 0 || catalog.is_empty() {
            return DailySelection::default();
        }

        let request = DailyRequest {
            catalog: catalog.exercises(),
            available_minutes,
            body_weight_kg,
            usage,
        };
        let strategy = self.strategy_for(available_minutes);
        tracing::debug!(
            "Planning {} minutes with {} strategy",
            available_minutes,
            strategy.name()
        );

        spread_body_parts(strategy.select(&request))
    }
}

/// Select one day's exercises with the default planner settings
pub fn select_daily(
    catalog: &Catalog,
    available_minutes: u32,
    body_weight_kg: f64,
    usage: &WeekUsage,
) -> DailySelection {
    DailyPlanner::default().select_daily(catalog, available_minutes, body_weight_kg, usage)
}

/// Reorder a selection so adjacent exercises target different body parts.
///
/// Selections without an adjacent repeat are returned untouched. Otherwise
/// the body part with the most exercises left (other than the previous one)
/// goes next, ties broken by earliest position; within a body part the
/// original order is kept. This finds a valid order whenever one exists.
pub fn spread_body_parts(selection: DailySelection) -> DailySelection {
    if !selection.has_adjacent_repeat() {
        return selection;
    }

    let mut remaining: Vec<Option<Exercise>> = selection.exercises.into_iter().map(Some).collect();
    let mut ordered: Vec<Exercise> = Vec::with_capacity(remaining.len());

    while ordered.len() < remaining.len() {
        let last_part = ordered.last().map(|e| e.body_part.clone());

        // (remaining count, first position) per body part, in first-seen order
        let mut parts: Vec<(&str, usize, usize)> = Vec::new();
        for (position, slot) in remaining.iter().enumerate() {
            if let Some(exercise) = slot {
                match parts.iter_mut().find(|p| p.0 == exercise.body_part) {
                    Some(part) => part.1 += 1,
                    None => parts.push((exercise.body_part.as_str(), 1, position)),
                }
            }
        }

        let pick = parts
            .iter()
            .filter(|p| Some(p.0) != last_part.as_deref())
            .max_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)))
            .or_else(|| parts.first())
            .map(|p| p.2);

        match pick.and_then(|position| remaining[position].take()) {
            Some(exercise) => ordered.push(exercise),
            None => break,
        }
    }

    DailySelection::new(ordered)
}
