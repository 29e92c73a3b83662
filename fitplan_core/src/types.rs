//! Core domain types for the Fitplan system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their strength category
//! - Schedule entries and the per-day minute budgets derived from them
//! - Daily selections, weekly plans and the per-week usage accumulator

use crate::{Error, Result};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

// ============================================================================
// Exercise Types
// ============================================================================

/// Strength category of an exercise
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Strength {
    Low,
    Medium,
    High,
    /// Any label the catalog uses that isn't one of the three above
    Other(String),
}

impl Strength {
    /// Parse a strength label (case-insensitive, surrounding whitespace ignored)
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Strength::Low,
            "medium" => Strength::Medium,
            "high" => Strength::High,
            _ => Strength::Other(label.trim().to_string()),
        }
    }

    /// Multiplier applied to MET when ranking exercises.
    ///
    /// Unrecognized labels fall back to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Strength::Low => 1.0,
            Strength::Medium => 1.5,
            Strength::High => 2.0,
            Strength::Other(_) => 1.0,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Strength::Low => "Low",
            Strength::Medium => "Medium",
            Strength::High => "High",
            Strength::Other(label) => label,
        }
    }
}

impl From<String> for Strength {
    fn from(label: String) -> Self {
        Strength::parse(&label)
    }
}

impl From<Strength> for String {
    fn from(strength: Strength) -> Self {
        strength.label().to_string()
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog exercise
///
/// Fatigue-effectiveness is not stored: it is always derived from
/// `strength` and `met` so the two can never disagree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub met: f64,
    pub body_part: String,
    pub strength: Strength,
    /// Nominal duration in minutes
    pub time: u32,
}

impl Exercise {
    pub fn new(
        name: impl Into<String>,
        met: f64,
        body_part: impl Into<String>,
        strength: Strength,
        time: u32,
    ) -> Self {
        Self {
            name: name.into(),
            met,
            body_part: body_part.into(),
            strength,
            time,
        }
    }

    /// Ranking score combining intensity and strength category
    pub fn fatigue_effectiveness(&self) -> f64 {
        self.strength.weight() * self.met
    }

    /// Estimated kcal burned performing this exercise once
    pub fn calories(&self, body_weight_kg: f64) -> f64 {
        self.met * body_weight_kg * (f64::from(self.time) / 60.0)
    }

    /// Minutes charged against a day's budget, rest included
    pub fn effective_minutes(&self, rest_buffer_minutes: u32) -> u32 {
        self.time.saturating_add(rest_buffer_minutes)
    }
}

impl std::fmt::Display for Exercise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (Body: {}, Strength: {}, MET: {:.1}, Time: {}, Fatigue-Effectiveness: {:.1})",
            self.name,
            self.body_part,
            self.strength,
            self.met,
            self.time,
            self.fatigue_effectiveness()
        )
    }
}

// ============================================================================
// Schedule Types
// ============================================================================

/// A day's training window as the caller describes it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub start_hour: i32,
    pub end_hour: i32,
}

impl ScheduleEntry {
    pub fn new(day: impl Into<String>, start_hour: i32, end_hour: i32) -> Self {
        Self {
            day: day.into(),
            start_hour,
            end_hour,
        }
    }

    /// Build an entry from `HH:MM` clock strings.
    ///
    /// Only the hour component is kept: `07:45`-`09:10` is a two hour window.
    pub fn from_clock_times(day: impl Into<String>, start: &str, end: &str) -> Result<Self> {
        let start = parse_clock(start)?;
        let end = parse_clock(end)?;
        Ok(Self::new(day, start.hour() as i32, end.hour() as i32))
    }

    /// Minutes available for this entry, zero when the window is empty or inverted
    pub fn available_minutes(&self) -> u32 {
        let hours = (i64::from(self.end_hour) - i64::from(self.start_hour)).max(0);
        u32::try_from(hours * 60).unwrap_or(u32::MAX)
    }

    pub fn to_slot(&self) -> ScheduleSlot {
        let available_minutes = self.available_minutes();
        if available_minutes == 0 {
            tracing::warn!(
                "Schedule entry for {} ends at or before it starts ({} -> {}), planning 0 minutes",
                self.day,
                self.start_hour,
                self.end_hour
            );
        }
        ScheduleSlot {
            day: self.day.clone(),
            available_minutes,
        }
    }
}

fn parse_clock(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| Error::InvalidInput(format!("Invalid clock time '{}': {}", value, e)))
}

/// One planning day with its minute budget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: String,
    pub available_minutes: u32,
}

impl ScheduleSlot {
    pub fn new(day: impl Into<String>, available_minutes: u32) -> Self {
        Self {
            day: day.into(),
            available_minutes,
        }
    }
}

/// Convert caller schedule entries into planning slots, preserving order
pub fn slots_from_entries(entries: &[ScheduleEntry]) -> Vec<ScheduleSlot> {
    entries.iter().map(ScheduleEntry::to_slot).collect()
}

// ============================================================================
// Plan Types
// ============================================================================

/// Ordered exercises chosen for one day
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySelection {
    pub exercises: Vec<Exercise>,
}

impl DailySelection {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exercise> {
        self.exercises.iter()
    }

    /// Budget consumed, charging the rest buffer once per exercise
    pub fn total_minutes(&self, rest_buffer_minutes: u32) -> u32 {
        self.exercises
            .iter()
            .map(|e| e.effective_minutes(rest_buffer_minutes))
            .fold(0, u32::saturating_add)
    }

    pub fn calories(&self, body_weight_kg: f64) -> f64 {
        self.exercises.iter().map(|e| e.calories(body_weight_kg)).sum()
    }

    pub fn body_parts(&self) -> Vec<&str> {
        self.exercises.iter().map(|e| e.body_part.as_str()).collect()
    }

    /// True when some pair of neighbours targets the same body part
    pub fn has_adjacent_repeat(&self) -> bool {
        self.exercises
            .windows(2)
            .any(|pair| pair[0].body_part == pair[1].body_part)
    }
}

/// A day label paired with its selection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub selection: DailySelection,
}

/// Plan for one week; days keep the order the schedule declared them in
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    /// 1-based week index
    pub week: u32,
    pub days: Vec<DayPlan>,
}

impl WeeklyPlan {
    pub fn get(&self, day: &str) -> Option<&DailySelection> {
        self.days
            .iter()
            .find(|d| d.day == day)
            .map(|d| &d.selection)
    }

    pub fn calories(&self, body_weight_kg: f64) -> f64 {
        self.days
            .iter()
            .map(|d| d.selection.calories(body_weight_kg))
            .sum()
    }

    pub fn distinct_body_parts(&self) -> BTreeSet<&str> {
        self.days
            .iter()
            .flat_map(|d| d.selection.iter().map(|e| e.body_part.as_str()))
            .collect()
    }

    /// Every exercise name in the week, in day order
    pub fn exercise_names(&self) -> Vec<&str> {
        self.days
            .iter()
            .flat_map(|d| d.selection.iter().map(|e| e.name.as_str()))
            .collect()
    }
}

/// Exercises and body parts consumed so far in one week.
///
/// The weekly planner threads this through each daily call explicitly; the
/// daily planner only reads it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeekUsage {
    pub exercises: HashSet<String>,
    pub body_parts: HashMap<String, u32>,
}

impl WeekUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_exercise(&self, name: &str) -> bool {
        self.exercises.contains(name)
    }

    pub fn body_part_count(&self, body_part: &str) -> u32 {
        self.body_parts.get(body_part).copied().unwrap_or(0)
    }

    pub fn distinct_body_parts(&self) -> usize {
        self.body_parts.len()
    }

    /// Fold a finished day's selection into the running totals
    pub fn record(&mut self, selection: &DailySelection) {
        for exercise in selection.iter() {
            self.exercises.insert(exercise.name.clone());
            *self.body_parts.entry(exercise.body_part.clone()).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(strength: Strength, met: f64) -> Exercise {
        Exercise::new("Test", met, "Legs", strength, 30)
    }

    #[test]
    fn test_fatigue_effectiveness_per_strength() {
        assert_eq!(exercise(Strength::Low, 4.0).fatigue_effectiveness(), 4.0);
        assert_eq!(exercise(Strength::Medium, 4.0).fatigue_effectiveness(), 6.0);
        assert_eq!(exercise(Strength::High, 4.0).fatigue_effectiveness(), 8.0);
        assert_eq!(
            exercise(Strength::Other("Extreme".into()), 4.0).fatigue_effectiveness(),
            4.0
        );
    }

    #[test]
    fn test_fatigue_effectiveness_tracks_met() {
        let lower = exercise(Strength::High, 3.0);
        let higher = exercise(Strength::High, 3.5);
        assert!(higher.fatigue_effectiveness() > lower.fatigue_effectiveness());
    }

    #[test]
    fn test_calories() {
        let e = Exercise::new("Squat", 5.0, "Legs", Strength::High, 20);
        let expected = 5.0 * 70.0 * (20.0 / 60.0);
        assert!((e.calories(70.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_strength_parse() {
        assert_eq!(Strength::parse("High"), Strength::High);
        assert_eq!(Strength::parse(" medium "), Strength::Medium);
        assert_eq!(Strength::parse("LOW"), Strength::Low);
        assert_eq!(
            Strength::parse("Moderate"),
            Strength::Other("Moderate".into())
        );
    }

    #[test]
    fn test_strength_serde_uses_labels() {
        let e = Exercise::new("Row", 4.0, "Back", Strength::Medium, 10);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"strength\":\"Medium\""));
        let parsed: Exercise = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.strength, Strength::Medium);
    }

    #[test]
    fn test_available_minutes() {
        assert_eq!(ScheduleEntry::new("Monday", 7, 9).available_minutes(), 120);
        assert_eq!(ScheduleEntry::new("Monday", 9, 9).available_minutes(), 0);
        assert_eq!(ScheduleEntry::new("Monday", 10, 8).available_minutes(), 0);
    }

    #[test]
    fn test_available_minutes_saturates_on_huge_windows() {
        assert_eq!(
            ScheduleEntry::new("Monday", 0, 100_000_000).available_minutes(),
            u32::MAX
        );
        assert_eq!(
            ScheduleEntry::new("Monday", i32::MIN, i32::MAX).available_minutes(),
            u32::MAX
        );
        assert_eq!(
            ScheduleEntry::new("Monday", i32::MAX, i32::MIN).available_minutes(),
            0
        );
    }

    #[test]
    fn test_effective_minutes_saturates() {
        let e = Exercise::new("Endless", 3.0, "Legs", Strength::Low, u32::MAX);
        assert_eq!(e.effective_minutes(2), u32::MAX);

        let selection = DailySelection::new(vec![e.clone(), e]);
        assert_eq!(selection.total_minutes(2), u32::MAX);
    }

    #[test]
    fn test_from_clock_times_keeps_hours() {
        let entry = ScheduleEntry::from_clock_times("Friday", "07:45", "09:10").unwrap();
        assert_eq!(entry.start_hour, 7);
        assert_eq!(entry.end_hour, 9);
        assert_eq!(entry.available_minutes(), 120);
    }

    #[test]
    fn test_from_clock_times_rejects_garbage() {
        let result = ScheduleEntry::from_clock_times("Friday", "seven", "09:00");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_week_usage_record() {
        let mut usage = WeekUsage::new();
        let selection = DailySelection::new(vec![
            Exercise::new("A", 5.0, "Legs", Strength::High, 20),
            Exercise::new("B", 4.0, "Arms", Strength::Medium, 15),
            Exercise::new("C", 6.0, "Legs", Strength::Low, 25),
        ]);
        usage.record(&selection);

        assert!(usage.contains_exercise("A"));
        assert_eq!(usage.body_part_count("Legs"), 2);
        assert_eq!(usage.body_part_count("Chest"), 0);
        assert_eq!(usage.distinct_body_parts(), 2);
    }

    #[test]
    fn test_selection_helpers() {
        let selection = DailySelection::new(vec![
            Exercise::new("A", 5.0, "Legs", Strength::High, 20),
            Exercise::new("C", 6.0, "Legs", Strength::Low, 25),
        ]);
        assert_eq!(selection.total_minutes(2), 49);
        assert!(selection.has_adjacent_repeat());
        assert_eq!(selection.body_parts(), vec!["Legs", "Legs"]);
    }
}
