//! Exercise catalog loading and the built-in default catalog.
//!
//! Catalog files are CSV with the columns `Work Name, MET, Body, Strength,
//! time`. Rows that are missing a field or carry unusable numbers are
//! skipped rather than failing the whole load.

use crate::types::{Exercise, Strength};
use crate::Result;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Ordered, read-only list of exercises the planners choose from
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

/// A raw catalog row; every column is optional so incomplete rows can be skipped
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Work Name")]
    name: Option<String>,
    #[serde(rename = "MET")]
    met: Option<String>,
    #[serde(rename = "Body")]
    body: Option<String>,
    #[serde(rename = "Strength")]
    strength: Option<String>,
    #[serde(rename = "time")]
    time: Option<String>,
}

impl CatalogRow {
    /// Convert to an exercise, or explain why the row is unusable
    fn into_exercise(self) -> std::result::Result<Exercise, String> {
        let name = required(self.name, "Work Name")?;
        let met = required(self.met, "MET")?;
        let body = required(self.body, "Body")?;
        let strength = required(self.strength, "Strength")?;
        let time = required(self.time, "time")?;

        let met: f64 = met
            .parse()
            .map_err(|_| format!("MET '{}' is not a number", met))?;
        if !met.is_finite() || met <= 0.0 {
            return Err(format!("MET {} must be positive", met));
        }

        let time: u32 = time
            .parse()
            .map_err(|_| format!("time '{}' is not a whole number of minutes", time))?;
        if time == 0 {
            return Err("time must be positive".to_string());
        }

        Ok(Exercise::new(name, met, body, Strength::parse(&strength), time))
    }
}

fn required(value: Option<String>, column: &str) -> std::result::Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(format!("missing {}", column)),
    }
}

/// Load a catalog from a CSV file
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let file = std::fs::File::open(path)?;
    let catalog = parse_catalog(file)?;
    tracing::info!(
        "Loaded {} exercises from {:?}",
        catalog.len(),
        path
    );
    Ok(catalog)
}

/// Parse catalog CSV from any reader
pub fn parse_catalog<R: Read>(reader: R) -> Result<Catalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut exercises = Vec::new();
    for (index, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping catalog line {}: {}", line, e);
                continue;
            }
        };

        match row.into_exercise() {
            Ok(exercise) => exercises.push(exercise),
            Err(reason) => tracing::warn!("Skipping catalog line {}: {}", line, reason),
        }
    }

    Ok(Catalog::new(exercises))
}

impl Catalog {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.name == name)
    }

    /// Distinct body part labels, sorted
    pub fn body_parts(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self
            .exercises
            .iter()
            .map(|e| e.body_part.as_str())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        parts.sort_unstable();
        parts
    }

    /// Exercises grouped by body part, strongest fatigue-effectiveness first
    pub fn group_by_body_part(&self) -> BTreeMap<String, Vec<Exercise>> {
        let mut grouped: BTreeMap<String, Vec<Exercise>> = BTreeMap::new();
        for exercise in &self.exercises {
            grouped
                .entry(exercise.body_part.clone())
                .or_default()
                .push(exercise.clone());
        }

        for (body_part, exercises) in grouped.iter_mut() {
            exercises.sort_by(|a, b| {
                b.fatigue_effectiveness()
                    .total_cmp(&a.fatigue_effectiveness())
            });
            tracing::debug!("Ranked {} exercises for {}", exercises.len(), body_part);
        }

        grouped
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if exercise.name.is_empty() {
                errors.push("Exercise has empty name".to_string());
            } else if !seen.insert(exercise.name.as_str()) {
                errors.push(format!("Duplicate exercise name '{}'", exercise.name));
            }
            if exercise.body_part.is_empty() {
                errors.push(format!("Exercise '{}' has empty body part", exercise.name));
            }
            if !exercise.met.is_finite() || exercise.met <= 0.0 {
                errors.push(format!(
                    "Exercise '{}' has non-positive MET {}",
                    exercise.name, exercise.met
                ));
            }
            if exercise.time == 0 {
                errors.push(format!("Exercise '{}' has zero duration", exercise.name));
            }
        }

        errors
    }
}

/// Builds the built-in catalog used when no CSV is configured
fn build_default_catalog() -> Catalog {
    use Strength::{High, Low, Medium};

    let rows: [(&str, f64, &str, Strength, u32); 18] = [
        ("Barbell Back Squat", 6.0, "Legs", High, 20),
        ("Walking Lunge", 4.0, "Legs", Medium, 15),
        ("Step-up", 4.5, "Legs", Low, 15),
        ("Bench Press", 5.0, "Chest", High, 20),
        ("Push-up", 3.8, "Chest", Medium, 10),
        ("Incline Dumbbell Fly", 3.5, "Chest", Low, 15),
        ("Deadlift", 6.0, "Back", High, 20),
        ("Bent-over Row", 5.0, "Back", Medium, 15),
        ("Lat Pulldown", 3.5, "Back", Low, 15),
        ("Overhead Press", 5.0, "Shoulders", High, 15),
        ("Lateral Raise", 3.0, "Shoulders", Low, 10),
        ("Barbell Curl", 3.5, "Arms", Medium, 10),
        ("Triceps Dip", 3.8, "Arms", Medium, 10),
        ("Plank", 3.0, "Core", Low, 10),
        ("Hanging Leg Raise", 4.0, "Core", Medium, 10),
        ("Jump Rope", 11.0, "Cardio", High, 15),
        ("Stationary Bike", 7.0, "Cardio", Medium, 30),
        ("Rowing Machine", 7.0, "Cardio", Medium, 20),
    ];

    Catalog::new(
        rows.into_iter()
            .map(|(name, met, body, strength, time)| Exercise::new(name, met, body, strength, time))
            .collect(),
    )
}
