//! Plan export to JSON and CSV.
//!
//! Both writers go through the same atomic path: write a locked temp file in
//! the target directory, sync it, then rename it over the destination.

use crate::scheduler::ScheduleOutcome;
use crate::types::WeeklyPlan;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A saved schedule with provenance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDocument {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub body_weight_kg: f64,
    pub schedule: ScheduleOutcome,
}

/// One exercise of one day as a CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    week: u32,
    day: &'a str,
    order: usize,
    exercise: &'a str,
    body_part: &'a str,
    met: f64,
    minutes: u32,
    calories: f64,
}

/// Write the schedule as a JSON document, returning the document id
pub fn write_plan_json(path: &Path, outcome: &ScheduleOutcome, body_weight_kg: f64) -> Result<Uuid> {
    let document = PlanDocument {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        body_weight_kg,
        schedule: outcome.clone(),
    };

    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, &document)?;
        writer.write_all(b"\n")?;
        Ok(())
    })?;

    tracing::info!("Exported plan {} to {:?}", document.id, path);
    Ok(document.id)
}

/// Read a document written by [`write_plan_json`]
pub fn read_plan_json(path: &Path) -> Result<PlanDocument> {
    let file = File::open(path)?;
    file.lock_shared()?;
    let document = serde_json::from_reader(std::io::BufReader::new(&file));
    file.unlock()?;
    Ok(document?)
}

/// Write one row per scheduled exercise, returning the number of rows
pub fn write_plan_csv(path: &Path, plans: &[WeeklyPlan], body_weight_kg: f64) -> Result<usize> {
    let mut rows = 0;

    write_atomic(path, |writer| {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for plan in plans {
            for day in &plan.days {
                for (index, exercise) in day.selection.iter().enumerate() {
                    csv_writer.serialize(CsvRow {
                        week: plan.week,
                        day: &day.day,
                        order: index + 1,
                        exercise: &exercise.name,
                        body_part: &exercise.body_part,
                        met: exercise.met,
                        minutes: exercise.time,
                        calories: (exercise.calories(body_weight_kg) * 100.0).round() / 100.0,
                    })?;
                    rows += 1;
                }
            }
        }
        csv_writer.flush()?;
        Ok(())
    })?;

    tracing::info!("Exported {} plan rows to {:?}", rows, path);
    Ok(rows)
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    // Temp file in the same directory so the final rename stays on one filesystem
    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Wrote {:?}", path);
    Ok(())
}
