use clap::{Parser, Subcommand};
use fitplan_core::summary::{weeks_for_months, WEEKS_PER_MONTH};
use fitplan_core::*;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fitplan")]
#[command(about = "Multi-week exercise schedule optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Exercise catalog CSV (Work Name, MET, Body, Strength, time)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a multi-week exercise schedule
    Plan {
        /// Body weight in kg
        #[arg(long)]
        weight: f64,

        /// Training day as DAY=START-END, e.g. Monday=07:00-09:00 or Monday=7-9
        #[arg(long = "day", required = true)]
        days: Vec<String>,

        /// Number of weeks to plan (defaults to months * 4, then the config value)
        #[arg(long)]
        weeks: Option<u32>,

        /// Plan length in months
        #[arg(long)]
        months: Option<u32>,

        /// Target body weight in kg; prints calorie goal progress
        #[arg(long)]
        target: Option<f64>,

        /// Write the schedule as JSON
        #[arg(long)]
        export_json: Option<PathBuf>,

        /// Write the schedule as CSV
        #[arg(long)]
        export_csv: Option<PathBuf>,

        /// Only print the totals, not each day
        #[arg(long)]
        summary_only: bool,
    },

    /// Show catalog exercises ranked by fatigue-effectiveness per body part
    Catalog {
        /// Only show this body part
        #[arg(long)]
        body_part: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    fitplan_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let catalog = resolve_catalog(cli.catalog.as_deref(), &config)?;

    match cli.command {
        Commands::Plan {
            weight,
            days,
            weeks,
            months,
            target,
            export_json,
            export_csv,
            summary_only,
        } => cmd_plan(
            &catalog,
            &config,
            PlanArgs {
                weight,
                days,
                weeks,
                months,
                target,
                export_json,
                export_csv,
                summary_only,
            },
        ),
        Commands::Catalog { body_part } => cmd_catalog(&catalog, body_part.as_deref()),
    }
}

struct PlanArgs {
    weight: f64,
    days: Vec<String>,
    weeks: Option<u32>,
    months: Option<u32>,
    target: Option<f64>,
    export_json: Option<PathBuf>,
    export_csv: Option<PathBuf>,
    summary_only: bool,
}

/// Catalog from the command line, then the config, then the built-in one
fn resolve_catalog(path: Option<&Path>, config: &Config) -> Result<Cow<'static, Catalog>> {
    let catalog = match path.or(config.data.catalog_path.as_deref()) {
        Some(path) => Cow::Owned(load_catalog(path)?),
        None => Cow::Borrowed(default_catalog()),
    };

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    tracing::debug!(
        "Using catalog with {} exercises over {} body parts",
        catalog.len(),
        catalog.body_parts().len()
    );
    Ok(catalog)
}

fn cmd_plan(catalog: &Catalog, config: &Config, args: PlanArgs) -> Result<()> {
    let entries = args
        .days
        .iter()
        .map(|d| parse_day(d))
        .collect::<Result<Vec<_>>>()?;

    let total_weeks = match (args.weeks, args.months) {
        (Some(weeks), _) => weeks,
        (None, Some(months)) => weeks_for_months(months)?,
        (None, None) => config.schedule.total_weeks,
    };

    let goal = match args.target {
        Some(target) => {
            let months = args
                .months
                .unwrap_or_else(|| total_weeks.div_ceil(WEEKS_PER_MONTH));
            Some(GoalSummary::compute(args.weight, target, months, &entries)?)
        }
        None => None,
    };

    let slots = slots_from_entries(&entries);
    let outcome = Scheduler::from_config(config).run(catalog, &slots, args.weight, total_weeks)?;

    let report = PlanReport::build(
        &outcome.plans,
        args.weight,
        config.planner.rest_buffer_minutes,
        goal.as_ref(),
    );

    if !args.summary_only {
        display_plans(&outcome.plans, &report, args.weight);
    }
    display_summary(&outcome, &report, goal.as_ref());

    if let Some(path) = args.export_json {
        let path = config.export_path(&path);
        let id = write_plan_json(&path, &outcome, args.weight)?;
        println!("✓ Plan {} written to {}", id, path.display());
    }
    if let Some(path) = args.export_csv {
        let path = config.export_path(&path);
        let rows = write_plan_csv(&path, &outcome.plans, args.weight)?;
        println!("✓ {} rows written to {}", rows, path.display());
    }

    Ok(())
}

fn cmd_catalog(catalog: &Catalog, body_part: Option<&str>) -> Result<()> {
    let grouped = catalog.group_by_body_part();

    if let Some(part) = body_part {
        if !grouped.contains_key(part) {
            return Err(Error::InvalidInput(format!(
                "Unknown body part '{}'. Available: {}",
                part,
                catalog.body_parts().join(", ")
            )));
        }
    }

    for (part, exercises) in &grouped {
        if body_part.is_some_and(|wanted| wanted != part.as_str()) {
            continue;
        }
        println!("\n{}", part);
        for (rank, exercise) in exercises.iter().enumerate() {
            println!(
                "  Rank {}: {} - MET: {:.1}, Duration: {} mins, Fatigue Effectiveness: {:.1}",
                rank + 1,
                exercise.name,
                exercise.met,
                exercise.time,
                exercise.fatigue_effectiveness()
            );
        }
    }

    Ok(())
}

/// Parse `DAY=START-END`, where START/END are `HH:MM` or whole hours
fn parse_day(arg: &str) -> Result<ScheduleEntry> {
    let invalid = || Error::InvalidInput(format!("Expected DAY=START-END, got '{}'", arg));

    let (day, window) = arg.split_once('=').ok_or_else(invalid)?;
    let (start, end) = window.split_once('-').ok_or_else(invalid)?;
    let day = day.trim();
    if day.is_empty() {
        return Err(invalid());
    }

    if start.contains(':') || end.contains(':') {
        return ScheduleEntry::from_clock_times(day, start, end);
    }

    let start: i32 = start.trim().parse().map_err(|_| invalid())?;
    let end: i32 = end.trim().parse().map_err(|_| invalid())?;
    for hour in [start, end] {
        if !(0..=24).contains(&hour) {
            return Err(Error::InvalidInput(format!(
                "Hour {} in '{}' is outside 0-24",
                hour, arg
            )));
        }
    }
    Ok(ScheduleEntry::new(day, start, end))
}

fn display_plans(plans: &[WeeklyPlan], report: &PlanReport, weight: f64) {
    for (plan, week) in plans.iter().zip(&report.weeks) {
        println!("\n╭─────────────────────────────────────────╮");
        println!("│  WEEK {}", plan.week);
        println!("╰─────────────────────────────────────────╯");

        for (day_plan, day) in plan.days.iter().zip(&week.days) {
            println!(
                "\n  {} - {}h {}m (rest included), {:.2} kcal",
                day.day,
                day.minutes / 60,
                day.minutes % 60,
                day.calories
            );
            if day_plan.selection.is_empty() {
                println!("    (no exercise fits this day)");
            }
            for (index, exercise) in day_plan.selection.iter().enumerate() {
                println!(
                    "    {}. {} [{}] {} min, MET {:.1}, {:.1} kcal",
                    index + 1,
                    exercise.name,
                    exercise.body_part,
                    exercise.time,
                    exercise.met,
                    exercise.calories(weight)
                );
            }
        }
        println!("\n  Week total: {:.2} kcal", week.calories);
    }
}

fn display_summary(outcome: &ScheduleOutcome, report: &PlanReport, goal: Option<&GoalSummary>) {
    println!("\n─────────────────────────────────────────");
    println!("Weeks planned: {}", outcome.plans.len());
    println!("First week: {:.2} kcal", report.first_week_calories);
    println!("Total: {:.2} kcal", report.total_calories);
    println!("Distinct exercises used: {}", outcome.used_exercises.len());
    println!("Diversity cost: {:.1}", outcome.cumulative_cost);

    if let Some(goal) = goal {
        println!("Goal: {:.2} kcal total", goal.total_calories_to_burn);
        println!("Weekly deficit: {:.2} kcal", goal.weekly_calorie_deficit);
        if let Some(pct) = report.first_week_achievement_pct {
            println!("First week achievement: {:.2}%", pct);
        }
        if let Some(pct) = report.overall_achievement_pct {
            println!("Overall achievement: {:.2}%", pct);
        }
    }
}
