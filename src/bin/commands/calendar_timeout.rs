// src/bin/commands/calendar_timeout.rs
use clap::ArgMatches;
use std::fs;
use std::time::Duration;
use tokio::signal;
use tokio::time::sleep;
use chrono::{DateTime, Utc};
use anyhow::{bail, Context, Result};
use colored::*;
use tracing::info;

use ::calendar_timeout::{does_schedule_match, CalendarBasedTimeout, CalendarConfig, ScheduleExpression};

// Print the first timeout of a schedule
pub async fn first_command(matches: &ArgMatches) -> Result<()> {
    let timeout = build_timeout(matches)?;

    println!("{}", "⏱  First timeout".green().bold());
    println!("Schedule: {}", timeout.schedule_expression());
    println!("Timezone: {}", timeout.timezone());

    match timeout.first_timeout() {
        Some(first) => println!("{}", first.to_rfc3339().cyan()),
        None => println!("{}", "No timeout: the schedule never fires.".yellow()),
    }

    Ok(())
}

// Print the next timeouts of a schedule
pub async fn next_command(matches: &ArgMatches) -> Result<()> {
    let timeout = build_timeout(matches)?;
    let from = match matches.get_one::<String>("from") {
        Some(from) => parse_instant(from)?,
        None => Utc::now(),
    };
    let count = parse_count(matches.get_one::<String>("count").map(String::as_str).unwrap_or("5"))?;

    let mut timeouts = Vec::with_capacity(count);
    let mut next = timeout.get_next_timeout_from(&from);
    while let Some(at) = next {
        if timeouts.len() >= count {
            break;
        }
        timeouts.push(at);
        next = timeout.get_next_timeout_from(&at);
    }

    if matches.get_flag("json") {
        let rendered: Vec<String> = timeouts.iter().map(|at| at.to_rfc3339()).collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    println!("{}", format!("⏭  Next timeouts after {}", from.to_rfc3339()).green().bold());
    println!("Schedule: {}", timeout.schedule_expression());
    println!("Timezone: {}", timeout.timezone());
    if timeouts.is_empty() {
        println!("{}", "No more timeouts.".yellow());
    }
    for (index, at) in timeouts.iter().enumerate() {
        println!("{:>4}. {}", index + 1, at.to_rfc3339().cyan());
    }

    Ok(())
}

// Compare two schedule files
pub async fn compare_command(matches: &ArgMatches) -> Result<()> {
    let first_path = matches.get_one::<String>("first").context("missing first schedule file")?;
    let second_path = matches.get_one::<String>("second").context("missing second schedule file")?;

    let first = load_schedule(first_path)?;
    let second = load_schedule(second_path)?;

    if does_schedule_match(&first, &second) {
        println!("{}", "✅ Schedules match.".green().bold());
    } else {
        println!("{}", "❌ Schedules differ.".red().bold());
        println!("  {}: {}", first_path, first);
        println!("  {}: {}", second_path, second);
    }

    Ok(())
}

// Wait for each timeout until the schedule is exhausted or Ctrl+C
pub async fn watch_command(matches: &ArgMatches) -> Result<()> {
    let timeout = build_timeout(matches)?;

    println!("{}", "👀 Watching schedule...".green().bold());
    println!("Schedule: {}", timeout.schedule_expression());
    println!("Timezone: {}", timeout.timezone());
    println!("{}", "Press Ctrl+C to stop.".green());

    let ticker = async {
        let mut next = timeout.get_next_timeout();
        while let Some(at) = next {
            let wait = (at.with_timezone(&Utc) - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            info!("Next timeout at {} (in {}s)", at.to_rfc3339(), wait.as_secs());
            sleep(wait).await;

            println!("{} {}", "🔔 Timeout".green().bold(), at.to_rfc3339());
            next = timeout.get_next_timeout_from(&at);
        }
    };

    tokio::select! {
        result = signal::ctrl_c() => {
            result.context("failed to install Ctrl+C handler")?;
            println!("\n{}", "🛑 Stopped watching.".yellow());
        }
        _ = ticker => {
            println!("{}", "ℹ️  Schedule exhausted, no more timeouts.".blue());
        }
    }

    Ok(())
}

fn build_timeout(matches: &ArgMatches) -> Result<CalendarBasedTimeout> {
    let schedule = schedule_from_matches(matches)?;
    CalendarConfig::from_env()
        .timeout(&schedule)
        .with_context(|| format!("invalid schedule [{}]", schedule))
}

fn schedule_from_matches(matches: &ArgMatches) -> Result<ScheduleExpression> {
    if let Some(path) = matches.get_one::<String>("file") {
        return load_schedule(path);
    }

    let field = |name: &str| matches.get_one::<String>(name).cloned().unwrap_or_default();
    let mut schedule = ScheduleExpression::new()
        .second(field("second"))
        .minute(field("minute"))
        .hour(field("hour"))
        .day_of_month(field("day_of_month"))
        .day_of_week(field("day_of_week"))
        .month(field("month"))
        .year(field("year"));

    if let Some(timezone) = matches.get_one::<String>("timezone") {
        schedule = schedule.timezone(timezone.as_str());
    }
    if let Some(start) = matches.get_one::<String>("start") {
        schedule = schedule.start(parse_instant(start)?);
    }
    if let Some(end) = matches.get_one::<String>("end") {
        schedule = schedule.end(parse_instant(end)?);
    }

    Ok(schedule)
}

fn load_schedule(path: &str) -> Result<ScheduleExpression> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read schedule file {}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid schedule JSON in {}", path))
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .with_context(|| format!("invalid RFC3339 instant: {}", value))
}

fn parse_count(value: &str) -> Result<usize> {
    let count: usize = value
        .trim()
        .parse()
        .with_context(|| format!("--count must be a positive number, got {}", value))?;
    if count == 0 {
        bail!("--count must be a positive number, got 0");
    }
    Ok(count)
}
