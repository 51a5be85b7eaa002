// src/bin/calendar_timeout.rs
use clap::{Arg, ArgAction, Command};
use std::process;
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
use commands::*;

fn schedule_args(command: Command) -> Command {
    command
        .arg(Arg::new("file")
            .short('f')
            .long("file")
            .value_name("PATH")
            .help("Read the schedule from a JSON file (field flags are ignored)"))
        .arg(Arg::new("second")
            .long("second")
            .value_name("EXPR")
            .help("Second expression")
            .default_value("0"))
        .arg(Arg::new("minute")
            .long("minute")
            .value_name("EXPR")
            .help("Minute expression")
            .default_value("0"))
        .arg(Arg::new("hour")
            .long("hour")
            .value_name("EXPR")
            .help("Hour expression")
            .default_value("0"))
        .arg(Arg::new("day_of_month")
            .long("day-of-month")
            .value_name("EXPR")
            .help("Day-of-month expression (1-31, Last, -N, 2nd Mon)")
            .default_value("*"))
        .arg(Arg::new("day_of_week")
            .long("day-of-week")
            .value_name("EXPR")
            .help("Day-of-week expression (0-7, Sun-Sat)")
            .default_value("*"))
        .arg(Arg::new("month")
            .long("month")
            .value_name("EXPR")
            .help("Month expression (1-12, Jan-Dec)")
            .default_value("*"))
        .arg(Arg::new("year")
            .long("year")
            .value_name("EXPR")
            .help("Year expression")
            .default_value("*"))
        .arg(Arg::new("timezone")
            .short('z')
            .long("timezone")
            .value_name("TZ")
            .help("Timezone id of the schedule, e.g. Europe/Berlin"))
        .arg(Arg::new("start")
            .long("start")
            .value_name("RFC3339")
            .help("No timeout before this instant"))
        .arg(Arg::new("end")
            .long("end")
            .value_name("RFC3339")
            .help("No timeout after this instant"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let app = Command::new("calendar-timeout")
        .version(env!("CARGO_PKG_VERSION"))
        .author("SNM Maurya <inxmaurya@gmail.com>")
        .about("Calendar Timeout - compute timeouts of calendar schedule expressions")
        .subcommand(schedule_args(
            Command::new("first")
                .about("Print the first timeout of a schedule")
        ))
        .subcommand(schedule_args(
            Command::new("next")
                .about("Print the next timeouts of a schedule")
                .arg(Arg::new("from")
                    .long("from")
                    .value_name("RFC3339")
                    .help("Compute timeouts after this instant (default: now)"))
                .arg(Arg::new("count")
                    .short('n')
                    .long("count")
                    .value_name("NUMBER")
                    .help("Number of timeouts to print")
                    .default_value("5"))
                .arg(Arg::new("json")
                    .long("json")
                    .help("Print timeouts as a JSON array")
                    .action(ArgAction::SetTrue))
        ))
        .subcommand(
            Command::new("compare")
                .about("Check whether two schedule files describe the same schedule")
                .arg(Arg::new("first")
                    .help("First schedule JSON file")
                    .required(true))
                .arg(Arg::new("second")
                    .help("Second schedule JSON file")
                    .required(true))
        )
        .subcommand(schedule_args(
            Command::new("watch")
                .about("Wait for each timeout of a schedule and report it")
        ));

    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("first", sub_matches)) => first_command(sub_matches).await,
        Some(("next", sub_matches)) => next_command(sub_matches).await,
        Some(("compare", sub_matches)) => compare_command(sub_matches).await,
        Some(("watch", sub_matches)) => watch_command(sub_matches).await,
        _ => {
            println!("No command specified. Use --help for usage information.");
            process::exit(1);
        }
    }
}
