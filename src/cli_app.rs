//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use gday::core::config::Config;
use gday::core::errors::GdayError;
use gday::logger::jsonl::{JsonlConfig, JsonlWriter, LogEntry};
use gday::schedule::clock::ClockTime;
use gday::schedule::glyph::generate_repeated_glyph;
use gday::schedule::render::{RenderMode, Schedule, ScheduleIssue, render_schedule};
use gday::source::{self, Agenda, InputFormat};

/// gday: a day of appointments as half-hour blocks.
#[derive(Debug, Parser)]
#[command(
    name = "gday",
    author,
    version,
    about = "gday - Personal calendar and task management tool",
    long_about = None,
    after_help = concat!("VERSION: ", env!("CARGO_PKG_VERSION"))
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute; `show` when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Render a day's appointments as half-hour blocks.
    Show(ShowArgs),
    /// Print the glyph each block of an appointment gets.
    Glyph(GlyphArgs),
    /// View and validate configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Tsv,
    Json,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Tsv => Self::Tsv,
            FormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Args, Default)]
#[command(group(ArgGroup::new("sort").args(["sort_alpha", "sort_interleaved"])))]
struct ShowArgs {
    /// Agenda file (gcalcli TSV or JSON). `-` reads stdin.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Agenda format (default: by extension, then by content).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Only show appointments starting on this date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,
    /// Group appointments that share a title.
    #[arg(long)]
    sort_alpha: bool,
    /// Keep strict chronological order.
    #[arg(long)]
    sort_interleaved: bool,
    /// Exit with status 4 when agenda entries had to be skipped.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Args)]
struct GlyphArgs {
    /// Start time, e.g. `10:15am` or `14:30`.
    time: String,
    /// Appointment length in 30-minute blocks.
    #[arg(long, default_value_t = 1, value_name = "N")]
    blocks: u16,
    /// Appointment title; a leading emoji replaces the clock face.
    #[arg(long, default_value = "")]
    title: String,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or agenda data.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Rendered, but some agenda entries were skipped.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<GdayError> for CliError {
    fn from(value: GdayError) -> Self {
        match value {
            GdayError::Io { .. } => Self::Runtime(value.to_string()),
            _ => Self::User(value.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        None => run_show(cli, &ShowArgs::default()),
        Some(Command::Show(args)) => run_show(cli, args),
        Some(Command::Glyph(args)) => run_glyph(cli, args),
        Some(Command::Config(args)) => run_config(cli, args),
        Some(Command::Completions(args)) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn run_show(cli: &Cli, args: &ShowArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    if !config.display.color {
        control::set_override(false);
    }
    if cli.verbose {
        eprintln!(
            "[GDAY-CONFIG] loaded {} (sort={})",
            config.paths.config_file.display(),
            config.display.sort
        );
    }

    let mut activity = config
        .logging
        .enabled
        .then(|| JsonlWriter::open(JsonlConfig::from_config(&config)));
    if let Some(log) = activity.as_mut() {
        log.write_entry(&LogEntry::config_loaded(&config));
    }

    let mode = resolve_render_mode(args, config.display.sort);
    let format = args.format.map(InputFormat::from).or(config.source.format);
    let input = args.input.as_deref().or(config.source.agenda_file.as_deref());

    let agenda = match load_input(input, format, args.date) {
        Ok(agenda) => agenda,
        Err(err) => {
            if let Some(log) = activity.as_mut() {
                log.write_entry(&LogEntry::from_error(&err));
            }
            return Err(err.into());
        }
    };

    let schedule = build_schedule(agenda, mode);
    if let Some(log) = activity.as_mut() {
        log.write_schedule(&schedule);
        log.flush();
    }

    if cli.verbose {
        eprintln!(
            "[GDAY-RENDER] {} lines, {} issues, mode={mode}",
            schedule.lines.len(),
            schedule.issues.len()
        );
    }

    match output_mode(cli) {
        OutputMode::Human => {
            print_schedule(&schedule)?;
            if config.display.show_issues && !cli.quiet {
                report_issues(&schedule.issues, cli.verbose);
            }
        }
        OutputMode::Json => {
            let mut payload = serde_json::to_value(&schedule)?;
            payload["command"] = json!("show");
            payload["rendered"] = json!(schedule.render_lines());
            write_json_line(&payload)?;
        }
    }

    let skipped = schedule.skipped_count();
    if args.strict && skipped > 0 {
        return Err(CliError::Partial(format!(
            "{skipped} agenda entries were skipped"
        )));
    }
    Ok(())
}

fn resolve_render_mode(args: &ShowArgs, configured: RenderMode) -> RenderMode {
    if args.sort_alpha {
        RenderMode::Grouped
    } else if args.sort_interleaved {
        RenderMode::Chronological
    } else {
        configured
    }
}

fn load_input(
    input: Option<&Path>,
    format: Option<InputFormat>,
    day: Option<NaiveDate>,
) -> Result<Agenda, GdayError> {
    match input {
        Some(path) if path != Path::new("-") => source::load_agenda(path, format, day),
        Some(_) => source::read_agenda(io::stdin().lock(), format, day),
        None if io::stdin().is_terminal() => Err(GdayError::InvalidConfig {
            details: "no agenda input: pass a file, pipe `gcalcli agenda --tsv`, or set source.agenda_file"
                .to_string(),
        }),
        None => source::read_agenda(io::stdin().lock(), format, day),
    }
}

/// Render the agenda; loader issues come first since they happened before placement.
fn build_schedule(agenda: Agenda, mode: RenderMode) -> Schedule {
    let Agenda {
        appointments,
        mut issues,
    } = agenda;
    let mut schedule = render_schedule(&appointments, mode);
    issues.append(&mut schedule.issues);
    schedule.issues = issues;
    schedule
}

fn print_schedule(schedule: &Schedule) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    for line in &schedule.lines {
        let title = if line.block_offset == 0 {
            line.title.bold()
        } else {
            line.title.dimmed()
        };
        writeln!(stdout, "{} {title}", line.time_field())?;
    }
    Ok(())
}

fn report_issues(issues: &[ScheduleIssue], verbose: bool) {
    for issue in issues {
        match issue {
            // Hidden conflicts and all-day events are expected; only narrate them on request.
            ScheduleIssue::Suppressed { .. } | ScheduleIssue::AllDay { .. } if !verbose => {}
            ScheduleIssue::Suppressed { .. } | ScheduleIssue::AllDay { .. } => {
                eprintln!("[GDAY-RENDER] {issue}");
            }
            _ => eprintln!("[GDAY-RENDER] {} {issue}", "warning:".yellow()),
        }
    }
}

// ---------------------------------------------------------------------------
// glyph
// ---------------------------------------------------------------------------

fn run_glyph(cli: &Cli, args: &GlyphArgs) -> Result<(), CliError> {
    let start = ClockTime::parse(&args.time)?;
    let blocks = args.blocks.max(1);
    let rows: Vec<(String, String)> = (0..blocks)
        .map(|offset| {
            let label = start
                .block()
                .offset(offset)
                .map_or_else(|| "-".to_string(), |b| b.to_string());
            (label, generate_repeated_glyph(&args.title, offset, start))
        })
        .collect();

    match output_mode(cli) {
        OutputMode::Human => {
            let mut stdout = io::stdout().lock();
            for (label, glyph) in &rows {
                writeln!(stdout, "{label:>7} {glyph}")?;
            }
        }
        OutputMode::Json => {
            let blocks: Vec<Value> = rows
                .iter()
                .map(|(label, glyph)| json!({ "block": label, "glyph": glyph }))
                .collect();
            let payload = json!({
                "command": "glyph",
                "start": start.label(),
                "on_boundary": start.is_on_boundary(),
                "blocks": blocks,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();
            let stray_yaml = Config::stray_yaml_config(&path);

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                    if let Some(yaml) = &stray_yaml {
                        println!(
                            "  (ignoring {}: gday reads TOML configuration only)",
                            yaml.display()
                        );
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                        "ignored_yaml": stray_yaml.map(|p| p.to_string_lossy().into_owned()),
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", config.to_toml()?);
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                if output_mode(cli) == OutputMode::Json {
                    let payload = json!({
                        "command": "config validate",
                        "valid": false,
                        "code": e.code(),
                        "error": e.to_string(),
                    });
                    write_json_line(&payload)?;
                }
                Err(CliError::User(format!("configuration is invalid: {e}")))
            }
        },
    }
}

// ---------------------------------------------------------------------------
// output helpers
// ---------------------------------------------------------------------------

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("GDAY_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gday::schedule::render::Appointment;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("args should parse")
    }

    #[test]
    fn clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(resolve_output_mode(true, Some("human")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("json")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some(" JSON ")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("human")), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, None), OutputMode::Human);
    }

    #[test]
    fn sort_flags_select_render_mode() {
        let cli = parse(&["gday", "show", "--sort-alpha", "agenda.tsv"]);
        let Some(Command::Show(args)) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(
            resolve_render_mode(&args, RenderMode::Chronological),
            RenderMode::Grouped
        );

        let cli = parse(&["gday", "show", "--sort-interleaved"]);
        let Some(Command::Show(args)) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(
            resolve_render_mode(&args, RenderMode::Grouped),
            RenderMode::Chronological
        );

        assert_eq!(
            resolve_render_mode(&ShowArgs::default(), RenderMode::Grouped),
            RenderMode::Grouped
        );
    }

    #[test]
    fn sort_flags_conflict() {
        let result = Cli::try_parse_from(["gday", "show", "--sort-alpha", "--sort-interleaved"]);
        assert!(result.is_err());
    }

    #[test]
    fn date_flag_parses_iso_dates() {
        let cli = parse(&["gday", "show", "--date", "2026-10-17"]);
        let Some(Command::Show(args)) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 10, 17));
        assert!(Cli::try_parse_from(["gday", "show", "--date", "17/10/2026"]).is_err());
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = parse(&["gday", "--no-color"]);
        assert!(cli.command.is_none());
        assert!(cli.no_color);
    }

    #[test]
    fn exit_codes_follow_contract() {
        assert_eq!(CliError::User(String::new()).exit_code(), 1);
        assert_eq!(CliError::Runtime(String::new()).exit_code(), 2);
        assert_eq!(CliError::Partial(String::new()).exit_code(), 4);
        assert_eq!(CliError::Io(io::Error::other("x")).exit_code(), 2);
    }

    #[test]
    fn library_errors_map_to_cli_errors() {
        let user: CliError = ClockTime::parse("later").unwrap_err().into();
        assert_eq!(user.exit_code(), 1);
        assert!(user.to_string().contains("GDAY-2001"));

        let runtime: CliError = GdayError::io("/x", io::Error::other("denied")).into();
        assert_eq!(runtime.exit_code(), 2);
    }

    #[test]
    fn build_schedule_puts_loader_issues_first() {
        let start = ClockTime::parse("9:00am").unwrap();
        let agenda = Agenda {
            appointments: vec![
                Appointment::new("A", start, 1),
                Appointment::new("B", start, 1),
            ],
            issues: vec![ScheduleIssue::skipped(
                "line 7",
                &ClockTime::parse("later").unwrap_err(),
            )],
        };
        let schedule = build_schedule(agenda, RenderMode::Chronological);
        let kinds: Vec<&str> = schedule.issues.iter().map(ScheduleIssue::kind).collect();
        assert_eq!(kinds, vec!["skipped", "suppressed"]);
        assert_eq!(schedule.skipped_count(), 1);
    }
}
