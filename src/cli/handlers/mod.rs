mod init;
pub use init::init_planner;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate, NaiveTime};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, CONFIG_FILE, ConfigError};
use crate::io::diagnostics::{self, DiagnosticCategory, DiagnosticEntry};
use crate::io::lock::PlannerLock;
use crate::io::planner_file::{FsPlannerFile, today_planner_path};
use crate::io::watcher::PlannerWatcher;
use crate::model::config::DayplanConfig;
use crate::ops::clock::{Clock, FixedClock, SystemClock};
use crate::ops::cycle::{
    CycleError, CycleOutcome, CycleReport, PlannerDocument, Skip, render_document, run_cycle,
};
use crate::ops::debounce::EditSession;
use crate::parse::SegmentError;

type HandlerResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> HandlerResult {
    let json = cli.json;
    let ctx = Context::load(cli.config)?;

    match cli.command {
        Commands::Update(args) => cmd_update(&ctx, args, json),
        Commands::Show(args) => cmd_show(&ctx, args, json),
        Commands::Render(args) => cmd_render(&ctx, args, json),
        Commands::Init(args) => cmd_init(&ctx, args),
        Commands::Watch(args) => cmd_watch(&ctx, args, json),
        Commands::Config(cmd) => cmd_config(&ctx, cmd, json),
        Commands::Log(args) => cmd_log(&ctx, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loaded configuration and the directory it is relative to
struct Context {
    config: DayplanConfig,
    config_path: PathBuf,
    base: PathBuf,
}

impl Context {
    fn load(config: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let base = parent_dir(&config_path);
        Ok(Context {
            config: config_io::load_config(&config_path)?,
            config_path,
            base,
        })
    }

    fn planner_dir(&self) -> PathBuf {
        self.base.join(&self.config.planner.directory)
    }

    /// The note named on the command line, or today's dated note.
    fn resolve_file(&self, file: Option<PathBuf>, today: NaiveDate) -> PathBuf {
        file.unwrap_or_else(|| today_planner_path(&self.planner_dir(), today))
    }

    fn session(&self) -> EditSession {
        EditSession::new(Duration::from_millis(self.config.planner.cooldown_ms))
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `--at HH:MM` pins the clock to that time today.
fn clock_for(at: Option<NaiveTime>) -> Box<dyn Clock> {
    match at {
        Some(time) => Box::new(FixedClock(Local::now().date_naive().and_time(time))),
        None => Box::new(SystemClock),
    }
}

fn require_note(path: &Path) -> HandlerResult {
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("no planner note at {} (create one with `dp init`)", path.display()).into())
    }
}

fn read_note(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    require_note(path)?;
    fs::read_to_string(path).map_err(|e| format!("could not read {}: {}", path.display(), e).into())
}

/// Run one cycle under the directory lock and record problems in the
/// diagnostic log next to the note.
fn locked_cycle(
    ctx: &Context,
    path: &Path,
    session: &EditSession,
    clock: &dyn Clock,
) -> Result<CycleReport, Box<dyn std::error::Error>> {
    let dir = parent_dir(path);
    let _lock = PlannerLock::acquire_default(&dir)?;

    let report = match run_cycle(&FsPlannerFile, path, session, clock, &ctx.config.planner) {
        Ok(report) => report,
        Err(e) => {
            let category = match e {
                CycleError::Read { .. } => DiagnosticCategory::Read,
                CycleError::Write { .. } => DiagnosticCategory::Write,
            };
            diagnostics::log_diagnostic(
                &dir,
                DiagnosticEntry::new(category, e.to_string()).field("file", path.display()),
            );
            return Err(e.into());
        }
    };

    if let CycleOutcome::Skipped(skip) = &report.outcome
        && let Skip::NoSegment(SegmentError::Unterminated { start }) = skip
    {
        diagnostics::log_diagnostic(
            &dir,
            DiagnosticEntry::new(DiagnosticCategory::Segment, skip.to_string())
                .field("file", path.display())
                .field("line", start),
        );
    }
    for warning in &report.warnings {
        diagnostics::log_diagnostic(
            &dir,
            DiagnosticEntry::new(DiagnosticCategory::Render, warning.error.to_string())
                .field("file", path.display())
                .field("plan_line", warning.line + 1),
        );
    }
    Ok(report)
}

fn print_report(path: &Path, report: &CycleReport, json: bool) -> HandlerResult {
    if json {
        let out = CycleJson {
            file: path.display().to_string(),
            outcome: outcome_label(&report.outcome),
            reason: match &report.outcome {
                CycleOutcome::Skipped(skip) => Some(skip.to_string()),
                _ => None,
            },
            warnings: report
                .warnings
                .iter()
                .map(|w| format!("line {}: {}", w.line + 1, w.error))
                .collect(),
        };
        println!("{}", serde_json::to_string(&out)?);
        return Ok(());
    }

    match &report.outcome {
        CycleOutcome::Written => println!("updated {}", path.display()),
        CycleOutcome::Unchanged => println!("{} is up to date", path.display()),
        CycleOutcome::Suppressed => println!("waiting: {} was edited recently", path.display()),
        CycleOutcome::Skipped(skip) => println!("skipped {}: {}", path.display(), skip),
    }
    for w in &report.warnings {
        eprintln!("warning: plan line {}: {}", w.line + 1, w.error);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Cycle commands
// ---------------------------------------------------------------------------

fn cmd_update(ctx: &Context, args: UpdateArgs, json: bool) -> HandlerResult {
    let clock = clock_for(args.at);
    let path = ctx.resolve_file(args.file, clock.now().date());
    require_note(&path)?;
    let report = locked_cycle(ctx, &path, &ctx.session(), clock.as_ref())?;
    print_report(&path, &report, json)
}

fn cmd_show(ctx: &Context, args: ShowArgs, json: bool) -> HandlerResult {
    let clock = clock_for(args.at);
    let now = clock.now();
    let path = ctx.resolve_file(args.file, now.date());
    let content = read_note(&path)?;

    let mut doc = PlannerDocument::parse(&content, &ctx.config.planner)?;
    doc.summary.calculate(now.time());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary_to_json(&doc.summary, now.time()))?
        );
    } else {
        for line in format_summary(&doc.summary, now.time()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_render(ctx: &Context, args: RenderArgs, json: bool) -> HandlerResult {
    let clock = clock_for(args.at);
    let now = clock.now();
    let path = ctx.resolve_file(args.file, now.date());
    let content = read_note(&path)?;

    let rendered = render_document(&content, &ctx.config.planner, now.time())?;
    if json {
        let warnings: Vec<String> = rendered
            .warnings
            .iter()
            .map(|w| format!("line {}: {}", w.line + 1, w.error))
            .collect();
        let out = serde_json::json!({
            "file": path.display().to_string(),
            "changed": rendered.content != content,
            "content": rendered.content,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", rendered.content);
        for w in &rendered.warnings {
            eprintln!("warning: plan line {}: {}", w.line + 1, w.error);
        }
    }
    Ok(())
}

fn cmd_init(ctx: &Context, args: InitArgs) -> HandlerResult {
    let path = ctx.resolve_file(args.file, Local::now().date_naive());
    let line = init_planner(&path, args.line)?;
    println!("added a day planner to {} at line {}", path.display(), line);
    Ok(())
}

/// Update on an interval until interrupted (or `--cycles` runs out).
///
/// Changes to the note that this loop did not write count as user edits and
/// hold off the next rewrite for the configured cooldown.
fn cmd_watch(ctx: &Context, args: WatchArgs, json: bool) -> HandlerResult {
    let clock = SystemClock;
    let path = ctx.resolve_file(args.file, clock.now().date());
    require_note(&path)?;

    let interval = Duration::from_secs(
        args.interval
            .unwrap_or(ctx.config.watch.interval_secs)
            .max(1),
    );
    let watcher = PlannerWatcher::start(&path)?;
    let mut session = ctx.session();
    let mut last_seen = fs::read_to_string(&path).ok();

    if !json {
        println!(
            "watching {} every {}s (ctrl-c to stop)",
            path.display(),
            interval.as_secs()
        );
    }

    let mut cycles = 0;
    loop {
        match locked_cycle(ctx, &path, &session, &clock) {
            Ok(report) => {
                if report.content.is_some() {
                    last_seen = report.content.clone();
                }
                if report.outcome != CycleOutcome::Unchanged || json {
                    print_report(&path, &report, json)?;
                }
            }
            Err(e) => eprintln!("error: {}", e),
        }

        cycles += 1;
        if args.cycles.is_some_and(|limit| cycles >= limit) {
            return Ok(());
        }

        let deadline = Instant::now() + interval;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            if watcher.wait(remaining).is_empty() {
                continue;
            }
            let current = fs::read_to_string(&path).ok();
            if current != last_seen {
                session.mark_edit(clock.now());
                last_seen = current;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config and log
// ---------------------------------------------------------------------------

fn cmd_config(ctx: &Context, cmd: ConfigCmd, json: bool) -> HandlerResult {
    match cmd.action {
        ConfigAction::Show => {
            if json {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            } else {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
            }
        }
        ConfigAction::Set(args) => {
            let mut doc = config_io::read_config_doc(&ctx.config_path)?;
            config_io::set_value(&mut doc, &args.key, &args.value)?;
            config_io::write_config_doc(&ctx.config_path, &doc)?;
            println!("set {} = {}", args.key, args.value);
        }
    }
    Ok(())
}

fn cmd_log(ctx: &Context, args: LogArgs, json: bool) -> HandlerResult {
    let dir = args.dir.unwrap_or_else(|| ctx.planner_dir());

    if args.clear {
        let removed = diagnostics::clear_log(&dir)?;
        println!("cleared {} log entries", removed);
        return Ok(());
    }

    let entries = diagnostics::read_entries(&dir, Some(args.limit));
    if json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if entries.is_empty() {
        println!("(log is empty)");
    } else {
        for entry in &entries {
            print!("{}", entry.to_display_markdown());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn context_paths_follow_the_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("vault").join(CONFIG_FILE);
        let ctx = Context::load(Some(config_path.clone())).unwrap();
        assert_eq!(ctx.planner_dir(), tmp.path().join("vault").join("Day Planners"));

        let today = NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();
        assert_eq!(
            ctx.resolve_file(None, today),
            tmp.path()
                .join("vault")
                .join("Day Planners")
                .join("Day Planner-20250514.md")
        );
        assert_eq!(
            ctx.resolve_file(Some(PathBuf::from("x.md")), today),
            PathBuf::from("x.md")
        );
    }

    #[test]
    fn default_context_is_relative_to_cwd() {
        assert_eq!(parent_dir(Path::new(CONFIG_FILE)), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/b.md")), PathBuf::from("a"));
    }

    #[test]
    fn locked_cycle_logs_unterminated_plans() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("day.md");
        fs::write(&path, "# Day Planner\n- [ ] 09:00 A\n").unwrap();

        let ctx = Context::load(Some(tmp.path().join(CONFIG_FILE))).unwrap();
        let at = Local::now()
            .date_naive()
            .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        let report = locked_cycle(&ctx, &path, &ctx.session(), &FixedClock(at)).unwrap();
        assert!(matches!(report.outcome, CycleOutcome::Skipped(_)));

        let entries = diagnostics::read_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, DiagnosticCategory::Segment);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Day Planner\n- [ ] 09:00 A\n"
        );
    }
}
