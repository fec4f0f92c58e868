//! CLI command implementations for binwatch.
//!
//! Provides subcommand handlers for:
//! - `binwatch login | logout | whoami` — session lifecycle
//! - `binwatch status` — fetch and evaluate bin fill levels
//! - `binwatch qr` — stamp QR payload for the signed-in user
//! - `binwatch pages` — the app's page table
//! - `binwatch evaluate <usage>` — evaluate a single reading offline
//! - `binwatch history` — activity log summary
//! - `binwatch health` — check config, session, API reachability
//! - `binwatch config show|init|set|reset` — configuration management

use std::borrow::Cow;
use std::io::{self, BufRead};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use colored::Colorize;

use crate::analytics::logger::{ActivityEntry, ActivityKind, ActivityLog};
use crate::analytics::reporter::{self, ActivitySummary};
use crate::api::ApiClient;
use crate::config;
use crate::evaluator::{self, StatusTier};
use crate::pages::{self, PLACEHOLDER_TEXT};
use crate::session::{self, Session, SessionStore};
use crate::stamps;
use crate::status::{self, StatusReport};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

// ---------------------------------------------------------------------------
// binwatch login | logout | whoami
// ---------------------------------------------------------------------------

/// Sign in and store the session.
///
/// The password comes from `--password`, then `BINWATCH_PASSWORD`, then one
/// line of stdin. Stdin input is not masked.
pub fn run_login(email: &str, password: Option<String>) -> Result<()> {
    let cfg = config::load();
    let log = ActivityLog::from_config(&cfg.logging);

    let password = match password.or_else(|| std::env::var("BINWATCH_PASSWORD").ok()) {
        Some(p) => p,
        None => read_password_line()?,
    };

    session::validate_credentials(email, &password)?;

    let client = ApiClient::from_config(&cfg.api);
    let start = Instant::now();
    let auth = match client.sign_in(email.trim(), &password) {
        Ok(auth) => auth,
        Err(err) => {
            log.record(
                &ActivityEntry::new(ActivityKind::Login, false)
                    .with_latency(elapsed_ms(start))
                    .with_detail(format!("{err:#}")),
            );
            return Err(err);
        }
    };
    log.record(&ActivityEntry::new(ActivityKind::Login, true).with_latency(elapsed_ms(start)));

    let session = Session::from_auth(email.trim(), auth, Utc::now());
    let store = SessionStore::default_location()?;
    store.save(&session)?;

    println!(
        "{} Signed in as {}",
        "✓".green().bold(),
        session.display_name.bold()
    );
    let until = session.expires_at.with_timezone(&Local);
    println!(
        "  {}",
        format!("Session valid until {}", until.format("%Y-%m-%d %H:%M")).dimmed()
    );
    Ok(())
}

/// Prompt for a password read from stdin. The terminal echoes what is typed.
pub const PASSWORD_PROMPT: &str =
    "Password (input is echoed; use BINWATCH_PASSWORD to avoid this): ";

fn read_password_line() -> Result<String> {
    eprint!("{PASSWORD_PROMPT}");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Drop the stored session.
pub fn run_logout() -> Result<()> {
    let cfg = config::load();
    let store = SessionStore::default_location()?;
    let existed = store.clear()?;

    if existed {
        ActivityLog::from_config(&cfg.logging)
            .record(&ActivityEntry::new(ActivityKind::Logout, true));
        println!("{} Logged out", "✓".green().bold());
    } else {
        println!("{}", "No active session.".yellow());
    }
    Ok(())
}

/// Show the signed-in user and the home menu.
pub fn run_whoami() -> Result<()> {
    let store = SessionStore::default_location()?;
    let session = store.require_active(Utc::now())?;

    println!("{}", format!("Welcome, {}", session.display_name).bold().cyan());
    println!("  {}", Local::now().format("%A, %B %-d, %Y").to_string().dimmed());
    println!();
    for page in pages::home_menu() {
        println!("  {} {}", page.icon, page.title);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// binwatch status
// ---------------------------------------------------------------------------

/// Fetch bins for the signed-in user and print their fill levels.
pub fn run_status(format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let log = ActivityLog::from_config(&cfg.logging);
    let session = SessionStore::default_location()?.require_active(Utc::now())?;
    let client = ApiClient::from_config(&cfg.api);

    let start = Instant::now();
    let readings = match client.fetch_bins(&session) {
        Ok(readings) => readings,
        Err(err) => {
            log.record(
                &ActivityEntry::new(ActivityKind::FetchBins, false)
                    .with_latency(elapsed_ms(start))
                    .with_detail(format!("{err:#}")),
            );
            return Err(err.context("failed to load bin status. Please try again"));
        }
    };
    let latency = elapsed_ms(start);

    let report = status::build_report(&readings, cfg.evaluator.capacity)
        .context("check `evaluator.capacity` in your config")?;
    log.record(
        &ActivityEntry::new(ActivityKind::FetchBins, true)
            .with_latency(latency)
            .with_bins(report.bins.len(), report.alerts()),
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => print_status_csv(&report),
        OutputFormat::Table => print_status_table(&report),
    }
    Ok(())
}

fn print_status_table(report: &StatusReport) {
    println!("{}", "Bin Status".bold().cyan());
    println!("{}", "Monitor fill levels of waste bins in real-time".dimmed());
    println!("{}", "=".repeat(72));

    if report.bins.is_empty() {
        println!("{}", "No bins reported.".yellow());
        return;
    }

    println!(
        "  {:<20} {:<10} {:<22} {:>7} {:>8}",
        "Bin", "ID", "Fill", "%", "Usage"
    );
    println!("  {}", "-".repeat(70));

    for bin in &report.bins {
        let bar = fill_bar(bin.percentage, 20);
        println!(
            "  {:<20} {:<10} {} {:>6.1}% {:>8.1}",
            truncate(&bin.name, 20),
            truncate(&bin.id, 10),
            colorize_tier(&bar, bin.status),
            bin.percentage,
            bin.usage_count as f64,
        );
    }

    println!();
    println!(
        "  {} {}  {} {}  {} {}",
        "Low:".bold(),
        report.counts.low.to_string().green(),
        "Medium:".bold(),
        report.counts.medium.to_string().yellow(),
        "High:".bold(),
        report.counts.high.to_string().red(),
    );
    let alerts = report.alerts();
    if alerts > 0 {
        println!(
            "  {}",
            format!("⚠️  {alerts} bin(s) need attention").red().bold()
        );
    }
}

fn print_status_csv(report: &StatusReport) {
    print!("{}", status_csv(report));
}

fn status_csv(report: &StatusReport) -> String {
    let mut out = String::from("id,name,usage_count,percentage,status\n");
    for bin in &report.bins {
        out.push_str(&format!(
            "{},{},{},{:.1},{}\n",
            csv_field(&bin.id),
            csv_field(&bin.name),
            bin.usage_count,
            bin.percentage,
            bin.status
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// binwatch qr
// ---------------------------------------------------------------------------

/// Print the stamp QR payload for the signed-in user.
pub fn run_qr() -> Result<()> {
    let cfg = config::load();
    let log = ActivityLog::from_config(&cfg.logging);
    let session = SessionStore::default_location()?.require_active(Utc::now())?;
    let client = ApiClient::from_config(&cfg.api);

    let start = Instant::now();
    let info = match client.fetch_user_info(&session) {
        Ok(info) => info,
        Err(err) => {
            log.record(
                &ActivityEntry::new(ActivityKind::FetchUserInfo, false)
                    .with_latency(elapsed_ms(start))
                    .with_detail(format!("{err:#}")),
            );
            return Err(err.context("failed to load user info. Please try again"));
        }
    };
    log.record(
        &ActivityEntry::new(ActivityKind::FetchUserInfo, true).with_latency(elapsed_ms(start)),
    );

    println!("{}", stamps::SCAN_PROMPT.bold());
    println!("{}", stamps::stamp_payload(Some(&info)));
    Ok(())
}

// ---------------------------------------------------------------------------
// binwatch pages
// ---------------------------------------------------------------------------

/// Print the page table.
pub fn run_pages(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(pages::all_pages())?);
        }
        OutputFormat::Csv => {
            println!("route,title,placeholder");
            for page in pages::all_pages() {
                println!("{},{},{}", page.route, page.title, page.placeholder);
            }
        }
        OutputFormat::Table => {
            println!("{}", "Pages".bold().cyan());
            println!("{}", "=".repeat(40));
            for page in pages::all_pages() {
                let line = format!("  {:<7} {} {}", page.route, page.icon, page.title);
                if page.placeholder {
                    println!("{}", line.dimmed());
                } else {
                    println!("{line}");
                }
            }
            println!();
            println!("  {} {}", "Dimmed:".dimmed(), PLACEHOLDER_TEXT.dimmed());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// binwatch evaluate
// ---------------------------------------------------------------------------

/// Evaluate one usage count without contacting the API.
pub fn run_evaluate(usage_count: i64, capacity: Option<i64>) -> Result<()> {
    let capacity = capacity.unwrap_or_else(|| config::load().evaluator.capacity);
    let percentage = evaluator::compute_fill_percentage(usage_count, capacity)?;
    let tier = evaluator::classify_status(percentage)?;

    println!(
        "  {} {} / {}",
        "Usage count:".bold(),
        usage_count,
        capacity
    );
    println!("  {} {:.1}%", "Fill:       ".bold(), percentage);
    println!(
        "  {} {} ({})",
        "Status:     ".bold(),
        colorize_tier(&tier.to_string(), tier),
        tier.style()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// binwatch history
// ---------------------------------------------------------------------------

/// Summarize the activity log.
pub fn run_history(days: Option<u32>, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let log = ActivityLog::from_config(&cfg.logging);
    let entries = log.read_since_days(days);

    if entries.is_empty() {
        println!(
            "{}",
            "No activity yet. Run `binwatch status` to record some.".yellow()
        );
        return Ok(());
    }

    let summary = reporter::summarize(&entries);
    match format {
        OutputFormat::Json => print_history_json(&summary)?,
        OutputFormat::Csv => print_history_csv(&summary),
        OutputFormat::Table => print_history_table(&summary),
    }
    Ok(())
}

fn print_history_table(summary: &ActivitySummary) {
    println!("{}", "binwatch Activity".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Entries: ".bold(), summary.total);
    println!(
        "  {} {} ({:.1}%)",
        "Failures:".bold(),
        summary.failures,
        summary.failure_pct()
    );
    println!();

    println!(
        "  {:<18} {:>6} {:>9} {:>12}",
        "Event", "Count", "Failures", "Avg latency"
    );
    println!("  {}", "-".repeat(48));
    for (event, stat) in &summary.by_event {
        let latency = stat
            .avg_latency_ms
            .map(|ms| format!("{ms:.0}ms"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<18} {:>6} {:>9} {:>12}",
            event, stat.count, stat.failures, latency
        );
    }

    if let Some(last) = &summary.last_fetch {
        println!();
        println!(
            "  {} {} — {} bins, {} alerts",
            "Last fetch:".bold(),
            last.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            last.bins.unwrap_or(0),
            last.alerts.unwrap_or(0),
        );
    }
    println!("  {} {}", "Peak alerts:".bold(), summary.peak_alerts);
}

fn print_history_json(summary: &ActivitySummary) -> Result<()> {
    let value = serde_json::json!({
        "total": summary.total,
        "failures": summary.failures,
        "failure_pct": summary.failure_pct(),
        "peak_alerts": summary.peak_alerts,
        "last_fetch": summary.last_fetch,
        "events": summary.by_event.iter().map(|(event, stat)| serde_json::json!({
            "event": event,
            "count": stat.count,
            "failures": stat.failures,
            "avg_latency_ms": stat.avg_latency_ms,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_history_csv(summary: &ActivitySummary) {
    println!("event,count,failures,avg_latency_ms");
    for (event, stat) in &summary.by_event {
        println!(
            "{},{},{},{}",
            event,
            stat.count,
            stat.failures,
            stat.avg_latency_ms
                .map(|ms| format!("{ms:.1}"))
                .unwrap_or_default(),
        );
    }
}

// ---------------------------------------------------------------------------
// binwatch health
// ---------------------------------------------------------------------------

/// Check config files, capacity, session and API reachability.
pub fn run_health() -> Result<()> {
    println!("{}", "binwatch Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.binwatch/config.toml found"
        } else {
            "not found (run `binwatch config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".binwatch.toml found"
        } else {
            "none (optional)"
        },
    );

    let capacity_ok = cfg.evaluator.capacity > 0;
    print_health_item(
        "Capacity",
        capacity_ok,
        &if capacity_ok {
            cfg.evaluator.capacity.to_string()
        } else {
            format!("{} — must be positive", cfg.evaluator.capacity)
        },
    );

    print_health_item(
        "API key",
        !cfg.api.api_key.is_empty(),
        if cfg.api.api_key.is_empty() {
            "not set (set api.api_key or BINWATCH_API_KEY)"
        } else {
            "configured"
        },
    );

    let client = ApiClient::from_config(&cfg.api);
    let reachable = client.is_reachable();
    print_health_item(
        "Monitoring API",
        reachable,
        &if reachable {
            format!("reachable at {}", client.base_url())
        } else {
            format!("not reachable at {}", client.base_url())
        },
    );

    let session = SessionStore::default_location()
        .ok()
        .and_then(|store| store.load());
    let now = Utc::now();
    let (session_ok, session_detail) = match &session {
        Some(s) if !s.is_expired(now) => (true, format!("signed in as {}", s.username)),
        Some(_) => (false, "expired (run `binwatch login`)".to_string()),
        None => (false, "not signed in".to_string()),
    };
    print_health_item("Session", session_ok, &session_detail);

    let log = ActivityLog::from_config(&cfg.logging);
    match log.path() {
        Some(path) => {
            let entries = log.read_all().len();
            print_health_item(
                "Activity log",
                path.exists(),
                &if path.exists() {
                    format!("{entries} entries")
                } else {
                    "no log file yet".to_string()
                },
            );
        }
        None => print_health_item("Activity log", true, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// binwatch config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective binwatch Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.binwatch/config.toml", global_exists);
    print_source(".binwatch.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "BINWATCH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.binwatch/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Render a percentage as a fixed-width bar.
fn fill_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field if it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Colour text by status tier.
fn colorize_tier(text: &str, tier: StatusTier) -> colored::ColoredString {
    match tier {
        StatusTier::Low => text.green(),
        StatusTier::Medium => text.yellow(),
        StatusTier::High => text.red(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::BinReading;

    #[test]
    fn test_fill_bar() {
        assert_eq!(fill_bar(0.0, 4), "░░░░");
        assert_eq!(fill_bar(50.0, 4), "██░░");
        assert_eq!(fill_bar(100.0, 4), "████");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
        assert_eq!(truncate("Café Atrium", 4), "Caf…");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("Library"), "Library");
        assert_eq!(csv_field("Library, G/F"), "\"Library, G/F\"");
        assert_eq!(csv_field("the \"new\" bin"), "\"the \"\"new\"\" bin\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_status_csv_keeps_columns_aligned() {
        let mut reading = BinReading::new("7", 14);
        reading.bin_name = Some("Library, G/F".to_string());
        let report = status::build_report(&[reading], 28).unwrap();

        assert_eq!(
            status_csv(&report),
            "id,name,usage_count,percentage,status\n7,\"Library, G/F\",14,50.0,medium\n"
        );
    }

    #[test]
    fn test_password_prompt_warns_about_echo() {
        assert!(PASSWORD_PROMPT.contains("echoed"));
        assert!(PASSWORD_PROMPT.contains("BINWATCH_PASSWORD"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }
}
