use anyhow::Result;
use clap::{Parser, Subcommand};

use binwatch::{cli, web};

#[derive(Debug, Parser)]
#[command(name = "binwatch")]
#[command(about = "Campus waste-bin fill level monitor")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email
        email: String,
        /// Password (falls back to BINWATCH_PASSWORD, then stdin; stdin input is echoed)
        #[arg(long)]
        password: Option<String>,
    },
    /// Drop the stored session
    Logout,
    /// Show the signed-in user and home menu
    Whoami,
    /// Fetch bins and show fill levels
    Status {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Print the stamp QR payload for the signed-in user
    Qr,
    /// List the app's pages
    Pages {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Evaluate a single usage count without contacting the API
    Evaluate {
        /// Raw usage count reported by the bin
        #[arg(allow_hyphen_values = true)]
        usage: i64,
        /// Usage count of an empty bin (defaults to evaluator.capacity)
        #[arg(long, allow_hyphen_values = true)]
        capacity: Option<i64>,
    },
    /// Summarize the activity log
    History {
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config, session and API reachability
    Health,
    /// Serve the local bin status dashboard
    Web {
        /// Listen address (defaults to web.addr)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.binwatch/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `evaluator.capacity 30`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Login { email, password } => cli::run_login(&email, password),
        Commands::Logout => cli::run_logout(),
        Commands::Whoami => cli::run_whoami(),
        Commands::Status { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_status(fmt)
        }
        Commands::Qr => cli::run_qr(),
        Commands::Pages { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_pages(fmt)
        }
        Commands::Evaluate { usage, capacity } => cli::run_evaluate(usage, capacity),
        Commands::History { days, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(days, fmt)
        }
        Commands::Health => cli::run_health(),
        Commands::Web { addr } => {
            let state = web::DashboardState::load()?;
            let addr = addr.unwrap_or_else(|| state.config.web.addr.clone());
            web::serve(&addr, &state)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn login_help_warns_that_stdin_is_echoed() {
        let mut app = App::command();
        let login = app
            .find_subcommand_mut("login")
            .expect("login subcommand");
        let help = login.render_help().to_string();
        let flat = help.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(flat.contains("stdin input is echoed"), "{help}");
    }

    #[test]
    fn command_tree_is_consistent() {
        App::command().debug_assert();
    }
}
