use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use worktally::analytics::View;
use worktally::render::OutputFormat;
use worktally::startup::{self, ReportOptions, WatchOptions};

/// Tally Google Calendar time by category from the terminal
#[derive(Parser)]
#[command(name = "worktally", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute one report and print it
    Report {
        /// Reporting granularity
        #[arg(long, value_enum, default_value_t = ViewArg::Day)]
        view: ViewArg,
        /// Reference date as YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        /// IANA timezone, defaults to the configured one
        #[arg(long)]
        timezone: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
    /// Keep re-rendering the report as time passes
    Watch {
        /// Reporting granularity
        #[arg(long, value_enum, default_value_t = ViewArg::Day)]
        view: ViewArg,
        /// IANA timezone, defaults to the configured one
        #[arg(long)]
        timezone: Option<String>,
        /// Refresh interval in seconds, defaults to the configured one
        #[arg(long)]
        interval: Option<u64>,
    },
    /// List visible calendars and the category each resolves to
    Calendars,
}

/// Reporting granularity on the command line
#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Day => View::Day,
            ViewArg::Week => View::Week,
            ViewArg::Month => View::Month,
            ViewArg::Quarter => View::Quarter,
            ViewArg::Year => View::Year,
        }
    }
}

/// Output format on the command line
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = Cli::parse();

    // Load configuration
    let config = startup::load_config().await?;

    match cli.command {
        Command::Report {
            view,
            date,
            timezone,
            format,
        } => {
            startup::run_report(
                config,
                ReportOptions {
                    view: view.into(),
                    date,
                    timezone,
                    format: format.into(),
                },
            )
            .await
        }
        Command::Watch {
            view,
            timezone,
            interval,
        } => {
            info!("Starting worktally watch mode");
            startup::run_watch(
                config,
                WatchOptions {
                    view: view.into(),
                    timezone,
                    interval,
                },
            )
            .await
        }
        Command::Calendars => startup::run_calendars(config).await,
    }
}
