// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! CalDAV client validation tool.
//!
//! A standalone CLI for trying the client against real CalDAV servers, and an
//! example of the `CalDavClient` API.
//!
//! Set `RUST_LOG=tinycal_caldav=debug` to see the exchanges.

use std::error::Error;
use std::io::Write as _;

use clap::{Parser, Subcommand};
use colored::Colorize as _;
use jiff::Timestamp;
use tinycal_caldav::{AuthMethod, CalDavClient, CalDavConfig, CalDavError, Event};
use tracing_subscriber::EnvFilter;

/// CalDAV client validation tool.
#[derive(Parser)]
#[command(name = "caldav_cli")]
#[command(about = "CalDAV client validation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// CalDAV server URL
    #[arg(long)]
    server: Option<String>,
    /// Calendar used by `list-events` when none is given
    #[arg(long)]
    calendar: Option<String>,
    /// Username for basic auth
    #[arg(long)]
    username: Option<String>,
    /// Password for basic auth
    #[arg(long)]
    password: Option<String>,
    /// Bearer token for OAuth
    #[arg(long)]
    token: Option<String>,
    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
    /// How many times discovery may follow a principal
    #[arg(long, default_value = "1")]
    principal_hops: u8,
    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Check that the server is reachable and accepts the credentials
    TestConnection,
    /// List all calendar collections
    ListCals,
    /// Find a calendar by name or display name
    Find {
        /// Calendar name or display name
        name: String,
    },
    /// List events in a time range
    ListEvents {
        /// Calendar name, path or URL (defaults to --calendar)
        calendar: Option<String>,
        /// Start date (e.g., "2025-01-01" or "today")
        #[arg(long, default_value = "today")]
        start: String,
        /// End date (defaults to 30 days after start)
        #[arg(long)]
        end: Option<String>,
    },
    /// Get a single event
    Get {
        /// Event path
        path: String,
    },
}

impl Cli {
    fn build_config(&self) -> Result<CalDavConfig, Box<dyn Error>> {
        // Read from environment variables first
        let server = self
            .server
            .clone()
            .or_else(|| std::env::var("TINYCAL_CALDAV_SERVER").ok())
            .ok_or_else(|| {
                "server must be provided via --server or TINYCAL_CALDAV_SERVER env var".to_string()
            })?;

        let calendar_path = self
            .calendar
            .clone()
            .or_else(|| std::env::var("TINYCAL_CALDAV_CALENDAR").ok());

        let username = self
            .username
            .clone()
            .or_else(|| std::env::var("TINYCAL_CALDAV_USERNAME").ok());

        let password = self
            .password
            .clone()
            .or_else(|| std::env::var("TINYCAL_CALDAV_PASSWORD").ok());

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("TINYCAL_CALDAV_TOKEN").ok());

        let auth = if let Some(token) = token {
            AuthMethod::Bearer { token }
        } else if let (Some(username), Some(password)) = (username, password) {
            AuthMethod::Basic { username, password }
        } else {
            AuthMethod::None
        };

        Ok(CalDavConfig {
            server_url: server,
            calendar_path,
            auth,
            timeout_secs: self.timeout,
            user_agent: concat!("tinycal-caldav-cli/", env!("CARGO_PKG_VERSION")).to_string(),
            max_principal_hops: self.principal_hops,
        })
    }
}

async fn cmd_test_connection(client: &CalDavClient) -> Result<(), CalDavError> {
    let status = client.test_connection().await?;
    println!("{} (HTTP {status})", "✓ Connection successful".green());
    println!("Server: {}", client.config().server_url);
    Ok(())
}

async fn cmd_list_cals(client: &CalDavClient) -> Result<(), Box<dyn Error>> {
    let calendars = client.list_calendars().await?;

    if calendars.is_empty() {
        println!("No calendars found");
        return Ok(());
    }

    println!("{:-<100}", "");
    println!("{:<20} {:<30} {:<50}", "Name", "Display name", "Path");
    println!("{:-<100}", "");

    for cal in &calendars {
        let display_name = cal.display_name.as_deref().unwrap_or("Unnamed");
        println!("{:<20} {:<30} {}", cal.name, display_name, cal.path);
    }

    Ok(())
}

async fn cmd_find(client: &CalDavClient, name: &str) -> Result<(), Box<dyn Error>> {
    let calendar = client.find_calendar(name).await?;

    println!("{} {}", "✓ Found".green(), calendar.name.bold());
    println!("Path: {}", calendar.path);
    if let Some(display_name) = &calendar.display_name {
        println!("Display name: {display_name}");
    }
    if let Some(description) = &calendar.description {
        println!("Description: {description}");
    }
    if let Some(ctag) = &calendar.ctag {
        println!("CTag: {ctag}");
    }
    Ok(())
}

async fn cmd_list_events(
    client: &CalDavClient,
    calendar: Option<&str>,
    start: &str,
    end: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let start = parse_date(start)?;
    let end = match end {
        Some(e) => parse_date(e)?,
        None => start.checked_add(jiff::SignedDuration::from_hours(30 * 24))?,
    };

    let events = match calendar {
        // A bare name is looked up, anything with a slash is used as a path
        Some(calendar) if !calendar.contains('/') => {
            let calendar = client.find_calendar(calendar).await?;
            client.list_calendar_events(&calendar, start, end).await?
        }
        Some(path) => client.list_events(path, start, end).await?,
        None => client.list_configured_events(start, end).await?,
    };

    if events.is_empty() {
        println!("No events found");
        return Ok(());
    }

    println!("{:-<100}", "");
    println!("{:<20} {:<50} {:<30}", "Start", "Summary", "Location");
    println!("{:-<100}", "");

    for event in &events {
        print_event(event);
    }

    Ok(())
}

fn print_event(event: &Event) {
    let start = event.start_time.as_deref().unwrap_or("-");
    let summary = event.summary.as_deref().unwrap_or("(no title)");
    let location = event.location.as_deref().unwrap_or("");
    println!("{start:<20} {summary:<50} {location:<30}");
}

async fn cmd_get(client: &CalDavClient, path: &str) -> Result<(), Box<dyn Error>> {
    let event = client.get_event(path).await?;
    print_event(&event);
    Ok(())
}

/// Parse a date string to a UTC timestamp.
///
/// Accepts formats like:
/// - "today" → today at 00:00:00 UTC
/// - "2025-01-01" → 2025-01-01T00:00:00Z
/// - "2025-01-01T12:00:00Z" → parsed as is
fn parse_date(date: &str) -> Result<Timestamp, String> {
    if date.eq_ignore_ascii_case("today") {
        let today = jiff::Zoned::now().date();
        return today
            .to_zoned(jiff::tz::TimeZone::UTC)
            .map(|zoned| zoned.timestamp())
            .map_err(|e| format!("Failed to convert to UTC: {e}"));
    }

    // Try YYYY-MM-DD format
    if let Ok(date) = jiff::civil::Date::strptime("%Y-%m-%d", date) {
        return date
            .to_zoned(jiff::tz::TimeZone::UTC)
            .map(|zoned| zoned.timestamp())
            .map_err(|e| format!("Failed to convert to UTC: {e}"));
    }

    date.parse().map_err(|_| {
        format!("Invalid date format: '{date}'. Use YYYY-MM-DD, today, or full datetime")
    })
}

/// Format error for user-friendly display.
fn format_error(err: &(dyn Error + 'static)) -> String {
    let label = "Error:".red().bold();
    match err.downcast_ref::<CalDavError>() {
        Some(CalDavError::Auth(_)) => format!("{label} Authentication failed"),
        Some(CalDavError::NotFound(name)) => format!("{label} Calendar not found: {name}"),
        Some(CalDavError::Connection(_)) => {
            format!("{label} Network error - check server URL and connection")
        }
        Some(CalDavError::Protocol(_)) => format!(
            "{label} Server returned a web page instead of CalDAV data - check the server URL"
        ),
        _ => format!("{label} {err}"),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Priority: .env.local (highest) -> .env -> existing environment variables (lowest)
    dotenvy::dotenv().ok();
    dotenvy::from_filename(".env.local").ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.build_config()?;
    let client = CalDavClient::new(config)?;

    let runtime = tokio::runtime::Runtime::new()?;

    let result = runtime.block_on(async {
        match cli.command {
            Commands::TestConnection => cmd_test_connection(&client)
                .await
                .map_err(|e| Box::new(e) as Box<dyn Error>),
            Commands::ListCals => cmd_list_cals(&client).await,
            Commands::Find { name } => cmd_find(&client, &name).await,
            Commands::ListEvents {
                calendar,
                start,
                end,
            } => cmd_list_events(&client, calendar.as_deref(), &start, end.as_deref()).await,
            Commands::Get { path } => cmd_get(&client, &path).await,
        }
    });

    if let Err(e) = result {
        std::io::stdout().flush().ok();
        eprintln!("{}", format_error(e.as_ref()));
        std::process::exit(1);
    }

    Ok(())
}
