use std::process::ExitCode;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use trimet_client::domain::{LocationId, RouteId};
use trimet_client::trimet::{
    Arrivals, Detour, Detours, MockTransport, Route, ServiceResponse, Transport, TrimetClient,
    TrimetConfig, TrimetError,
};

const USAGE: &str = "\
Usage:
  trimet-client arrivals [--json] <stop id>...
  trimet-client detours [--json] [route id]...

Environment:
  TRIMET_APP_ID     application id issued by TriMet
  TRIMET_BASE_URL   override the web service base URL
  TRIMET_MOCK_DIR   serve responses from <dir>/arrivals.xml and <dir>/detours.xml
  RUST_LOG          log filter, e.g. trimet_client=debug";

/// Width detour descriptions are wrapped to.
const WRAP_WIDTH: usize = 80;

#[derive(Debug)]
enum Command {
    Arrivals { stops: Vec<LocationId>, json: bool },
    Detours { routes: Vec<RouteId>, json: bool },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self, String> {
        let (name, rest) = args.split_first().ok_or("missing command")?;

        let json = rest.iter().any(|a| a == "--json");
        let ids = rest.iter().filter(|a| *a != "--json");

        match name.as_str() {
            "arrivals" => {
                let stops = ids
                    .map(|s| s.parse::<LocationId>().map_err(|e| e.to_string()))
                    .collect::<Result<Vec<_>, _>>()?;
                if stops.is_empty() {
                    return Err("arrivals needs at least one stop id".to_string());
                }
                Ok(Command::Arrivals { stops, json })
            }
            "detours" => {
                let routes = ids
                    .map(|s| s.parse::<RouteId>().map_err(|e| e.to_string()))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Command::Detours { routes, json })
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("Error: {msg}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    // Get credentials from environment
    let app_id = std::env::var("TRIMET_APP_ID").unwrap_or_else(|_| {
        eprintln!("Warning: TRIMET_APP_ID not set. API calls will fail.");
        String::new()
    });

    let mut config = TrimetConfig::new(app_id);
    if let Ok(base_url) = std::env::var("TRIMET_BASE_URL") {
        config = config.with_base_url(base_url);
    }

    let outcome = match std::env::var("TRIMET_MOCK_DIR") {
        Ok(dir) => match MockTransport::from_dir(&dir) {
            Ok(mock) => run(TrimetClient::with_transport(config, mock), command).await,
            Err(e) => Err(e),
        },
        Err(_) => match TrimetClient::new(config) {
            Ok(client) => run(client, command).await,
            Err(e) => Err(e),
        },
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run<T: Transport>(
    client: TrimetClient<T>,
    command: Command,
) -> Result<ExitCode, TrimetError> {
    match command {
        Command::Arrivals { stops, json } => {
            let result = client.arrivals(&stops).await?;
            if json {
                return Ok(print_json(&result));
            }
            Ok(match result {
                ServiceResponse::Data(arrivals) => {
                    print_arrivals(&stops, &arrivals);
                    ExitCode::SUCCESS
                }
                ServiceResponse::ServiceError { message } => service_error(&message),
            })
        }
        Command::Detours { routes, json } => {
            let result = client.detours(&routes).await?;
            if json {
                return Ok(print_json(&result));
            }
            Ok(match result {
                ServiceResponse::Data(detours) => {
                    print_detours(&detours);
                    ExitCode::SUCCESS
                }
                ServiceResponse::ServiceError { message } => service_error(&message),
            })
        }
    }
}

fn service_error(message: &str) -> ExitCode {
    eprintln!("Error: {message}");
    ExitCode::FAILURE
}

fn print_json<T: Serialize>(result: &ServiceResponse<T>) -> ExitCode {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: failed to serialize result: {e}");
            return ExitCode::FAILURE;
        }
    }
    if result.is_service_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_arrivals(stops: &[LocationId], arrivals: &Arrivals) {
    match arrivals.query_time {
        Some(t) => println!(
            "[data as of: {}]",
            t.with_timezone(&Local).format("%a, %B %d %Y, %H:%M")
        ),
        None => println!("[data as of: <unavailable>]"),
    }

    let stops: Vec<&str> = stops.iter().map(LocationId::as_str).collect();
    println!("\nArrivals (Stop ID: {}):", stops.join(", "));

    let now = Utc::now();
    for arrival in &arrivals.arrivals {
        let marker = if arrival.estimated.is_some() { " " } else { "*" };
        let minutes = arrival
            .best_time()
            .map(|t| format!("{:>3} minutes", (t - now).num_minutes().max(0)))
            .unwrap_or_else(|| "  ? minutes".to_string());
        println!(
            " {minutes}{marker} (scheduled at {}) -- {}",
            scheduled_label(arrival.scheduled),
            arrival.full_sign.as_deref().unwrap_or("<no sign>")
        );
    }

    println!("\n * calculated from scheduled time, no estimated available.");
}

/// "HH:MM" for today, with the date appended otherwise.
fn scheduled_label(scheduled: Option<DateTime<Utc>>) -> String {
    let Some(scheduled) = scheduled else {
        return "unknown".to_string();
    };
    let local = scheduled.with_timezone(&Local);
    if local.date_naive() == Local::now().date_naive() {
        local.format("%H:%M").to_string()
    } else {
        local.format("%H:%M, %Y/%m/%d").to_string()
    }
}

fn print_detours(detours: &Detours) {
    let blocks: Vec<String> = detours.detours.iter().map(format_detour).collect();
    let separator = format!("{}\n", "--".repeat(20));
    println!("{}", blocks.join(separator.as_str()));
}

fn format_route(route: &Route) -> &str {
    // Bus routes are known by number, rail lines by name.
    let label = if route.is_bus() {
        route.route_id.as_deref()
    } else {
        route.description.as_deref()
    };
    label.unwrap_or("?")
}

fn format_detour(detour: &Detour) -> String {
    let time = |t: Option<DateTime<Utc>>| {
        t.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "open".to_string())
    };
    let routes: Vec<&str> = detour.routes.iter().map(format_route).collect();
    let description = wrap(detour.description.as_deref().unwrap_or(""), WRAP_WIDTH);

    format!(
        "TIME       : {} to {}\nROUTES     : {}\nDESCRIPTION: {}\n",
        time(detour.begin),
        time(detour.end),
        routes.join(", "),
        description.join("\n             ")
    )
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
