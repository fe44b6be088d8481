use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use urlencoding::encode;

#[derive(Parser)]
#[command(name = "tracing-cli")]
#[command(about = "Query the trace gateway from the command line", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:20001")]
    url: String,

    /// Bearer token, required when the gateway runs with the token strategy.
    #[arg(short, long, env = "TRACE_GATEWAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tracing backend connectivity info
    Info,
    /// List services known to the tracing backend
    Services,
    /// List traces of a service
    Traces {
        namespace: String,
        service: String,
        /// Raw query string forwarded to the backend, e.g. "limit=20&lookback=1h"
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Show a single trace
    Trace { trace_id: String },
    /// List spans of a service
    Spans {
        namespace: String,
        service: String,
        /// Lower bound in microseconds since epoch
        #[arg(long)]
        start: Option<u64>,
        /// Upper bound in microseconds since epoch
        #[arg(long)]
        end: Option<u64>,
    },
}

impl Commands {
    fn path_and_query(&self) -> String {
        match self {
            Commands::Info => "/api/tracing".to_string(),
            Commands::Services => "/api/tracing/services".to_string(),
            Commands::Traces { namespace, service, query } => {
                let base = format!("/api/namespaces/{}/services/{}/traces", encode(namespace), encode(service));
                if query.is_empty() {
                    base
                } else {
                    format!("{}?{}", base, query)
                }
            }
            Commands::Trace { trace_id } => format!("/api/traces/{}", encode(trace_id)),
            Commands::Spans { namespace, service, start, end } => {
                let mut params = Vec::new();
                if let Some(start) = start {
                    params.push(format!("startMicros={}", start));
                }
                if let Some(end) = end {
                    params.push(format!("endMicros={}", end));
                }
                let base = format!("/api/namespaces/{}/services/{}/spans", encode(namespace), encode(service));
                if params.is_empty() {
                    base
                } else {
                    format!("{}?{}", base, params.join("&"))
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path_and_query());
    let res = client.get(url).headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
