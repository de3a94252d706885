use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use header_guard::security::headers::display_value;
use header_guard::security::{HeaderPolicy, Violation};

#[derive(Parser)]
#[command(name = "header-audit")]
#[command(about = "Check a URL's response headers against the hardened header policy", long_about = None)]
struct Cli {
    /// URL to request.
    #[arg(default_value = "http://localhost:8080/")]
    url: String,

    /// HTTP method to use.
    #[arg(short, long, default_value = "GET")]
    method: String,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    url: &'a str,
    status: u16,
    compliant: bool,
    violations: Vec<ViolationEntry>,
}

#[derive(Serialize)]
struct ViolationEntry {
    header: String,
    kind: &'static str,
    expected: Option<String>,
    actual: Vec<String>,
}

impl From<&Violation> for ViolationEntry {
    fn from(v: &Violation) -> Self {
        Self {
            header: v.name().to_string(),
            kind: v.kind(),
            expected: v.expected().map(display_value),
            actual: v.actual().iter().map(display_value).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let method = reqwest::Method::from_bytes(cli.method.to_ascii_uppercase().as_bytes())?;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let res = client.request(method, &cli.url).send().await?;

    let policy = HeaderPolicy::hardened();
    let violations = policy.audit(res.headers());

    match cli.format {
        Format::Json => {
            let report = Report {
                url: &cli.url,
                status: res.status().as_u16(),
                compliant: violations.is_empty(),
                violations: violations.iter().map(ViolationEntry::from).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            println!("{} -> {}", cli.url, res.status());
            if violations.is_empty() {
                println!("OK: all {} policy headers comply", policy.len());
            }
            for violation in &violations {
                println!("FAIL {violation}");
            }
        }
    }

    Ok(if violations.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
