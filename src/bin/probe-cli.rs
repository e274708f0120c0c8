use clap::{Parser, Subcommand};
use reqwest::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "probe-cli")]
#[command(about = "Command-line client for the Claude Code probe endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a probe (GET) and print the result
    Run,
    /// Send a CORS preflight (OPTIONS) and print the headers
    Preflight,
    /// Send a POST to confirm it is rejected
    Post,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Run => {
            let res = client.get(&cli.url).send().await?;
            print_response(res).await?;
        }
        Commands::Preflight => {
            let res = client.request(Method::OPTIONS, &cli.url).send().await?;
            println!("Status: {}", res.status());
            for name in [
                ACCESS_CONTROL_ALLOW_ORIGIN,
                ACCESS_CONTROL_ALLOW_METHODS,
                ACCESS_CONTROL_ALLOW_HEADERS,
            ] {
                let value = res
                    .headers()
                    .get(&name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("<missing>");
                println!("{}: {}", name, value);
            }
        }
        Commands::Post => {
            let res = client
                .post(&cli.url)
                .header(CONTENT_TYPE, "application/json")
                .body("{}")
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("Status: {}", status);

    let json: Value = res.json().await?;
    if json.get("status").and_then(Value::as_str) == Some("error") {
        eprintln!(
            "Probe failed ({}): {}",
            json["error"]["type"].as_str().unwrap_or("unknown"),
            json["error"]["suggestion"].as_str().unwrap_or_default()
        );
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
