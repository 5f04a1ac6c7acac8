use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "fetcher-cli")]
#[command(about = "Command-line client for the eth-fetcher API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more transaction hashes
    Resolve {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// List every stored transaction
    All,
    /// Submit person info to the contract and wait for the receipt
    Save { name: String, age: u64 },
    /// List ingested person info events
    Persons,
    /// Read the number of persons stored in the contract
    Count,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Resolve { hashes } => {
            client
                .get(format!("{}/lime/eth", cli.url))
                .query(&[("transactionHashes", hashes.join(","))])
                .send()
                .await?
        }
        Commands::All => client.get(format!("{}/lime/all", cli.url)).send().await?,
        Commands::Save { name, age } => {
            client
                .post(format!("{}/lime/savePerson", cli.url))
                .json(&json!({ "name": name, "age": age }))
                .send()
                .await?
        }
        Commands::Persons => client.get(format!("{}/lime/listPersons", cli.url)).send().await?,
        Commands::Count => client.get(format!("{}/lime/persons/count", cli.url)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if status == reqwest::StatusCode::ACCEPTED {
        eprintln!("Submitted, but not confirmed before the deadline");
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
