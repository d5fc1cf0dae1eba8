use clap::{Arg, ArgMatches, Command};
use dotenv::dotenv;

use holdings_service::client::{HttpHoldingsApi, WalletViewer};
use holdings_service::models::Chain;

fn cli() -> Command {
    Command::new("Wallet Viewer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Show the ERC-20 tokens and NFTs held by a wallet")
        .arg(
            Arg::new("address")
                .value_name("ADDRESS")
                .help("Wallet address (0x followed by 40 hex digits)")
                .required(true),
        )
        .arg(
            Arg::new("server")
                .short('s')
                .long("server")
                .value_name("URL")
                .env("HOLDINGS_SERVER_URL")
                .default_value("http://localhost:3002")
                .help("Base URL of the holdings service"),
        )
        .arg(
            Arg::new("chain")
                .short('c')
                .long("chain")
                .value_name("CHAIN")
                .env("DEFAULT_CHAIN")
                .default_value("base")
                .help("Chain to query and link to (eth, base, polygon, ...)"),
        )
}

/// The chain is always sent so explorer links match the data
fn build_viewer(matches: &ArgMatches) -> Result<WalletViewer<HttpHoldingsApi>, Box<dyn std::error::Error>> {
    let server = matches
        .get_one::<String>("server")
        .map(String::as_str)
        .unwrap_or("http://localhost:3002");
    let chain = match matches.get_one::<String>("chain") {
        Some(raw) => raw.parse::<Chain>()?,
        None => Chain::default(),
    };

    let api = HttpHoldingsApi::new(server, Some(chain))?;
    Ok(WalletViewer::new(api, chain))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let matches = cli().get_matches();
    let address = matches
        .get_one::<String>("address")
        .map(String::as_str)
        .unwrap_or_default();
    let mut viewer = build_viewer(&matches)?;

    println!("Loading...");
    viewer.submit(address).await;

    if let Some(error) = viewer.error() {
        eprintln!("{}", error);
        std::process::exit(1);
    }

    let rows = viewer.rows();
    if rows.is_empty() {
        println!("No tokens or NFTs found.");
        return Ok(());
    }

    if let Some(link) = viewer.address_link() {
        println!("Assets for {}", link);
    }
    println!(
        "{:<7} {:<24} {:<10} {:<28} {}",
        "TYPE", "NAME", "SYMBOL", "BALANCE/TOKEN ID", "CONTRACT"
    );
    for row in rows {
        println!(
            "{:<7} {:<24} {:<10} {:<28} {}",
            row.kind, row.name, row.symbol, row.amount, row.contract
        );
        if let Some(image) = &row.image {
            println!("        image: {}", image);
        }
        for line in &row.details {
            println!("        {}", line);
        }
    }

    Ok(())
}
