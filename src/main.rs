//! txnview - browse, filter and approve transactions from the command line
//!
//! Drives the view synchronizer against the transactions API, or against a
//! built-in demo dataset when no API URL is configured.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use txnview::{
    Backend, Config, EmployeeFilter, HttpBackend, InMemoryBackend, Transaction, ViewSynchronizer,
};

/// CLI command
#[derive(Debug)]
enum Command {
    /// Page through all transactions
    Browse { pages: usize },
    /// List the employee directory
    Employees,
    /// Show one employee's transactions
    Employee { employee_id: String },
    /// Set a transaction's approval flag
    Approve { transaction_id: String, value: bool },
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"txnview - Browse and approve transactions

USAGE:
    txnview browse [pages]                       # Show the first page(s) of all transactions
    txnview employees                            # List employees
    txnview employee <employee_id>               # Show one employee's transactions
    txnview approve <transaction_id> <true|false>
    txnview help

ENVIRONMENT:
    TXNVIEW_API_URL               Transactions API base URL (demo data if unset)
    TXNVIEW_REQUEST_TIMEOUT_SECS  Request timeout (default 30)
    TXNVIEW_CACHE_TTL_SECS        Optional cache entry lifetime
    TXNVIEW_PAGE_SIZE             Demo backend page size (default 5)
    RUST_LOG                      Log filter, e.g. `debug` or `txnview=trace` (default info)
"#
    );
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Browse { pages: 1 });
    }

    match args[1].as_str() {
        "browse" => {
            let pages = match args.get(2) {
                Some(n) => n
                    .parse::<usize>()
                    .map_err(|_| anyhow!("Page count must be a number, got '{}'", n))?,
                None => 1,
            };
            Ok(Command::Browse { pages: pages.max(1) })
        }
        "employees" => Ok(Command::Employees),
        "employee" => {
            let employee_id = args
                .get(2)
                .ok_or_else(|| anyhow!("Usage: txnview employee <employee_id>"))?;
            Ok(Command::Employee {
                employee_id: employee_id.clone(),
            })
        }
        "approve" => {
            if args.len() < 4 {
                return Err(anyhow!("Usage: txnview approve <transaction_id> <true|false>"));
            }
            let value = args[3]
                .parse::<bool>()
                .map_err(|_| anyhow!("Approval value must be 'true' or 'false', got '{}'", args[3]))?;
            Ok(Command::Approve {
                transaction_id: args[2].clone(),
                value,
            })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            Ok(Command::Help)
        }
    }
}

fn build_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    match &config.api_url {
        Some(url) => {
            info!(url = %url, "Using transactions API");
            let backend = HttpBackend::new(url, config.request_timeout)
                .context("Failed to create API client")?;
            Ok(Arc::new(backend))
        }
        None => {
            info!(page_size = config.page_size, "No API URL configured, using demo data");
            Ok(Arc::new(InMemoryBackend::seeded().with_page_size(config.page_size)))
        }
    }
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions.");
        return;
    }
    for t in transactions {
        println!(
            "  [{}] {}  {}  {:<24} {:>10.2}  {}",
            if t.approved { "x" } else { " " },
            t.id,
            t.date,
            t.merchant,
            t.amount,
            t.employee.full_name()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Parse command
    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    let config = Config::from_env().context("Invalid configuration")?;
    let backend = build_backend(&config)?;
    let view = ViewSynchronizer::with_cache_ttl(backend, config.cache_ttl);

    match command {
        Command::Browse { pages } => {
            view.load_all_transactions().await?;
            for _ in 1..pages {
                if !view.can_load_more().await {
                    break;
                }
                view.view_more().await?;
            }

            print_transactions(&view.results().await);
            if view.can_load_more().await {
                println!("More transactions available (try `txnview browse {}`).", pages + 1);
            }
        }
        Command::Employees => {
            if let Err(e) = view.load_all_transactions().await {
                error!(error = %e, "Failed to load employees");
                return Err(e.into());
            }
            for option in view.filter_options().await {
                match option.filter {
                    EmployeeFilter::Employee(id) => println!("  {:<10} {}", id, option.label),
                    EmployeeFilter::Unfiltered => println!("  {:<10} {}", "-", option.label),
                }
            }
        }
        Command::Employee { employee_id } => {
            view.change_filter(EmployeeFilter::from_id(&employee_id)).await?;
            print_transactions(&view.results().await);
        }
        Command::Approve {
            transaction_id,
            value,
        } => {
            view.set_transaction_approval(&transaction_id, value).await?;
            println!(
                "Transaction {} {}.",
                transaction_id,
                if value { "approved" } else { "unapproved" }
            );
        }
        Command::Help => {
            print_help();
        }
    }

    Ok(())
}
