use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use url_redirector::config::{load_config, MatcherConfig, ObservabilityConfig};
use url_redirector::observability::logging::init_logging;
use url_redirector::stats::{format_last_redirect, now_millis};
use url_redirector::store::{FileStore, Store};
use url_redirector::{QuickAccess, Redirector, RuleManager};

#[derive(Parser)]
#[command(name = "redirector-cli")]
#[command(about = "Manage URL redirection rules and statistics", long_about = None)]
struct Cli {
    /// Store file shared with the gateway.
    #[arg(short, long, default_value = "redirector-store.json")]
    store: PathBuf,

    /// Take the store path and matcher settings from a config file instead.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List rules in match order
    List,
    /// Append a rule
    Add {
        #[arg(long, default_value = "")]
        source: String,
        #[arg(long, default_value = "")]
        destination: String,
        /// Add the rule disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Change a rule's source URL
    SetSource { position: usize, url: String },
    /// Change a rule's destination URL
    SetDestination { position: usize, url: String },
    /// Enable a rule
    Enable { position: usize },
    /// Disable a rule
    Disable { position: usize },
    /// Flip a rule between enabled and disabled
    Toggle { position: usize },
    /// Enable all rules if none is enabled, otherwise disable all
    ToggleAll,
    /// Delete a rule
    Delete { position: usize },
    /// Replace all rules with the contents of a JSON file
    Import { file: PathBuf },
    /// Export rules as JSON (stdout unless --output is given)
    Export {
        /// File, or directory to place a timestamped file in
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show redirect statistics, most used first
    Stats,
    /// Delete all statistics
    ClearStats,
    /// Active rules and total redirects
    Summary,
    /// Show where a URL would be redirected
    Check {
        url: String,
        /// Count the redirect in the statistics
        #[arg(long)]
        record: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (store_path, matcher) = match &cli.config {
        Some(path) => {
            let config = load_config(path)?;
            (PathBuf::from(config.store.path), config.matcher)
        }
        None => (cli.store.clone(), MatcherConfig::default()),
    };

    init_logging(&ObservabilityConfig {
        log_level: if cli.verbose { "debug" } else { "warn" }.to_string(),
        ..ObservabilityConfig::default()
    });

    let store: Arc<dyn Store> = Arc::new(FileStore::open(&store_path)?);
    tracing::debug!(path = ?store_path, "Store opened");

    match cli.command {
        Commands::List => {
            let rules = RuleManager::new(store).rules();
            if rules.is_empty() {
                println!("No rules configured. Use `add` to create one.");
            }
            for (i, rule) in rules.iter().enumerate() {
                println!(
                    "{:>3}. [{}] {} -> {}",
                    i + 1,
                    if rule.enabled { "x" } else { " " },
                    rule.source,
                    rule.destination
                );
            }
        }
        Commands::Add {
            source,
            destination,
            disabled,
        } => {
            let index = RuleManager::new(store).add_rule(&source, &destination, !disabled)?;
            println!("Added rule {}", index + 1);
        }
        Commands::SetSource { position, url } => {
            RuleManager::new(store).set_source(to_index(position)?, &url)?;
            println!("Rules saved successfully!");
        }
        Commands::SetDestination { position, url } => {
            RuleManager::new(store).set_destination(to_index(position)?, &url)?;
            println!("Rules saved successfully!");
        }
        Commands::Enable { position } => {
            RuleManager::new(store).set_enabled(to_index(position)?, true)?;
            println!("Rule {} enabled", position);
        }
        Commands::Disable { position } => {
            RuleManager::new(store).set_enabled(to_index(position)?, false)?;
            println!("Rule {} disabled", position);
        }
        Commands::Toggle { position } => {
            let enabled = QuickAccess::new(store).toggle_rule(to_index(position)?)?;
            println!("Rule {} {}", position, if enabled { "enabled" } else { "disabled" });
        }
        Commands::ToggleAll => {
            let enabled = QuickAccess::new(store).toggle_all()?;
            println!("All rules {}", if enabled { "enabled" } else { "disabled" });
        }
        Commands::Delete { position } => {
            let removed = RuleManager::new(store).delete_rule(to_index(position)?)?;
            println!("Deleted {} -> {}", removed.source, removed.destination);
        }
        Commands::Import { file } => {
            let text = fs::read_to_string(&file)?;
            let count = RuleManager::new(store).import_json(&text)?;
            println!("Rules imported successfully! ({} rules)", count);
        }
        Commands::Export { output } => {
            let text = RuleManager::new(store).export_json()?;
            match output {
                None => println!("{}", text),
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(RuleManager::export_file_name(now_millis()))
                    } else {
                        path
                    };
                    fs::write(&path, text)?;
                    println!("Rules exported successfully to {}", path.display());
                }
            }
        }
        Commands::Stats => {
            let stats = RuleManager::new(store).stats_sorted();
            if stats.is_empty() {
                println!("No redirections yet");
            }
            for stat in stats {
                println!(
                    "{:>6}  {} -> {}  (last: {})",
                    stat.count,
                    stat.source,
                    stat.destination,
                    format_last_redirect(stat.last_redirect)
                );
            }
        }
        Commands::ClearStats => {
            RuleManager::new(store).clear_stats()?;
            println!("Statistics cleared");
        }
        Commands::Summary => {
            let summary = QuickAccess::new(store).summary();
            println!("Active rules:    {} / {}", summary.active_rules, summary.total_rules);
            println!("Total redirects: {}", summary.total_redirects);
        }
        Commands::Check { url, record } => {
            let redirector = Redirector::new(store, &matcher);
            let redirect = if record {
                redirector.handle(&url, now_millis())
            } else {
                redirector.preview(&url)
            };
            match redirect {
                Some(r) => println!("{} -> {} (rule {})", url, r.url, r.rule_index + 1),
                None => println!("{}: no rule matches", url),
            }
        }
    }

    Ok(())
}

/// Convert a 1-based position from the command line.
fn to_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "Rule positions start at 1".to_string())
}
