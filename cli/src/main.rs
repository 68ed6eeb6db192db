//! agora: offline tooling around a governor's configuration and store.

use std::path::PathBuf;

use agora_governance::{read_deposit_totals, read_proposals, GovernorConfig, ProposalType};
use agora_store::{MetaStore, CURRENT_SCHEMA_VERSION};
use agora_store_lmdb::{check_integrity, LmdbEnvironment};
use agora_types::TokenAmount;
use agora_utils::{format_blocks, init_logging, LogFormat};
use anyhow::{bail, Context};
use clap::Parser;

/// Assumed block time when printing block counts as durations.
const DISPLAY_BLOCK_TIME_SECS: u64 = 12;

#[derive(Parser)]
#[command(name = "agora", about = "Agora governance engine tooling")]
struct Cli {
    /// Path to a TOML configuration file. Without one, built-in defaults apply.
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory of the LMDB store (overrides the config file).
    #[arg(long, env = "AGORA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in bytes.
    #[arg(long, default_value_t = agora_store_lmdb::environment::DEFAULT_MAP_SIZE, env = "AGORA_MAP_SIZE")]
    map_size: usize,

    /// Log level: "trace", "debug", "info", "warn", "error" (overrides the config file).
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json" (overrides the config file).
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Inspect the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect the LMDB store.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Read persisted proposals.
    Proposals {
        #[command(subcommand)]
        action: ProposalsAction,
    },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Parse and validate the configuration, then print a summary.
    Check,
    /// Print the default configuration as TOML.
    Default,
}

#[derive(clap::Subcommand)]
enum StoreAction {
    /// Print the schema version and per-database entry counts.
    Info,
    /// Open the store, bringing its schema up to date.
    Migrate,
}

#[derive(clap::Subcommand)]
enum ProposalsAction {
    /// List every stored proposal with its deposit total.
    List {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<GovernorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_str().context("config path is not valid UTF-8")?;
            GovernorConfig::from_toml_file(path).with_context(|| format!("loading {}", path))?
        }
        None => GovernorConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format.to_string();
    }
    Ok(config)
}

fn open_store(config: &GovernorConfig, map_size: usize) -> anyhow::Result<LmdbEnvironment> {
    if !config.data_dir.exists() {
        bail!("no store at {}", config.data_dir.display());
    }
    LmdbEnvironment::open(&config.data_dir, map_size)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))
}

fn print_summary(config: &GovernorConfig) {
    println!("governor:          {}", config.governor_address);
    println!("quorum:            {}%", config.quorum_numerator);
    println!(
        "min voting delay:  {}",
        format_blocks(config.min_voting_delay, DISPLAY_BLOCK_TIME_SECS)
    );
    println!("restricted calls:  {}", config.function_restriction_enabled);
    println!("quadratic voting:  {}", !config.quadratic_voting_disabled);
    for proposal_type in ProposalType::ALL {
        let t = config.proposal_types.get(proposal_type);
        println!(
            "{:<8} deposit {} bps (cap {}), vote threshold {}, proposer level {}",
            proposal_type.to_string(),
            t.deposit_threshold_bps,
            t.deposit_threshold_cap,
            t.voting_threshold,
            t.required_proposer_level
        );
    }
    println!(
        "roles:             {} admin(s), {} settings manager(s), {} state manager(s), {} executor(s)",
        config.roles.admins.len(),
        config.roles.settings_managers.len(),
        config.roles.proposal_state_managers.len(),
        config.roles.executors.len()
    );
}

fn list_proposals(env: &LmdbEnvironment, json: bool) -> anyhow::Result<()> {
    let store = env.governance_store();
    let proposals = read_proposals(&store)?;
    let totals = read_deposit_totals(&store)?;

    if json {
        let rows: Vec<serde_json::Value> = proposals
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id.to_string(),
                    "proposer": p.proposer.to_string(),
                    "type": p.proposal_type.to_string(),
                    "description": p.description,
                    "start_round": p.start_round,
                    "created_at": p.created_at,
                    "deposit_threshold": p.deposit_threshold.to_string(),
                    "deposits": totals.get(&p.id).copied().unwrap_or_default().to_string(),
                    "actions": p.actions.len(),
                    "cancelled": p.flags.cancelled,
                    "executed": p.flags.executed,
                    "development": format!("{:?}", p.flags.development),
                    "queued_at": p.queued_at.map(|t| t.as_secs()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if proposals.is_empty() {
        println!("no proposals");
        return Ok(());
    }
    for p in &proposals {
        let deposits = totals.get(&p.id).copied().unwrap_or(TokenAmount::ZERO);
        println!(
            "{}  {:<8} round {:>4}  deposits {}/{}  {}",
            p.id,
            p.proposal_type.to_string(),
            p.start_round,
            deposits,
            p.deposit_threshold,
            p.description
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level);

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Check => {
                config.validate()?;
                tracing::info!("configuration is valid");
                print_summary(&config);
            }
            ConfigAction::Default => {
                print!("{}", GovernorConfig::default().to_toml_string()?);
            }
        },
        Command::Store { action } => match action {
            StoreAction::Info => {
                let env = open_store(&config, cli.map_size)?;
                let version = env.meta_store().get_schema_version()?;
                let report = check_integrity(env.env())?;
                println!("schema version: {} (supported {})", version, CURRENT_SCHEMA_VERSION);
                for (name, count) in &report.entries {
                    println!("{:<10} {}", name, count);
                }
                if !report.is_healthy() {
                    for error in &report.errors {
                        tracing::error!(%error, "integrity check failed");
                    }
                    bail!("store failed {} integrity check(s)", report.errors.len());
                }
            }
            StoreAction::Migrate => {
                let env = LmdbEnvironment::open(&config.data_dir, cli.map_size)
                    .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
                let version = env.meta_store().get_schema_version()?;
                tracing::info!(version, path = %config.data_dir.display(), "store is at the current schema");
            }
        },
        Command::Proposals { action } => match action {
            ProposalsAction::List { json } => {
                let env = open_store(&config, cli.map_size)?;
                list_proposals(&env, json)?;
            }
        },
    }

    Ok(())
}
