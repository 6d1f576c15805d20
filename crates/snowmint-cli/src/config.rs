use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use snowmint::{DEFAULT_EPOCH, NodeId};

/// Runtime configuration for the `snowmint` binary.
///
/// Node identity and epoch are deployment settings: every process minting IDs
/// must run with a distinct `(datacenter, worker)` pair and the same epoch.
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowmint",
    version,
    about = "Mint and decode Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Datacenter ID encoded into minted IDs (0-31).
    ///
    /// Environment variable: `SNOWMINT_DATACENTER_ID`
    #[arg(long, short = 'd', env = "SNOWMINT_DATACENTER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub datacenter_id: i64,

    /// Worker ID encoded into minted IDs (0-31).
    ///
    /// Environment variable: `SNOWMINT_WORKER_ID`
    #[arg(long, short = 'w', env = "SNOWMINT_WORKER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Origin of the timestamp field, in milliseconds since the Unix epoch.
    ///
    /// Must match across every node sharing an ID space and must never change
    /// once IDs have been issued.
    ///
    /// Environment variable: `SNOWMINT_EPOCH_MS`
    #[arg(long, env = "SNOWMINT_EPOCH_MS", default_value_t = DEFAULT_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    /// Emit logs as JSON instead of human-readable text.
    ///
    /// Environment variable: `SNOWMINT_LOG_JSON`
    #[arg(long, env = "SNOWMINT_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint IDs for the configured node, one per line.
    Mint {
        /// Number of IDs to mint.
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,

        /// Print IDs zero-padded to 20 digits so they sort as strings.
        #[arg(long, default_value_t = false)]
        padded: bool,
    },
    /// Print the fields packed into each ID.
    Decode {
        /// Decimal IDs to decode.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node: NodeId,
    pub epoch: Duration,
    pub log_json: bool,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let node = NodeId::try_from((args.datacenter_id, args.worker_id))
            .context("SNOWMINT_DATACENTER_ID and SNOWMINT_WORKER_ID must be within 0..=31")?;

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before 1970")?
            .as_millis() as u64;
        if args.epoch_ms > now_ms {
            bail!(
                "SNOWMINT_EPOCH_MS ({}) is in the future (now = {})",
                args.epoch_ms,
                now_ms
            );
        }

        if let Command::Mint { count: 0, .. } = args.command {
            bail!("--count must be greater than 0");
        }

        Ok(Self {
            node,
            epoch: Duration::from_millis(args.epoch_ms),
            log_json: args.log_json,
            command: args.command,
        })
    }
}
