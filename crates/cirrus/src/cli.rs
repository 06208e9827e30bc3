//! Clap derive structures for the `cirrus` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use cirrus_core::RankingPolicy;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cirrus -- manage cloud servers, volumes, domains and load balancers
#[derive(Debug, Parser)]
#[command(
    name = "cirrus",
    version,
    about = "Manage your Cirrus cloud account from the command line",
    long_about = "A CLI for the Cirrus cloud control panel.\n\n\
        Lists servers, volumes, domains and load balancers, searches across\n\
        all of them, and drives server power and migration actions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "CIRRUS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "CIRRUS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Personal access token
    #[arg(long, env = "CIRRUS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CIRRUS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (local API mocks)
    #[arg(long, short = 'k', env = "CIRRUS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CIRRUS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard: a card per resource kind plus recent activity
    #[command(alias = "dash")]
    Dashboard,

    /// Search servers, volumes, domains, load balancers and images
    #[command(alias = "s")]
    Search(SearchArgs),

    /// Manage servers
    #[command(alias = "srv")]
    Servers(ServersArgs),

    /// List block storage volumes
    #[command(alias = "vol")]
    Volumes(VolumesArgs),

    /// List DNS domains
    Domains(DomainsArgs),

    /// List load balancers
    #[command(alias = "lb")]
    LoadBalancers(LoadBalancersArgs),

    /// List public images
    Images(ImagesArgs),

    /// View the account event log
    Events(EventsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Shared arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Max rows to show (0 = all)
    #[arg(long, short = 'l', default_value = "0")]
    pub limit: usize,

    /// Only rows whose label contains this text (case-insensitive)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEARCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query, or a location such as "/search?query=web"
    pub query: String,

    /// Result ordering within each group (overrides config)
    #[arg(long, value_parser = parse_ranking)]
    pub ranking: Option<RankingPolicy>,

    /// Rows shown per group (overrides config)
    #[arg(long)]
    pub group_size: Option<usize>,
}

fn parse_ranking(raw: &str) -> Result<RankingPolicy, String> {
    raw.parse()
        .map_err(|_| format!("expected 'relevance', 'label' or 'source', got '{raw}'"))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServersArgs {
    #[command(subcommand)]
    pub command: ServersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServersCommand {
    /// List servers
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show server details, pending notices and running operations
    Get {
        /// Server ID or label
        server: String,
    },

    /// Power on a server
    Boot {
        /// Server ID or label
        server: String,
    },

    /// Reboot a server
    Reboot {
        /// Server ID or label
        server: String,
    },

    /// Shut down a server
    Shutdown {
        /// Server ID or label
        server: String,
    },

    /// Enter the migration queue now
    Migrate {
        /// Server ID or label
        server: String,
    },

    /// List volumes that can be attached as rescue devices
    RescueDevices {
        /// Server ID or label
        server: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OTHER COLLECTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VolumesArgs {
    #[command(subcommand)]
    pub command: ListOnlyCommand,
}

#[derive(Debug, Args)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: ListOnlyCommand,
}

#[derive(Debug, Args)]
pub struct LoadBalancersArgs {
    #[command(subcommand)]
    pub command: ListOnlyCommand,
}

#[derive(Debug, Args)]
pub struct ImagesArgs {
    #[command(subcommand)]
    pub command: ListOnlyCommand,
}

#[derive(Debug, Subcommand)]
pub enum ListOnlyCommand {
    /// List all items
    #[command(alias = "ls")]
    List(ListArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List recent events
    #[command(alias = "ls")]
    List {
        /// Only operations still running
        #[arg(long)]
        in_progress: bool,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Mark the event log as read up to an event
    Seen {
        /// Event ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Store a token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// List configured profiles
    Profiles,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ranking_flag_parses() {
        let cli = Cli::try_parse_from(["cirrus", "search", "web", "--ranking", "label"]);
        match cli {
            Ok(Cli {
                command: Command::Search(args),
                ..
            }) => {
                assert_eq!(args.ranking, Some(RankingPolicy::Label));
                assert_eq!(args.query, "web");
            }
            other => panic!("expected search command, got {other:?}"),
        }
    }

    #[test]
    fn unknown_ranking_is_rejected() {
        let err = Cli::try_parse_from(["cirrus", "search", "web", "--ranking", "newest"]);
        assert!(err.is_err());
    }
}
