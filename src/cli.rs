use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "agentreg",
    about = "Agent registry - agents, skills, tasks and reputation for a simulated agent marketplace",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/agentreg/logs/agentreg.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to agentreg.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    /// Start from a registry snapshot instead of the seeded registry
    #[arg(long, global = true, value_name = "SNAPSHOT")]
    pub load: Option<PathBuf>,

    /// Write the registry snapshot here after the command finishes
    #[arg(long, global = true, value_name = "SNAPSHOT")]
    pub save: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse and register agents
    Agents {
        #[command(subcommand)]
        action: AgentsAction,
    },

    /// List, search and run skills
    Skills {
        #[command(subcommand)]
        action: SkillsAction,
    },

    /// Inspect and record tasks
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },

    /// Show registry statistics
    Stats {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Human-readable digest of the local agent and registry
    Summary,

    /// Refresh live data from source control and market data
    Crawl {
        /// Keep crawling on the configured interval until interrupted
        #[arg(long)]
        watch: bool,

        /// Stop after this many cycles (with --watch)
        #[arg(long)]
        cycles: Option<usize>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the machine-readable manifest for outside tooling
    Manifest {
        /// Print the JSON export instead of the SKILL.md document
        #[arg(long)]
        json: bool,
    },

    /// Registry snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum AgentsAction {
    /// List agents, highest reputation first
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive search over name, description, tags and capabilities
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only agents with an enabled capability matching this name
        #[arg(long)]
        capability: Option<String>,

        /// Max results
        #[arg(long)]
        limit: Option<usize>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show agent details
    Show {
        /// Agent id
        id: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Register an external agent
    Register {
        /// Agent name
        name: String,

        /// What the agent does
        #[arg(long, short = 'd')]
        description: String,

        /// Category (framework, trading, defi, nft, analytics, utility, other)
        #[arg(long, default_value = "other")]
        category: String,

        /// Capability names (comma-separated)
        #[arg(long, value_delimiter = ',')]
        capabilities: Vec<String>,

        /// Tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Source repository (URL or owner/name)
        #[arg(long)]
        github: Option<String>,

        /// Website URL
        #[arg(long)]
        website: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SkillsAction {
    /// List registered skills
    List {
        /// Filter by category (defi, nft, analytics, trading, utility)
        #[arg(long)]
        category: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Search skills by name, description or category
    Search {
        /// Search query
        query: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Run a skill
    Run {
        /// Skill id, name or slug
        skill: String,

        /// Parameters as key=value
        #[arg(trailing_var_arg = true)]
        params: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TasksAction {
    /// Task history, newest first
    List {
        /// Agent id (defaults to the local agent)
        #[arg(long)]
        agent: Option<String>,

        /// Max results
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Record a finished task for the local agent
    Record {
        /// Task description
        description: String,

        /// Skill name
        #[arg(long)]
        skill: String,

        /// Record the task as failed
        #[arg(long)]
        failed: bool,
    },
}

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// Write the registry snapshot to a file
    Export {
        /// Output path
        path: PathBuf,
    },
}
