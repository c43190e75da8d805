pub mod handlers;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

#[derive(Parser, Debug)]
#[command(name = "suiteop-dashboard")]
#[command(version, about = "Manage lodging workflow automations from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the workflow service
    #[arg(long, global = true, env = "SUITEOP_API_URL")]
    pub api_url: Option<String>,

    /// YAML config file (defaults to <config dir>/suiteop-dashboard/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available triggers
    Triggers,

    /// List available actions
    Actions,

    /// Workflow rule management
    Rules {
        #[command(subcommand)]
        command: RuleCommands,
    },

    /// Ask the AI to draft workflows from a description
    Generate(GenerateArgs),

    /// Show execution logs
    Logs {
        /// Keep polling until interrupted
        #[arg(short, long)]
        follow: bool,
    },

    /// Fire a trigger against the active rules (developer tool)
    Simulate {
        /// Trigger id
        trigger_id: String,
    },

    /// Workflow counters and the most recent rules
    Stats {
        /// How many recent workflows to show
        #[arg(long, default_value_t = crate::services::stats_service::RECENT_WORKFLOW_COUNT)]
        recent: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// List rules, optionally filtered
    List(RuleFilterArgs),

    /// Show one rule
    Show { id: String },

    /// Activate or deactivate a rule
    Toggle {
        id: String,
        /// Desired state; flips the current state when omitted
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a rule
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a rule from flags
    Create(RuleFormArgs),

    /// Edit a rule; omitted flags keep their current values
    Edit {
        id: String,
        #[command(flatten)]
        form: RuleFormArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct RuleFilterArgs {
    /// Case-insensitive text matched against name and description
    #[arg(long)]
    pub search: Option<String>,

    /// Only active (true) or inactive (false) rules
    #[arg(long)]
    pub active: Option<bool>,

    /// all, immediate or scheduled
    #[arg(long = "type")]
    pub rule_type: Option<String>,

    /// Case-insensitive text matched against the trigger name
    #[arg(long)]
    pub trigger: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RuleFormArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Trigger id or exact name
    #[arg(long)]
    pub trigger: Option<String>,

    /// Action id or exact name
    #[arg(long)]
    pub action: Option<String>,

    /// immediate or scheduled
    #[arg(long = "type")]
    pub rule_type: Option<String>,

    /// Delay amount for scheduled rules
    #[arg(long)]
    pub delay: Option<String>,

    /// minutes, hours or days
    #[arg(long)]
    pub unit: Option<String>,

    /// Whether the rule is active
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Natural-language description of the automation
    pub prompt: String,

    /// Load suggestion N (1-based) when several are returned
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub select: Option<usize>,

    /// Save the loaded suggestion as a new rule
    #[arg(long)]
    pub save: bool,
}
