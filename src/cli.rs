//! Command-line interface for promptgen

use clap::{Parser, Subcommand, ValueEnum};
use promptgen::template::Tier;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pgen",
    version,
    about = "Tier-aware prompt template catalog and generation CLI",
    long_about = "pgen renders prompts from a tiered template catalog and ships them to a \
                  generative API. Templates are discovered under project, user, and builtin \
                  root directories; a logical name resolves to exactly one template or fails \
                  with a precise diagnostic, never a silent guess.",
    after_help = "EXAMPLES:
  # Generate from a document on stdin
  cat report.md | pgen generate \"summarize the findings\"

  # Use a named template for the user instruction
  cat report.md | pgen generate --user-template email/summary

  # Inspect the catalog
  pgen template list
  pgen template list --tier project --format json
  pgen template show summary
  pgen template render summary --var tone=formal

  # Inspect configuration
  pgen config view
  pgen config path

  For detailed help on any command, use: pgen <command> --help"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Additional configuration file, merged over user and repository files
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render instructions and run a generation request
    Generate(GenerateArgs),

    /// Inspect and render templates from the catalog
    Template(TemplateCommand),

    /// Inspect the effective configuration
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
#[command(about = "Render the configured instructions and call the generative API")]
pub struct GenerateArgs {
    /// Optional user query, exposed to templates as `input`
    pub input: Option<String>,

    /// Read the document from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    pub document: Option<PathBuf>,

    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Print the rendered prompt instead of calling the API
    #[arg(long)]
    pub show_prompt: bool,

    /// Model identifier override
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum output tokens override
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// Named catalog template for the system instruction
    #[arg(long, value_name = "NAME")]
    pub system_template: Option<String>,

    /// Named catalog template for the user instruction
    #[arg(long, value_name = "NAME")]
    pub user_template: Option<String>,
}

#[derive(Parser, Debug)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub action: TemplateAction,
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// List discovered templates in catalog order
    List {
        /// Restrict the listing to one tier
        #[arg(long, value_enum)]
        tier: Option<TierArg>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// Resolve a name and show the template source and provenance
    Show {
        /// Logical template name
        name: String,
    },

    /// Resolve a name and render it with the given variables
    Render {
        /// Logical template name
        name: String,

        /// Template variable as KEY=VALUE (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },
}

/// Tier selector for the list command
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TierArg {
    /// Project-tier templates
    Project,
    /// User-tier templates
    User,
    /// Builtin-tier templates
    Builtin,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Project => Tier::Project,
            TierArg::User => Tier::User,
            TierArg::Builtin => Tier::Builtin,
        }
    }
}

/// Output format for the list command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// Aligned text, one template per line
    Text,
    /// JSON array of records
    Json,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective merged configuration
    View,

    /// Show configuration file locations and whether they exist
    Path,

    /// Show the built-in default configuration
    Defaults,
}
