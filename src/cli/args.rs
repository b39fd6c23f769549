//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--token <token>`: GitHub token (or `GITHUB_TOKEN`)
//! - `--api-base <url>`: Contents API base URL (or `RDEPLOY_API_BASE`)
//! - `--max-concurrency <n>`: Cap on in-flight requests
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// rdeploy - Mirror part of a GitHub repository and deploy it to an org
#[derive(Parser, Debug)]
#[command(name = "rdeploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// GitHub token sent as a bearer token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the contents API (GitHub Enterprise, test servers)
    #[arg(long, global = true, env = "RDEPLOY_API_BASE", value_name = "URL")]
    pub api_base: Option<String>,

    /// Maximum number of requests in flight
    #[arg(long, global = true, value_name = "N", value_parser = parse_positive)]
    pub max_concurrency: Option<usize>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Which repository to read from.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Repository owner (user or organization)
    #[arg(long, value_name = "OWNER")]
    pub repo_owner: String,

    /// Repository name
    #[arg(long, value_name = "NAME")]
    pub repo_name: String,

    /// Branch, tag, or commit (defaults to the default branch)
    #[arg(long, value_name = "REF")]
    pub repo_ref: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mirror repository files into a local directory
    #[command(
        name = "fetch",
        long_about = "Mirror repository files into a local directory.\n\n\
            Walks the given source directories (or the whole repository) through \
            the GitHub contents API and writes every file under OUTPUT_DIR at its \
            repository path. With --metadata, only files belonging to the named \
            components are written.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Mirror one directory
    rdeploy fetch --repo-owner acme --repo-name crm -d force-app -o ./crm

    # Mirror a tag
    rdeploy fetch --repo-owner acme --repo-name crm --repo-ref v2.1.0 -d force-app -o ./crm

    # Only the files of two components
    rdeploy fetch --repo-owner acme --repo-name crm -m ApexClass:AccountService \\
        -m CustomField:Account.Tier__c -o ./crm

    # Keep going past failing entries and report them at the end
    rdeploy fetch --repo-owner acme --repo-name crm -d force-app -o ./crm --keep-going"
    )]
    Fetch {
        #[command(flatten)]
        repo: RepoArgs,

        /// Repository directory to mirror (repeatable)
        #[arg(long = "source-dir", short = 'd', value_name = "DIR")]
        source_dirs: Vec<String>,

        /// Only write files of this component, as Type:Name (repeatable)
        #[arg(long = "metadata", short = 'm', value_name = "TYPE:NAME")]
        metadata: Vec<String>,

        /// Directory to write into
        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: PathBuf,

        /// Record failing entries instead of stopping at the first one
        #[arg(long)]
        keep_going: bool,

        /// List the files that would be written without downloading them
        #[arg(long)]
        dry_run: bool,
    },

    /// Stage repository source and deploy it to an org
    #[command(
        name = "deploy",
        group(
            ArgGroup::new("selection")
                .required(true)
                .multiple(true)
                .args(["source_dirs", "metadata"])
        ),
        long_about = "Stage repository source and deploy it to an org.\n\n\
            Creates a temporary project, mirrors the requested source into its \
            src/ folder, and runs 'sf project deploy start' against the target \
            org. The staging directory is removed afterwards, whether the \
            fetch or the deploy succeeded or failed, unless --keep-staging is \
            given.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Deploy a source directory
    rdeploy deploy -o my-sandbox --repo-owner acme --repo-name crm -d force-app

    # Deploy individual components from a branch
    rdeploy deploy -o my-sandbox --repo-owner acme --repo-name crm --repo-ref develop \\
        -m ApexClass:AccountService -m ApexTrigger:AccountTrigger

    # Nested types are named Parent.Child
    rdeploy deploy -o my-sandbox --repo-owner acme --repo-name crm -m CustomField:Account.Tier__c

REQUIREMENTS:
    The Salesforce CLI ('sf') must be installed and the target org authorized."
    )]
    Deploy {
        /// Username or alias of the org to deploy to
        #[arg(long, short = 'o', value_name = "ORG")]
        target_org: String,

        #[command(flatten)]
        repo: RepoArgs,

        /// Repository directory to deploy (repeatable)
        #[arg(long = "source-dir", short = 'd', value_name = "DIR")]
        source_dirs: Vec<String>,

        /// Component to deploy, as Type:Name (repeatable)
        #[arg(long = "metadata", short = 'm', value_name = "TYPE:NAME")]
        metadata: Vec<String>,

        /// Minutes to wait for the deploy to finish
        #[arg(long, short = 'w', value_name = "MINUTES")]
        wait: Option<u32>,

        /// Keep the staging directory and print its path, even on failure
        #[arg(long)]
        keep_staging: bool,
    },

    /// List known metadata types and their directories
    #[command(
        name = "types",
        after_help = "\
WORKFLOW EXAMPLES:
    # Everything
    rdeploy types

    # Types whose name or directory contains 'field'
    rdeploy types field"
    )]
    Types {
        /// Case-insensitive substring filter
        filter: Option<String>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for rdeploy commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    rdeploy completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    rdeploy completion zsh >> ~/.zshrc

    # Fish
    rdeploy completion fish > ~/.config/fish/completions/rdeploy.fish

    # PowerShell
    rdeploy completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
