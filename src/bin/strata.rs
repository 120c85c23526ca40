//! # Strata CLI
//!
//! Command-line front end for the Strata engine. Each subcommand maps to one
//! engine operation; this file only parses arguments and prints outcomes.
//!
//! ## Usage
//! ```bash
//! strata init
//! strata add a.txt src/lib.rs
//! strata commit "First change"
//! strata branch-create feature
//! strata checkout master
//! strata checkout -- a.txt        # discard local edits
//! strata merge feature
//! strata log HEAD~3
//! ```
//!
//! Paths are relative to the repository root (`--path`, default `.`).

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use strata::{CheckoutOutcome, MergeOutcome, Result, Strata, StrataBuilder, StrataError};
use tracing_subscriber::EnvFilter;

/// Strata CLI - local version control with branches
#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Track file snapshots, switch between them and merge branches")]
#[command(long_about = None)]
struct Cli {
    /// Repository root (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository with an initial commit
    Init {
        /// Name of the first branch
        #[arg(long, default_value = strata::DEFAULT_BRANCH)]
        branch: String,

        /// Ignore patterns (glob syntax, relative to the root)
        #[arg(short, long)]
        ignore: Vec<String>,

        /// Author recorded on commits
        #[arg(long)]
        author: Option<String>,
    },

    /// Record staged changes
    #[command(alias = "ci")]
    Commit {
        /// Commit message
        message: String,
    },

    /// Move the current branch to a revision and rewrite the working tree
    Reset {
        /// Branch, HEAD~n or commit identifier
        revision: String,
    },

    /// Show history from head
    Log {
        /// Stop before this revision
        revision: Option<String>,
    },

    /// Switch to a revision, or discard local edits with `-- <paths>`
    #[command(alias = "co")]
    Checkout {
        /// Branch, HEAD~n or commit identifier
        revision: Option<String>,

        /// Paths to restore to their last committed content
        #[arg(last = true)]
        paths: Vec<PathBuf>,
    },

    /// Show working tree status
    #[command(alias = "st")]
    Status,

    /// Stage files for the next commit
    Add {
        /// Files to stage
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove tracked files, or unstage new ones
    Rm {
        /// Files to remove
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Create a branch at head and switch to it
    #[command(name = "branch-create")]
    BranchCreate {
        /// Branch name
        name: String,
    },

    /// Delete a branch
    #[command(name = "branch-remove")]
    BranchRemove {
        /// Branch name
        name: String,
    },

    /// List branches
    #[command(name = "show-branches")]
    ShowBranches,

    /// Merge a branch into the current one
    Merge {
        /// Branch to merge
        branch: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e.user_message());
        std::process::exit(1);
    }
}

/// Main command runner
fn run(cli: Cli) -> Result<()> {
    let root_path = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Init { branch, ignore, author } => cmd_init(root_path, branch, ignore, author),
        Commands::Commit { message } => cmd_commit(root_path, message),
        Commands::Reset { revision } => cmd_reset(root_path, revision),
        Commands::Log { revision } => cmd_log(root_path, revision),
        Commands::Checkout { revision, paths } => cmd_checkout(root_path, revision, paths),
        Commands::Status => cmd_status(root_path),
        Commands::Add { paths } => cmd_add(root_path, paths),
        Commands::Rm { paths } => cmd_rm(root_path, paths),
        Commands::BranchCreate { name } => cmd_branch_create(root_path, name),
        Commands::BranchRemove { name } => cmd_branch_remove(root_path, name),
        Commands::ShowBranches => cmd_show_branches(root_path),
        Commands::Merge { branch } => cmd_merge(root_path, branch),
    }
}

fn cmd_init(
    root_path: PathBuf,
    branch: String,
    ignore: Vec<String>,
    author: Option<String>,
) -> Result<()> {
    let mut builder = StrataBuilder::new().default_branch(branch).ignore_patterns(ignore);
    if let Some(author) = author {
        builder = builder.author(author);
    }
    let mut strata = builder.open(&root_path)?;
    let commit = strata.init()?;

    println!("{} Initialized repository", "✓".green().bold());
    println!("  Root: {}", root_path.display().to_string().cyan());
    println!("  Branch: {}", strata.current_branch().cyan());
    println!("  Initial commit: {}", commit.short_id().yellow());
    Ok(())
}

fn cmd_commit(root_path: PathBuf, message: String) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;
    let commit = strata.commit(&message)?;

    println!(
        "{} Committed {} on {}",
        "✓".green().bold(),
        commit.short_id().yellow().bold(),
        strata.current_branch().cyan()
    );
    println!("  Files changed: {}", commit.files.len().to_string().cyan());
    Ok(())
}

fn cmd_reset(root_path: PathBuf, revision: String) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;
    let summary = strata.reset(&revision)?;
    println!("{} {}", "✓".green().bold(), summary);
    Ok(())
}

fn cmd_log(root_path: PathBuf, revision: Option<String>) -> Result<()> {
    let strata = Strata::open(&root_path)?;
    let entries = strata.log(revision.as_deref())?;

    if entries.is_empty() {
        println!("{}", "No commits to show.".yellow());
        return Ok(());
    }
    for entry in entries {
        println!("{} {}", "commit".yellow(), entry.id.yellow().bold());
        if let Some(author) = &entry.author {
            println!("Author: {}", author);
        }
        println!("Date:   {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S %Z"));
        println!();
        println!("    {}", entry.message);
        println!();
    }
    Ok(())
}

fn cmd_checkout(root_path: PathBuf, revision: Option<String>, paths: Vec<PathBuf>) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;

    if !paths.is_empty() {
        let outcome = strata.checkout_reset_changes(&paths)?;
        for path in &outcome.restored {
            println!("  {} {}", "restored".green(), path.display());
        }
        for path in &outcome.skipped {
            println!("  {} {} (staged)", "skipped".yellow(), path.display());
        }
        println!("{} {}", "✓".green().bold(), outcome);
        return Ok(());
    }

    let revision = revision.ok_or_else(|| StrataError::not_found("no revision given"))?;
    match strata.checkout(&revision)? {
        CheckoutOutcome::Completed(summary) => {
            println!("{} {}", "✓".green().bold(), summary);
        }
        CheckoutOutcome::Refused { staged, modified } => {
            println!("{}", "Stash your changes".yellow().bold());
            print_refusal(&staged, &modified);
        }
    }
    Ok(())
}

fn cmd_status(root_path: PathBuf) -> Result<()> {
    let strata = Strata::open(&root_path)?;
    let report = strata.status()?;

    println!("Current branch is {}", report.branch.cyan().bold());
    if report.is_clean() {
        println!("{}", "Everything up to date".green());
        return Ok(());
    }

    let sections = [
        ("Untracked files:", &report.untracked),
        ("Modified files:", &report.modified),
        ("Removed files:", &report.removed),
    ];
    for (title, paths) in sections {
        if !paths.is_empty() {
            println!("{}", title.bold());
            for path in paths {
                println!("  {}", path.display().to_string().red());
            }
        }
    }

    if report.staged_count() > 0 {
        println!("{}", "Ready to commit:".bold());
        for path in &report.staged_new {
            println!("  {} {}", "new file:".green(), path.display());
        }
        for path in &report.staged_modified {
            println!("  {} {}", "modified:".green(), path.display());
        }
        for path in &report.staged_removed {
            println!("  {} {}", "removed:".green(), path.display());
        }
    }
    Ok(())
}

fn cmd_add(root_path: PathBuf, paths: Vec<PathBuf>) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;
    let staged = strata.add(&paths)?;
    println!("{} Staged {} file(s)", "✓".green().bold(), staged.len());
    Ok(())
}

fn cmd_rm(root_path: PathBuf, paths: Vec<PathBuf>) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;
    let removed = strata.remove(&paths)?;
    println!("{} Removed {} file(s)", "✓".green().bold(), removed.len());
    Ok(())
}

fn cmd_branch_create(root_path: PathBuf, name: String) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;
    strata.branch_create(&name)?;
    println!("{} Created branch {}", "✓".green().bold(), name.cyan().bold());
    Ok(())
}

fn cmd_branch_remove(root_path: PathBuf, name: String) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;
    if strata.branch_remove(&name)? {
        println!("{} Removed branch {}", "✓".green().bold(), name.cyan());
    } else {
        println!("{} {}", "No such branch:".yellow(), name);
    }
    Ok(())
}

fn cmd_show_branches(root_path: PathBuf) -> Result<()> {
    let strata = Strata::open(&root_path)?;
    let current = strata.current_branch().to_string();
    for name in strata.show_branches()? {
        if name == current {
            println!("* {}", name.green().bold());
        } else {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn cmd_merge(root_path: PathBuf, branch: String) -> Result<()> {
    let mut strata = Strata::open(&root_path)?;
    match strata.merge(&branch)? {
        MergeOutcome::Merged { commit_id, conflicts, added } => {
            for path in &conflicts {
                println!("{} {}", "Fix".red().bold(), path.display());
            }
            println!(
                "{} Merged {} into {} as {}",
                "✓".green().bold(),
                branch.cyan(),
                strata.current_branch().cyan(),
                commit_id[..8.min(commit_id.len())].yellow()
            );
            println!("  Added: {}", added.len().to_string().cyan());
            println!("  Conflicting: {}", conflicts.len().to_string().cyan());
        }
        MergeOutcome::Refused { staged, modified } => {
            println!("{}", "Stash your changes".yellow().bold());
            print_refusal(&staged, &modified);
        }
    }
    Ok(())
}

fn print_refusal(staged: &[PathBuf], modified: &[PathBuf]) {
    for path in staged {
        println!("  {} {}", "staged:".yellow(), path.display());
    }
    for path in modified {
        println!("  {} {}", "modified:".yellow(), path.display());
    }
}
