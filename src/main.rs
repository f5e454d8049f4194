use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use wither_gen::{
    generate_unit, load_from_path, load_or_default, DeclReport, GeneratorConfig, RegionStatus,
    UnitOutcome, WorkspaceGuard,
};

#[derive(Parser)]
#[command(name = "wither-gen")]
#[command(about = "Generates copy-with-changes builders for marked Rust structs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate wither regions across a workspace
    Generate {
        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Config file to use instead of <workspace>/wither.toml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Specific source files (otherwise all .rs files are discovered)
        paths: Vec<PathBuf>,

        /// Dry run - report what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Verify that all wither regions are up to date (CI gate)
    Check {
        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// List eligible declarations and stale regions
    List {
        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            workspace,
            config,
            paths,
            dry_run,
            diff,
        } => cmd_generate(workspace, config, paths, dry_run, diff),

        Commands::Check { workspace, format } => cmd_check(workspace, format),

        Commands::List { workspace } => cmd_list(workspace),
    }
}

/// Resolve the workspace root.
///
/// Priority order:
/// 1. Explicit --workspace flag
/// 2. WITHER_WORKSPACE environment variable
/// 3. Nearest ancestor of the current directory holding a Cargo.toml
/// 4. Current directory
fn resolve_workspace(cli_workspace: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_workspace {
        return Ok(path.canonicalize()?);
    }

    if let Ok(env_path) = env::var("WITHER_WORKSPACE") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path.canonicalize()?);
        }
        eprintln!(
            "{}",
            format!("Warning: WITHER_WORKSPACE is set but does not exist: {env_path}").yellow()
        );
    }

    let current = env::current_dir()?;
    for ancestor in current.ancestors() {
        if ancestor.join("Cargo.toml").exists() {
            return Ok(ancestor.to_path_buf());
        }
    }

    Ok(current)
}

/// Discover all .rs files under the workspace, honoring config excludes
/// and skipping hidden directories.
fn discover_units(workspace: &Path, config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    let excluded = &config.discovery.exclude;

    let mut files = Vec::new();
    let walker = WalkDir::new(workspace).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        if entry.depth() == 0 {
            return true;
        }
        if name.starts_with('.') {
            return false;
        }
        if entry.file_type().is_dir() && excluded.iter().any(|d| d.as_str() == name.as_ref()) {
            return false;
        }
        true
    });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("rs")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn load_config(workspace: &Path, explicit: Option<PathBuf>) -> Result<GeneratorConfig> {
    let config = match explicit {
        Some(path) => load_from_path(path)?,
        None => load_or_default(workspace)?,
    };
    Ok(config)
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("\n{}", format!("--- {} (current)", file.display()).dimmed());
    println!(
        "{}",
        format!("+++ {} (regenerated)", file.display()).dimmed()
    );

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        print!("{sign}");
    }
}

fn print_decl_reports(reports: &[DeclReport], stale: &[String]) {
    for decl in reports {
        match decl {
            DeclReport::Generated { owner, region, .. } => {
                let status = match region {
                    RegionStatus::Inserted => "inserted".green(),
                    RegionStatus::Replaced => "regenerated".green(),
                    RegionStatus::Unchanged => "up to date".dimmed(),
                };
                println!("    {owner}: {status}");
            }
            DeclReport::Skipped { owner, reason } => {
                println!("    {owner}: {} ({reason})", "skipped".yellow());
            }
            DeclReport::Ignored { owner, note } => {
                println!("    {owner}: {} ({note})", "ignored".dimmed());
            }
        }
    }
    for owner in stale {
        println!("    {owner}: {}", "stale region (owner gone)".yellow());
    }
}

fn cmd_generate(
    workspace: Option<PathBuf>,
    config_path: Option<PathBuf>,
    paths: Vec<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let guard = WorkspaceGuard::new(&workspace)?;
    let config = load_config(&workspace, config_path)?;

    let units = if paths.is_empty() {
        discover_units(&workspace, &config)?
    } else {
        paths
    };

    println!("Workspace: {}", workspace.display());
    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }
    println!();

    let mut rewritten = 0;
    let mut unchanged = 0;
    let mut skipped_decls = 0;
    let mut failed = 0;

    for unit in units {
        let path = match guard.check(&unit) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), unit.display(), e);
                failed += 1;
                continue;
            }
        };

        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), path.display(), e);
                failed += 1;
                continue;
            }
        };

        match generate_unit(&source, &config) {
            Ok((UnitOutcome::Unchanged, report)) => {
                skipped_decls += report.skipped().count();
                if !report.decls.is_empty() || !report.stale_regions.is_empty() {
                    println!("{} {}", "⊙".dimmed(), path.display());
                    print_decl_reports(&report.decls, &report.stale_regions);
                }
                unchanged += 1;
            }
            Ok((UnitOutcome::Rewritten(text), report)) => {
                skipped_decls += report.skipped().count();
                println!("{} {}", "✓".green(), path.display());
                print_decl_reports(&report.decls, &report.stale_regions);

                if show_diff {
                    display_diff(&path, &source, &text);
                }
                if !dry_run {
                    wither_gen::atomic_write(&path, &text)?;
                }
                rewritten += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), path.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} rewritten", format!("{rewritten}").green());
    println!("  {} unchanged", format!("{unchanged}").dimmed());
    println!("  {} declarations skipped", format!("{skipped_decls}").yellow());
    println!("  {} failed", format!("{failed}").red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckEntry {
    file: PathBuf,
    status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stale_regions: Vec<String>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Clean,
    OutOfDate,
    Failed,
}

fn cmd_check(workspace: Option<PathBuf>, format: ReportFormat) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let config = load_or_default(&workspace)?;
    let units = discover_units(&workspace, &config)?;

    let mut entries = Vec::new();
    for unit in units {
        let relative = unit
            .strip_prefix(&workspace)
            .unwrap_or(&unit)
            .to_path_buf();
        let source = match fs::read_to_string(&unit) {
            Ok(source) => source,
            Err(e) => {
                entries.push(CheckEntry {
                    file: relative,
                    status: CheckStatus::Failed,
                    error: Some(e.to_string()),
                    stale_regions: Vec::new(),
                });
                continue;
            }
        };

        match generate_unit(&source, &config) {
            Ok((UnitOutcome::Unchanged, report)) => {
                // Only report units that contain generation at all.
                if !report.decls.is_empty() || !report.stale_regions.is_empty() {
                    entries.push(CheckEntry {
                        file: relative,
                        status: CheckStatus::Clean,
                        error: None,
                        stale_regions: report.stale_regions,
                    });
                }
            }
            Ok((UnitOutcome::Rewritten(_), report)) => {
                entries.push(CheckEntry {
                    file: relative,
                    status: CheckStatus::OutOfDate,
                    error: None,
                    stale_regions: report.stale_regions,
                });
            }
            Err(e) => {
                entries.push(CheckEntry {
                    file: relative,
                    status: CheckStatus::Failed,
                    error: Some(e.to_string()),
                    stale_regions: Vec::new(),
                });
            }
        }
    }

    let dirty = entries
        .iter()
        .filter(|e| e.status != CheckStatus::Clean)
        .count();

    match format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        ReportFormat::Text => {
            for entry in &entries {
                let (symbol, label) = match entry.status {
                    CheckStatus::Clean => ("✓".green(), "up to date".dimmed()),
                    CheckStatus::OutOfDate => ("✗".red(), "out of date".red()),
                    CheckStatus::Failed => ("✗".red(), "failed".red()),
                };
                println!("{} {}: {}", symbol, entry.file.display(), label);
                if let Some(error) = &entry.error {
                    println!("    {error}");
                }
                for owner in &entry.stale_regions {
                    println!("    stale region: {owner}");
                }
            }
            println!();
            if dirty == 0 {
                println!("{}", "All wither regions are up to date.".green());
            } else {
                println!(
                    "{}",
                    format!("{dirty} unit(s) need regeneration; run `wither-gen generate`.").red()
                );
            }
        }
    }

    if dirty > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_list(workspace: Option<PathBuf>) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let config = load_or_default(&workspace)?;
    let units = discover_units(&workspace, &config)?;

    let mut eligible = 0;
    for unit in units {
        let source = match fs::read_to_string(&unit) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), unit.display(), e);
                continue;
            }
        };

        let report = match generate_unit(&source, &config) {
            Ok((_, report)) => report,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), unit.display(), e);
                continue;
            }
        };

        if report.decls.is_empty() && report.stale_regions.is_empty() {
            continue;
        }

        let relative = unit.strip_prefix(&workspace).unwrap_or(&unit);
        println!("{}", format!("{}", relative.display()).bold());
        for decl in &report.decls {
            match decl {
                DeclReport::Generated {
                    owner,
                    setters,
                    excluded,
                    ..
                } => {
                    eligible += 1;
                    println!("  {} {owner}", "•".green());
                    println!("    setters: {}", setters.join(", "));
                    if !excluded.is_empty() {
                        println!("    excluded: {}", excluded.join(", "));
                    }
                }
                DeclReport::Skipped { owner, reason } => {
                    println!("  {} {owner} ({})", "•".yellow(), reason.dimmed());
                }
                DeclReport::Ignored { owner, note } => {
                    println!("  {} {owner} ({})", "•".dimmed(), note.dimmed());
                }
            }
        }
        for owner in &report.stale_regions {
            println!("  {} stale region: {owner}", "•".yellow());
        }
    }

    println!();
    println!("{eligible} eligible declaration(s)");
    Ok(())
}
