//! ternlint - collapses Java if/else statements into conditional expressions.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use ternlint_config::{ConfigLoader, MergedConfig};
use ternlint_diagnostics::{Applicability, Edit};
use ternlint_linter::{LintResult, PlainTextCommentFilterConfig, Rule, RuleRegistry, lint_source};
use ternlint_source_file::{LineIndex, SourceCode};
use ternlint_text_size::Ranged;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "ternlint")]
#[command(about = "Collapse if/else statements into conditional expressions", long_about = None)]
struct Cli {
    /// Raise the log level (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check files for violations
    Check {
        /// Paths to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to ternlint.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Fix violations in files
    Fix {
        /// Paths to fix
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to ternlint.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show diff without applying fixes
        #[arg(long)]
        diff: bool,

        /// Apply unsafe fixes
        #[arg(long)]
        r#unsafe: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { paths, config } => run_check(&paths, config.as_deref()),
        Commands::Fix {
            paths,
            config,
            diff,
            r#unsafe: allow_unsafe,
        } => run_fix(&paths, config.as_deref(), diff, allow_unsafe),
    }
}

/// Log to stderr. `TERNLINT_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env("TERNLINT_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Rules and settings shared by both subcommands.
struct Session {
    rules: Vec<Box<dyn Rule>>,
    config: MergedConfig,
    filters: Vec<PlainTextCommentFilterConfig>,
}

/// Outcome of linting one file.
struct FileReport {
    path: PathBuf,
    source: String,
    result: LintResult,
}

/// Run the check command.
fn run_check(paths: &[PathBuf], config_path: Option<&Path>) -> Result<()> {
    let session = load_session(config_path)?;
    if session.rules.is_empty() {
        eprintln!("{}", "Warning: No rules configured".yellow());
        return Ok(());
    }
    announce("Checking", &session);

    let mut total_violations = 0;
    let mut total_fixable = 0;

    for report in lint_files(paths, &session)? {
        let index = LineIndex::from_source_text(&report.source);
        let source_code = SourceCode::new(&report.source, &index);

        for finding in &report.result.diagnostics {
            total_violations += 1;
            if finding.diagnostic.fixable() {
                total_fixable += 1;
            }

            let loc = source_code.line_column(finding.diagnostic.start());
            println!(
                "{}:{}:{}: {} {}",
                report.path.display(),
                loc.line.get(),
                loc.column.get(),
                format!("[{}]", finding.rule).blue(),
                finding.diagnostic.kind.body
            );
        }
    }

    if total_violations > 0 {
        println!(
            "\nFound {} violations ({} fixable)",
            total_violations.to_string().red(),
            total_fixable.to_string().yellow()
        );
        std::process::exit(1);
    }

    println!("{}", "No violations found".green());
    Ok(())
}

/// Run the fix command.
fn run_fix(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    diff_only: bool,
    allow_unsafe: bool,
) -> Result<()> {
    let session = load_session(config_path)?;
    if session.rules.is_empty() {
        eprintln!("{}", "Warning: No rules configured".yellow());
        return Ok(());
    }
    announce("Fixing", &session);

    let applicability = if allow_unsafe || session.config.unsafe_fixes {
        Applicability::Unsafe
    } else {
        Applicability::Safe
    };
    let fixing: HashSet<&str> = session
        .config
        .enabled_rules()
        .filter(|rule| rule.should_fix())
        .map(|rule| rule.name.as_str())
        .collect();

    let mut total_fixed = 0;
    let mut total_unfixable = 0;
    let mut files_changed = 0;

    for report in lint_files(paths, &session)? {
        let (fixed, unfixable, changed) = fix_file(&report, &fixing, applicability, diff_only)?;
        total_fixed += fixed;
        total_unfixable += unfixable;
        if changed {
            files_changed += 1;
        }
    }

    if diff_only {
        println!(
            "\n{} fix(es) available in {} file(s)",
            total_fixed.to_string().green(),
            files_changed
        );
    } else if total_fixed > 0 {
        println!(
            "\n{} fix(es) applied in {} file(s)",
            total_fixed.to_string().green(),
            files_changed
        );
    } else {
        println!("{}", "No fixes to apply".green());
    }

    if total_unfixable > 0 {
        eprintln!(
            "{} violation(s) could not be fixed automatically",
            total_unfixable.to_string().yellow()
        );
    }

    Ok(())
}

fn announce(verb: &str, session: &Session) {
    let names: Vec<_> = session.rules.iter().map(|rule| rule.name()).collect();
    eprintln!("{verb} with {} rule(s): {}", names.len(), names.join(", "));
}

/// Fix violations in a single file.
///
/// Returns the number of fixes applied, the number of findings left alone
/// and whether the file changed.
fn fix_file(
    report: &FileReport,
    fixing: &HashSet<&str>,
    applicability: Applicability,
    diff_only: bool,
) -> Result<(usize, usize, bool)> {
    let mut edits: Vec<Edit> = Vec::new();
    let mut fixed = 0;
    let mut unfixable = 0;

    for finding in &report.result.diagnostics {
        match &finding.diagnostic.fix {
            Some(fix) if fixing.contains(finding.rule) && fix.applies(applicability) => {
                edits.extend(fix.edits().iter().cloned());
                fixed += 1;
            }
            _ => unfixable += 1,
        }
    }

    if edits.is_empty() {
        return Ok((0, unfixable, false));
    }

    // Apply from the end of the file backwards.
    edits.sort_by_key(|edit| std::cmp::Reverse(edit.start()));
    let kept = remove_overlapping_edits(edits);
    let dropped = fixed - kept.len().min(fixed);
    let fixed_source = apply_edits(&report.source, &kept);

    if diff_only {
        print!("{}", render_diff(&report.path, &report.source, &fixed_source));
    } else {
        std::fs::write(&report.path, &fixed_source)
            .with_context(|| format!("Failed to write {}", report.path.display()))?;
        eprintln!(
            "{}: {} fix(es) applied",
            report.path.display(),
            fixed - dropped
        );
    }

    Ok((fixed - dropped, unfixable + dropped, true))
}

/// Drop edits overlapping one already kept. Input is sorted by descending
/// start, so the edit nearest the end of the file wins.
fn remove_overlapping_edits(edits: Vec<Edit>) -> Vec<Edit> {
    let mut result: Vec<Edit> = Vec::new();

    for edit in edits {
        let overlaps = result
            .iter()
            .any(|existing| edit.end() > existing.start());
        if overlaps {
            tracing::debug!(range = ?edit.range(), "skipping overlapping edit");
        } else {
            result.push(edit);
        }
    }

    result
}

/// Apply edits sorted by descending start.
fn apply_edits(source: &str, edits: &[Edit]) -> String {
    let mut result = source.to_string();
    for edit in edits {
        result.replace_range(
            edit.start().to_usize()..edit.end().to_usize(),
            edit.content().unwrap_or(""),
        );
    }
    result
}

/// Line diff between `original` and `fixed`, grouped into hunks.
fn render_diff(path: &Path, original: &str, fixed: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "--- a/{}", path.display());
    let _ = writeln!(output, "+++ b/{}", path.display());

    let original_lines: Vec<&str> = original.lines().collect();
    let fixed_lines: Vec<&str> = fixed.lines().collect();

    // Changed lines are realigned on the common suffix.
    let suffix = original_lines
        .iter()
        .rev()
        .zip(fixed_lines.iter().rev())
        .take_while(|(o, f)| o == f)
        .count();
    let original_end = original_lines.len() - suffix;
    let fixed_end = fixed_lines.len() - suffix;

    let mut hunk = Hunk::default();
    let (mut i, mut j) = (0, 0);

    while i < original_end || j < fixed_end {
        match (original_lines.get(i), fixed_lines.get(j)) {
            (Some(o), Some(f)) if o == f && i < original_end && j < fixed_end => {
                if hunk.is_open() {
                    hunk.push(Marker::Context, *o);
                }
                i += 1;
                j += 1;
            }
            _ => {
                hunk.open(i, j);
                if i < original_end {
                    hunk.push(Marker::Removed, original_lines[i]);
                    i += 1;
                }
                if j < fixed_end {
                    hunk.push(Marker::Added, fixed_lines[j]);
                    j += 1;
                }
            }
        }

        if hunk.trailing_context() >= 3 {
            hunk.flush(&mut output);
        }
    }

    if hunk.is_open() {
        for line in original_lines.iter().skip(original_end).take(3) {
            hunk.push(Marker::Context, *line);
        }
    }
    hunk.flush(&mut output);
    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Context,
    Removed,
    Added,
}

#[derive(Default)]
struct Hunk<'a> {
    start_original: usize,
    start_fixed: usize,
    lines: Vec<(Marker, &'a str)>,
}

impl<'a> Hunk<'a> {
    fn is_open(&self) -> bool {
        !self.lines.is_empty()
    }

    fn open(&mut self, i: usize, j: usize) {
        if !self.is_open() {
            self.start_original = i + 1;
            self.start_fixed = j + 1;
        }
    }

    fn push(&mut self, marker: Marker, line: &'a str) {
        self.lines.push((marker, line));
    }

    fn count(&self, marker: Marker) -> usize {
        self.lines.iter().filter(|(m, _)| *m == marker).count()
    }

    fn trailing_context(&self) -> usize {
        self.lines
            .iter()
            .rev()
            .take_while(|(marker, _)| *marker == Marker::Context)
            .count()
    }

    fn flush(&mut self, output: &mut String) {
        if !self.is_open() {
            return;
        }
        let context = self.count(Marker::Context);
        let _ = writeln!(
            output,
            "@@ -{},{} +{},{} @@",
            self.start_original,
            context + self.count(Marker::Removed),
            self.start_fixed,
            context + self.count(Marker::Added)
        );
        for (marker, line) in self.lines.drain(..) {
            let _ = match marker {
                Marker::Context => writeln!(output, " {line}"),
                Marker::Removed => writeln!(output, "{}{line}", "-".red()),
                Marker::Added => writeln!(output, "{}{line}", "+".green()),
            };
        }
    }
}

/// Load configuration and build the configured rules.
fn load_session(config_path: Option<&Path>) -> Result<Session> {
    let registry = RuleRegistry::builtin();

    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.config(path);
    }
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let config = loader
        .find_in(cwd)
        .load(&registry.module_names())
        .context("Failed to load configuration")?;

    match &config.source {
        Some(path) => tracing::info!(path = %path.display(), "using configuration"),
        None => tracing::info!("no ternlint.toml found, using defaults"),
    }

    Ok(Session {
        rules: registry.rules_from_config(&config),
        config,
        filters: vec![PlainTextCommentFilterConfig::ternlint_default()],
    })
}

/// Read and lint every Java file under `paths`, in parallel. Reports come
/// back in path order.
fn lint_files(paths: &[PathBuf], session: &Session) -> Result<Vec<FileReport>> {
    collect_java_files(paths)
        .into_par_iter()
        .filter_map(|path| lint_file(path, session).transpose())
        .collect()
}

fn lint_file(path: PathBuf, session: &Session) -> Result<Option<FileReport>> {
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let Some(result) = lint_source(&source, &session.rules, &session.filters) else {
        eprintln!("{}: Failed to parse", path.display());
        return Ok(None);
    };
    if result.had_parse_errors {
        tracing::warn!(path = %path.display(), "file has syntax errors, affected code was skipped");
    }
    tracing::info!(
        path = %path.display(),
        findings = result.diagnostics.len(),
        "checked file"
    );

    Ok(Some(FileReport {
        path,
        source,
        result,
    }))
}

fn collect_java_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() && path.extension().is_some_and(|e| e == "java") {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "java"))
                    .map(walkdir::DirEntry::into_path),
            );
        }
    }
    files
}
