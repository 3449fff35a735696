//! Streaming in-place rewrite with a sibling `.bk` backup.
//!
//! The edit follows the classic rename-then-rewrite scheme: the target is
//! renamed to its backup path, the backup is read back line by line, and
//! each line, replaced or not, is written to a fresh file at the original
//! path. There is no atomicity and no rollback; after a mid-write failure
//! the backup still holds the complete pre-edit content.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use owo_colors::OwoColorize;
use tracing::{debug, instrument, trace};

use crate::core::plan::{RewritePlan, RewriteRule};
use crate::core::prompt;

/// The one file this tool edits, resolved against the working directory.
pub const TARGET_FILE: &str = "angCorr.C";

/// Appended to the target name to form the backup path.
pub const BACKUP_SUFFIX: &str = ".bk";

/// Domain-specific error taxonomy for exit-code mapping
#[derive(thiserror::Error, Debug, Clone)]
pub enum PrepCliError {
    /// Target macro is not in the working directory
    #[error("target file not found: {}", .0.display())]
    TargetMissing(PathBuf),

    /// Stdin closed before an answer line was read
    #[error("prompt input ended before an answer was read")]
    PromptClosed,
}

/// Converts errors to process exit codes
/// 0=success, 2=missing target, 3=prompt, 4=i/o, 1=untyped
pub fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<PrepCliError>() {
        Some(PrepCliError::TargetMissing(_)) => 2,
        Some(PrepCliError::PromptClosed) => 3,
        None => {
            // Rename, read, and write failures keep their io::Error root.
            if e.root_cause().downcast_ref::<io::Error>().is_some() {
                4
            } else {
                1
            }
        }
    }
}

/// Print the error chain to stderr and exit with its mapped code.
pub fn finish_with_exit(result: Result<()>) -> ! {
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Per-run rule state: the table plus one fired flag per rule, so
/// one-shot rules stop matching after their first hit. Reset by building
/// a fresh pass for every run.
pub struct RewritePass<'a> {
    rules: &'a [RewriteRule],
    fired: Vec<bool>,
    replaced: usize,
}

impl<'a> RewritePass<'a> {
    pub fn new(plan: &'a RewritePlan) -> Self {
        Self {
            rules: &plan.rules,
            fired: vec![false; plan.rules.len()],
            replaced: 0,
        }
    }

    /// Number of lines replaced so far.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    /// Run every rule in order against `line`, swapping in the
    /// replacement on each hit. Later rules see the already-replaced
    /// buffer, not the original text.
    pub fn apply(&mut self, line: &mut String) -> bool {
        let mut hit = false;
        for (idx, rule) in self.rules.iter().enumerate() {
            if rule.one_shot && self.fired[idx] {
                continue;
            }
            if !rule.matches(line) {
                continue;
            }
            line.clear();
            line.push_str(&rule.replacement);
            self.fired[idx] = true;
            hit = true;
        }
        if hit {
            self.replaced += 1;
        }
        hit
    }
}

/// Pure rewrite over in-memory text: the whole per-line pass without
/// touching the filesystem. Lines keep their original terminators unless
/// replaced; replacement lines bring their own.
pub fn rewrite_content(plan: &RewritePlan, input: &str) -> String {
    let mut pass = RewritePass::new(plan);
    let mut out = String::with_capacity(input.len());
    let mut line = String::new();
    for chunk in input.split_inclusive('\n') {
        line.clear();
        line.push_str(chunk);
        pass.apply(&mut line);
        out.push_str(&line);
    }
    out
}

/// Report of one completed in-place rewrite.
#[derive(Debug)]
pub struct RewriteReport {
    pub lines_replaced: usize,
    pub backup_path: PathBuf,
}

/// Rewrite `target` in place, keeping the pre-edit file at the backup
/// path. A failure mid-write leaves the partial target as-is.
#[instrument(skip(plan))]
pub fn rewrite_in_place(plan: &RewritePlan, target: &Path) -> Result<RewriteReport> {
    let backup_path = backup_path_for(target)?;

    // The missing-target check runs before the stale backup is touched,
    // so a failed run never disturbs an older backup.
    if let Err(e) = fs::metadata(target) {
        if e.kind() == io::ErrorKind::NotFound {
            return Err(PrepCliError::TargetMissing(target.to_path_buf()).into());
        }
        return Err(e).with_context(|| format!("inspecting {}", target.display()));
    }

    match fs::remove_file(&backup_path) {
        Ok(()) => debug!(backup = %backup_path.display(), "replaced stale backup"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("removing stale backup {}", backup_path.display()));
        }
    }

    fs::rename(target, &backup_path).with_context(|| {
        format!(
            "renaming {} to {}",
            target.display(),
            backup_path.display()
        )
    })?;

    let reader = File::open(&backup_path)
        .with_context(|| format!("opening backup {}", backup_path.display()))?;
    let writer =
        File::create(target).with_context(|| format!("creating {}", target.display()))?;

    let mut pass = RewritePass::new(plan);
    let mut input = BufReader::new(reader);
    let mut output = BufWriter::new(writer);
    pump(&mut pass, &mut input, &mut output)
        .with_context(|| format!("rewriting {}", target.display()))?;
    output
        .flush()
        .with_context(|| format!("flushing {}", target.display()))?;

    // The fresh file keeps the original's permissions.
    let perms = fs::metadata(&backup_path)
        .with_context(|| format!("reading permissions of {}", backup_path.display()))?
        .permissions();
    fs::set_permissions(target, perms)
        .with_context(|| format!("setting permissions on {}", target.display()))?;

    let report = RewriteReport {
        lines_replaced: pass.replaced(),
        backup_path,
    };
    debug!(lines_replaced = report.lines_replaced, "rewrite complete");
    Ok(report)
}

/// Interactive entry point: collect answers, build the plan, rewrite the
/// macro in the working directory.
pub fn run() -> Result<()> {
    let answers = prompt::collect()?;
    debug!(
        radius = %answers.beam_radius,
        excluded = answers.excluded_indices.len(),
        fit = answers.fit_enabled,
        "answers collected"
    );

    let plan = RewritePlan::from_answers(&answers);
    let report = rewrite_in_place(&plan, Path::new(TARGET_FILE))?;

    println!(
        "{} Rewrote {} ({} lines replaced, backup at {})",
        "✓".green(),
        TARGET_FILE,
        report.lines_replaced,
        report.backup_path.display()
    );
    Ok(())
}

/// Stream `input` through the pass one line at a time, terminators
/// preserved, writing each line to `output`.
fn pump(
    pass: &mut RewritePass<'_>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<()> {
    let mut line = String::new();
    let mut line_no = 0usize;
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        line_no += 1;
        if pass.apply(&mut line) {
            trace!(line_no, "line replaced");
        }
        output.write_all(line.as_bytes())?;
    }
}

/// Sibling backup path: the target name with the suffix appended.
fn backup_path_for(target: &Path) -> Result<PathBuf> {
    let mut name = target
        .file_name()
        .ok_or_else(|| anyhow!("invalid target path: {}", target.display()))?
        .to_os_string();
    name.push(BACKUP_SUFFIX);
    Ok(target.with_file_name(name))
}
