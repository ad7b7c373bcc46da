use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use regex_lite::NoExpand;
use tracing::{debug, info, warn};

use crate::error::{MaintError, Result};
use crate::preset::{Preset, load_preset, load_preset_file};
use crate::summary::RunSummary;
use crate::util::{OutputIntegration, display_path, has_extension, output_for, relative_to};

pub const CLASSES_PRESET: &str = "gothic-classes";
pub const PURGE_PRESET: &str = "pastel-purge";

const DEFAULT_SKIP_DIRS: [&str; 2] = [".git", "node_modules"];

#[derive(Debug, Clone, Args)]
pub struct RecolorArgs {
    /// Directory tree to rewrite in place.
    #[arg(long, default_value = "src")]
    pub root: PathBuf,

    /// Built-in substitution preset (see `list-presets`).
    #[arg(long)]
    pub preset: Option<String>,

    /// Substitution table file; replaces the preset.
    #[arg(long = "map-file", conflicts_with = "preset")]
    pub map_file: Option<PathBuf>,

    /// File extensions to touch; defaults to the preset's list.
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Directory names never descended into.
    #[arg(long = "skip-dir", value_delimiter = ',')]
    pub skip_dirs: Vec<String>,

    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RecolorPlan {
    pub root: PathBuf,
    pub preset: Preset,
    pub extensions: Vec<String>,
    pub skip_dirs: Vec<String>,
    pub dry_run: bool,
}

impl RecolorPlan {
    pub fn from_args(args: &RecolorArgs, default_preset: &str) -> Result<Self> {
        let preset = match &args.map_file {
            Some(path) => load_preset_file(path)?,
            None => load_preset(args.preset.as_deref().unwrap_or(default_preset))?,
        };
        let extensions = if args.extensions.is_empty() {
            preset.extensions.clone()
        } else {
            args.extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .collect::<Vec<_>>()
        };
        if extensions.iter().any(String::is_empty) {
            return Err(MaintError::invalid("--ext contains an empty extension"));
        }
        let skip_dirs = if args.skip_dirs.is_empty() {
            DEFAULT_SKIP_DIRS.iter().map(ToString::to_string).collect()
        } else {
            args.skip_dirs.clone()
        };

        Ok(Self {
            root: args.root.clone(),
            preset,
            extensions,
            skip_dirs,
            dry_run: args.dry_run,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub replacements: usize,
}

impl Rewrite {
    #[must_use]
    pub fn changed(&self, original: &str) -> bool {
        self.content != original
    }
}

/// Apply every literal rule in order, then every pattern rule in order.
///
/// Literal rules are plain substring replacement: a target embedded in an
/// unrelated token is replaced too.
#[must_use]
pub fn apply_preset(content: &str, preset: &Preset) -> Rewrite {
    let mut text = content.to_string();
    let mut replacements = 0usize;

    for rule in &preset.literals {
        let hits = text.matches(rule.from.as_str()).count();
        if hits > 0 {
            text = text.replace(rule.from.as_str(), &rule.to);
            replacements += hits;
        }
    }

    for rule in &preset.patterns {
        let hits = rule.regex.find_iter(&text).count();
        if hits > 0 {
            text = rule
                .regex
                .replace_all(&text, NoExpand(&rule.to))
                .into_owned();
            replacements += hits;
        }
    }

    Rewrite {
        content: text,
        replacements,
    }
}

/// Regular files under `root` with an allowed extension, sorted. Symlinks to
/// files are included; symlinked directories are not descended into.
pub fn collect_source_files(
    root: &Path,
    extensions: &[String],
    skip_dirs: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) if dir == root => return Err(error.into()),
            Err(error) => {
                warn!(dir = %dir.display(), %error, "unable to enumerate directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                let skipped = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| skip_dirs.iter().any(|skip| skip == name));
                if !skipped {
                    stack.push(path);
                }
            } else if path.is_file() && has_extension(&path, extensions) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Default)]
pub struct RecolorReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub replacements: usize,
    pub changed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
    pub root_missing: bool,
}

fn recolor_file(path: &Path, preset: &Preset, dry_run: bool) -> std::io::Result<Option<usize>> {
    let original = fs::read_to_string(path)?;
    let rewrite = apply_preset(&original, preset);
    if !rewrite.changed(&original) {
        return Ok(None);
    }
    if !dry_run {
        fs::write(path, &rewrite.content)?;
    }
    Ok(Some(rewrite.replacements))
}

/// Walk the tree and rewrite each matching file in place. Per-file failures
/// are logged and collected; they never stop the walk.
pub fn recolor_tree(plan: &RecolorPlan) -> Result<RecolorReport> {
    let mut report = RecolorReport::default();
    if !plan.root.is_dir() {
        warn!(root = %plan.root.display(), "recolor root does not exist; skipping");
        report.root_missing = true;
        return Ok(report);
    }

    let files = collect_source_files(&plan.root, &plan.extensions, &plan.skip_dirs)?;
    for path in files {
        report.files_scanned += 1;
        match recolor_file(&path, &plan.preset, plan.dry_run) {
            Ok(Some(replacements)) => {
                info!(
                    path = %path.display(),
                    replacements,
                    dry_run = plan.dry_run,
                    "recolored"
                );
                report.files_changed += 1;
                report.replacements += replacements;
                report
                    .changed
                    .push(relative_to(&plan.root, &path).unwrap_or(path));
            }
            Ok(None) => debug!(path = %path.display(), "unchanged"),
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to recolor file");
                report.failures.push((path, error.to_string()));
            }
        }
    }

    Ok(report)
}

pub fn run_recolor(command: &str, args: RecolorArgs, default_preset: &str) -> Result<()> {
    let integration = OutputIntegration::detect();
    let ui = output_for(&integration);
    let plan = RecolorPlan::from_args(&args, default_preset)?;

    ui.rule(Some(format!("hub_maint {command}").as_str()));
    ui.info(&format!(
        "root={} preset={} rules={} extensions={}",
        plan.root.display(),
        plan.preset.name,
        plan.preset.rule_count(),
        plan.extensions.join(",")
    ));
    if plan.dry_run {
        ui.warning("dry run: no files will be written");
    }

    let report = recolor_tree(&plan)?;
    let mut summary = RunSummary::new(command);
    summary.note(format!("preset={}", plan.preset.name));

    if report.root_missing {
        ui.warning(&format!("root not found: {}", plan.root.display()));
        summary.mark_skipped();
    }

    for path in &report.changed {
        ui.info(&format!("updated {}", path.display()));
    }
    for (path, error) in &report.failures {
        let shown = display_path(&plan.root, path);
        ui.error(&format!("{shown}: {error}"));
        summary.fail(shown, error);
    }

    summary.count("files_scanned", report.files_scanned as u64);
    summary.count("files_changed", report.files_changed as u64);
    summary.count("replacements", report.replacements as u64);
    summary.count("files_failed", report.failures.len() as u64);

    ui.success(&format!(
        "{} of {} files updated ({} replacements, {} failed)",
        report.files_changed,
        report.files_scanned,
        report.replacements,
        report.failures.len()
    ));

    summary.emit(args.summary.as_deref(), &integration)?;
    Ok(())
}
