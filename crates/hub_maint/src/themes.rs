use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::color::{DEFAULT_DARKEN_FACTOR, darken_hex, is_pastel_hex, parse_darken_factor};
use crate::error::Result;
use crate::summary::RunSummary;
use crate::util::{OutputIntegration, display_path, output_for, write_json_pretty};

pub const COLOR_FIELDS: [&str; 5] = ["primary", "secondary", "accent", "text", "background"];
pub const AESTHETIC_FIELD: &str = "aesthetic";
pub const THEMES_KEY: &str = "themes";

pub const BLOCKED_WORDS: [&str; 7] = [
    "pastel",
    "kawaii",
    "bubblegum",
    "cotton candy",
    "baby pink",
    "sorbet",
    "soft girl",
];

pub const DEFAULT_THEME_FILES: [&str; 3] = [
    "src/data/themes.json",
    "src/data/premade-themes.json",
    "public/themes.json",
];

#[derive(Debug, Clone, Args)]
pub struct ThemeArgs {
    /// Theme documents to rewrite in place.
    #[arg(default_values = DEFAULT_THEME_FILES)]
    pub files: Vec<PathBuf>,

    /// Channel multiplier for flagged colors, in [0, 1).
    #[arg(long, default_value_t = DEFAULT_DARKEN_FACTOR, value_parser = parse_darken_factor)]
    pub factor: f64,

    /// Extra aesthetic words that drop a theme.
    #[arg(long = "block-word")]
    pub block_words: Vec<String>,

    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ThemePlan {
    pub files: Vec<PathBuf>,
    pub factor: f64,
    pub blocked_words: Vec<String>,
    pub dry_run: bool,
}

impl From<ThemeArgs> for ThemePlan {
    fn from(args: ThemeArgs) -> Self {
        let mut blocked_words = BLOCKED_WORDS
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        blocked_words.extend(args.block_words.iter().map(|word| word.to_lowercase()));
        Self {
            files: args.files,
            factor: args.factor,
            blocked_words,
            dry_run: args.dry_run,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeCounts {
    pub kept: usize,
    pub removed: usize,
    pub darkened: usize,
}

impl ThemeCounts {
    fn add(&mut self, other: Self) {
        self.kept += other.kept;
        self.removed += other.removed;
        self.darkened += other.darkened;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeFileOutcome {
    Missing,
    NoThemeList,
    Processed(ThemeCounts),
    /// Reading or writing the file failed; the message is the I/O error.
    Failed(String),
}

/// Darken every flagged color field in place; returns how many changed.
pub fn darken_theme(theme: &mut Map<String, Value>, factor: f64) -> usize {
    let mut darkened = 0;
    for field in COLOR_FIELDS {
        let Some(Value::String(color)) = theme.get_mut(field) else {
            continue;
        };
        if !is_pastel_hex(color) {
            continue;
        }
        if let Some(replacement) = darken_hex(color, factor) {
            debug!(field, from = %color, to = %replacement, "darkened color");
            *color = replacement;
            darkened += 1;
        }
    }
    darkened
}

#[must_use]
pub fn is_blocked(theme: &Map<String, Value>, blocked_words: &[String]) -> bool {
    theme
        .get(AESTHETIC_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|aesthetic| {
            let aesthetic = aesthetic.to_lowercase();
            blocked_words
                .iter()
                .any(|word| aesthetic.contains(word.as_str()))
        })
}

/// Darken every record, then drop those whose aesthetic is blocked.
///
/// Darkening runs even for records that end up dropped, so `darkened`
/// counts fields across all input records.
#[must_use]
pub fn filter_themes(
    themes: Vec<Value>,
    factor: f64,
    blocked_words: &[String],
) -> (Vec<Value>, ThemeCounts) {
    let mut counts = ThemeCounts::default();
    let mut kept = Vec::with_capacity(themes.len());

    for mut theme in themes {
        let blocked = match theme.as_object_mut() {
            Some(record) => {
                counts.darkened += darken_theme(record, factor);
                is_blocked(record, blocked_words)
            }
            None => false,
        };
        if blocked {
            counts.removed += 1;
        } else {
            counts.kept += 1;
            kept.push(theme);
        }
    }

    (kept, counts)
}

/// Filter one theme document in place. Malformed JSON is an error; a missing
/// file, a document without a theme list, or an I/O failure is reported and
/// left alone.
pub fn process_theme_file(path: &Path, plan: &ThemePlan) -> Result<ThemeFileOutcome> {
    if !path.is_file() {
        warn!(path = %path.display(), "theme file not found; skipping");
        return Ok(ThemeFileOutcome::Missing);
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read theme file");
            return Ok(ThemeFileOutcome::Failed(error.to_string()));
        }
    };
    let mut document: Value = serde_json::from_str(&content)?;

    let Some(slot) = document.get_mut(THEMES_KEY) else {
        warn!(path = %path.display(), "no `themes` list in document; skipping");
        return Ok(ThemeFileOutcome::NoThemeList);
    };
    let Value::Array(themes) = slot.take() else {
        warn!(path = %path.display(), "`themes` is not a list; skipping");
        return Ok(ThemeFileOutcome::NoThemeList);
    };

    let (kept, counts) = filter_themes(themes, plan.factor, &plan.blocked_words);
    *slot = Value::Array(kept);

    if !plan.dry_run {
        if let Err(error) = write_json_pretty(path, &document) {
            warn!(path = %path.display(), %error, "failed to write theme file");
            return Ok(ThemeFileOutcome::Failed(error.to_string()));
        }
    }
    info!(
        path = %path.display(),
        kept = counts.kept,
        removed = counts.removed,
        darkened = counts.darkened,
        dry_run = plan.dry_run,
        "filtered themes"
    );
    Ok(ThemeFileOutcome::Processed(counts))
}

pub fn run_filter_themes(args: ThemeArgs) -> Result<()> {
    let integration = OutputIntegration::detect();
    let ui = output_for(&integration);
    let summary_path = args.summary.clone();
    let plan = ThemePlan::from(args);

    ui.rule(Some("hub_maint filter-themes"));
    ui.info(&format!(
        "files={} factor={} blocked_words={}",
        plan.files.len(),
        plan.factor,
        plan.blocked_words.len()
    ));
    if plan.dry_run {
        ui.warning("dry run: no files will be written");
    }

    let mut summary = RunSummary::new("filter-themes");
    let mut totals = ThemeCounts::default();
    let mut processed = 0_u64;

    for path in &plan.files {
        match process_theme_file(path, &plan)? {
            ThemeFileOutcome::Missing => {
                ui.warning(&format!("not found: {}", path.display()));
                summary.count("files_missing", 1);
            }
            ThemeFileOutcome::NoThemeList => {
                ui.warning(&format!("no themes list: {}", path.display()));
                summary.count("files_without_themes", 1);
            }
            ThemeFileOutcome::Processed(counts) => {
                ui.info(&format!(
                    "{}: kept {}, removed {}, darkened {}",
                    path.display(),
                    counts.kept,
                    counts.removed,
                    counts.darkened
                ));
                processed += 1;
                totals.add(counts);
            }
            ThemeFileOutcome::Failed(error) => {
                let shown = display_path(Path::new("."), path);
                ui.error(&format!("{shown}: {error}"));
                summary.fail(shown, error);
            }
        }
    }

    if processed == 0 && summary.failures.is_empty() {
        summary.mark_skipped();
    }
    let failed = summary.failures.len() as u64;
    summary.count("files_processed", processed);
    summary.count("files_failed", failed);
    summary.count("kept", totals.kept as u64);
    summary.count("removed", totals.removed as u64);
    summary.count("darkened", totals.darkened as u64);

    ui.success(&format!(
        "{processed} files: kept {}, removed {}, darkened {}",
        totals.kept, totals.removed, totals.darkened
    ));

    summary.emit(summary_path.as_deref(), &integration)?;
    Ok(())
}
