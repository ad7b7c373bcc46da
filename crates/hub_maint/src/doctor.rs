use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::error::{MaintError, Result};
use crate::preset::{list_preset_names, load_preset};
use crate::themes::{DEFAULT_THEME_FILES, THEMES_KEY};
use crate::util::{CliOutput, OutputIntegration, output_for};

#[derive(Debug, Clone, Args)]
pub struct DoctorArgs {
    #[arg(long, default_value = "src")]
    pub root: PathBuf,

    #[arg(long, default_value = "public/logo.png")]
    pub source: PathBuf,

    #[arg(long = "android-res", default_value = "android/app/src/main/res")]
    pub android_res: PathBuf,

    #[arg(long = "themes", default_values = DEFAULT_THEME_FILES)]
    pub theme_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }
}

fn check_root(root: &Path) -> Check {
    if root.is_dir() {
        Check::new("recolor-root", CheckStatus::Pass, root.display().to_string())
    } else if root.exists() {
        Check::new(
            "recolor-root",
            CheckStatus::Fail,
            format!("not a directory: {}", root.display()),
        )
    } else {
        Check::new(
            "recolor-root",
            CheckStatus::Warn,
            format!("missing, recolor will be skipped: {}", root.display()),
        )
    }
}

fn check_icon_source(source: &Path) -> Check {
    if !source.is_file() {
        return Check::new(
            "icon-source",
            CheckStatus::Warn,
            format!("missing, icons will be skipped: {}", source.display()),
        );
    }
    match image::image_dimensions(source) {
        Ok((width, height)) => Check::new(
            "icon-source",
            CheckStatus::Pass,
            format!("{} ({width}x{height})", source.display()),
        ),
        Err(error) => Check::new(
            "icon-source",
            CheckStatus::Fail,
            format!("{}: {error}", source.display()),
        ),
    }
}

fn check_android_res(dir: &Path) -> Check {
    if dir.is_dir() {
        Check::new("android-res", CheckStatus::Pass, dir.display().to_string())
    } else {
        Check::new(
            "android-res",
            CheckStatus::Warn,
            format!("missing, android icons will be skipped: {}", dir.display()),
        )
    }
}

fn check_theme_file(path: &Path) -> Check {
    let name = format!("themes:{}", path.display());
    if !path.is_file() {
        return Check::new(name, CheckStatus::Warn, "missing, will be skipped");
    }
    let parsed = fs::read_to_string(path)
        .map_err(MaintError::from)
        .and_then(|content| Ok(serde_json::from_str::<Value>(&content)?));
    match parsed {
        Ok(document) => match document.get(THEMES_KEY).and_then(Value::as_array) {
            Some(themes) => Check::new(name, CheckStatus::Pass, format!("{} themes", themes.len())),
            None => Check::new(name, CheckStatus::Warn, "no `themes` list"),
        },
        Err(error) => Check::new(name, CheckStatus::Fail, error.to_string()),
    }
}

fn check_presets() -> Vec<Check> {
    list_preset_names()
        .into_iter()
        .map(|name| match load_preset(&name) {
            Ok(preset) => Check::new(
                format!("preset:{name}"),
                CheckStatus::Pass,
                format!("{} rules", preset.rule_count()),
            ),
            Err(error) => Check::new(format!("preset:{name}"), CheckStatus::Fail, error.to_string()),
        })
        .collect()
}

#[must_use]
pub fn run_checks(args: &DoctorArgs) -> Vec<Check> {
    let mut checks = vec![
        check_root(&args.root),
        check_icon_source(&args.source),
        check_android_res(&args.android_res),
    ];
    checks.extend(args.theme_files.iter().map(|path| check_theme_file(path)));
    checks.extend(check_presets());
    checks
}

fn print_check(check: &Check, ui: &CliOutput) {
    let line = format!("{}: {}", check.name, check.detail);
    match check.status {
        CheckStatus::Pass => ui.success(&line),
        CheckStatus::Warn => ui.warning(&line),
        CheckStatus::Fail => ui.error(&line),
    }
}

pub fn run_doctor(args: DoctorArgs) -> Result<()> {
    let integration = OutputIntegration::detect();
    let ui = output_for(&integration);

    ui.rule(Some("hub_maint doctor"));
    ui.info(&format!(
        "sqlmodel_console mode={} agent={} fastapi_output mode={}",
        integration.sqlmodel_mode, integration.sqlmodel_agent, integration.fastapi_mode
    ));

    let checks = run_checks(&args);
    for check in &checks {
        print_check(check, &ui);
    }

    if integration.should_emit_json() {
        println!("{}", serde_json::json!({ "checks": checks }));
    }

    let failed = checks
        .iter()
        .filter(|check| check.status == CheckStatus::Fail)
        .count();
    if failed > 0 {
        return Err(MaintError::exit(1, format!("{failed} doctor checks failed")));
    }

    ui.success("all required inputs present");
    Ok(())
}
