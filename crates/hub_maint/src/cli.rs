use clap::{ArgAction, Parser, Subcommand};

use crate::doctor::{DoctorArgs, run_doctor};
use crate::error::Result;
use crate::icons::{IconArgs, run_icons};
use crate::preset::{list_preset_names, load_preset};
use crate::recolor::{CLASSES_PRESET, PURGE_PRESET, RecolorArgs, run_recolor};
use crate::seed::{SeedArgs, run_seed};
use crate::themes::{ThemeArgs, run_filter_themes};

#[derive(Debug, Parser)]
#[command(
    name = "hub_maint",
    about = "Maintenance toolkit for the hub web app's styling and content assets",
    version
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Swap pastel Tailwind color classes for gothic ones.
    #[command(name = "fix-colors")]
    FixColors(RecolorArgs),

    /// Class swaps plus hex-literal replacement of light colors.
    #[command(name = "purge-pastels")]
    PurgePastels(RecolorArgs),

    /// Generate a deterministic synthetic ideas dataset.
    #[command(name = "seed-ideas")]
    SeedIdeas(SeedArgs),

    /// Resize the logo into PWA, favicon, and Android icon sets.
    Icons(IconArgs),

    /// Darken pastel theme colors and drop disallowed themes.
    #[command(name = "filter-themes")]
    FilterThemes(ThemeArgs),

    /// Validate the inputs every command expects.
    Doctor(DoctorArgs),

    /// Print built-in substitution presets.
    #[command(name = "list-presets")]
    ListPresets,
}

pub fn print_presets() -> Result<()> {
    for name in list_preset_names() {
        let preset = load_preset(&name)?;
        println!(
            "{name}\t{} rules\t{}\t{}",
            preset.rule_count(),
            preset.extensions.join(","),
            preset.description
        );
    }
    Ok(())
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    crate::util::init_tracing(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::FixColors(args) => run_recolor("fix-colors", args, CLASSES_PRESET),
        Commands::PurgePastels(args) => run_recolor("purge-pastels", args, PURGE_PRESET),
        Commands::SeedIdeas(args) => run_seed(args),
        Commands::Icons(args) => run_icons(args),
        Commands::FilterThemes(args) => run_filter_themes(args),
        Commands::Doctor(args) => run_doctor(args),
        Commands::ListPresets => print_presets(),
    }
}
