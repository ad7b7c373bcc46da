use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::summary::RunSummary;
use crate::util::{OutputIntegration, output_for, to_pretty_json, utc_iso, write_string};

pub const DEFAULT_BASE_TIME: &str = "2025-01-01T00:00:00Z";

/// A fixed idea category and the acceptance criterion only it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub slug: &'static str,
    pub audience: &'static str,
    pub criterion: &'static str,
}

pub const CATEGORIES: [Category; 9] = [
    Category {
        slug: "health",
        audience: "chronic symptoms",
        criterion: "Symptom entries can be exported as a summary for doctor visits",
    },
    Category {
        slug: "mental-health",
        audience: "my mental health",
        criterion: "Crisis resources are reachable in one tap from every screen",
    },
    Category {
        slug: "finance",
        audience: "a tight budget",
        criterion: "Amounts are stored to the cent with no rounding drift",
    },
    Category {
        slug: "food",
        audience: "dietary restrictions",
        criterion: "Meals can be logged with allergen and sodium warnings",
    },
    Category {
        slug: "home",
        audience: "household chores",
        criterion: "Tasks can be postponed without breaking streaks",
    },
    Category {
        slug: "relationships",
        audience: "caregiving and relationships",
        criterion: "Shared entries respect per-person privacy settings",
    },
    Category {
        slug: "creative",
        audience: "creative projects",
        criterion: "Drafts autosave at least every 30 seconds",
    },
    Category {
        slug: "learning",
        audience: "self-paced learning",
        criterion: "Progress resumes from the last completed lesson",
    },
    Category {
        slug: "accessibility",
        audience: "disability access needs",
        criterion: "Every control is reachable by keyboard and screen reader",
    },
];

const VERBS: [&str; 10] = [
    "Track",
    "Log",
    "Visualize",
    "Schedule",
    "Automate",
    "Summarize",
    "Remind me about",
    "Forecast",
    "Journal",
    "Budget",
];

const FEATURES: [&str; 12] = [
    "medication doses",
    "flare-ups",
    "energy levels",
    "meal plans",
    "water intake",
    "appointments",
    "sleep quality",
    "mood shifts",
    "chores",
    "savings goals",
    "care tasks",
    "reading list",
];

const DIMENSIONS: [&str; 8] = [
    "by time of day",
    "by weather",
    "by weekly trend",
    "by spoon budget",
    "by location",
    "by body area",
    "by season",
    "by cycle phase",
];

const TRIGGERS: [&str; 8] = [
    "after a bad night",
    "when a flare starts",
    "before appointments",
    "on low-spoon days",
    "at the start of each week",
    "when symptoms spike",
    "after meals",
    "when the weather changes",
];

const INTEGRATIONS: [&str; 8] = [
    "Apple Health",
    "Google Fit",
    "Google Calendar",
    "Notion",
    "Todoist",
    "Spotify",
    "Discord",
    "a local CSV export",
];

const ENERGIES: [&str; 3] = ["low", "medium", "high"];
const SPOON_COSTS: [u8; 5] = [1, 2, 3, 4, 5];
const PRIORITIES: [&str; 4] = ["low", "medium", "high", "critical"];
const STATUSES: [&str; 5] = ["idea", "backlog", "planned", "in-progress", "shipped"];

const TAGS: [&str; 10] = [
    "gothic",
    "offline-first",
    "ai-assist",
    "privacy",
    "quick-win",
    "chronic-illness",
    "automation",
    "dashboard",
    "voice",
    "wearables",
];

const COMMON_CRITERIA: [&str; 4] = [
    "Works offline and syncs when the connection returns",
    "Usable with a screen reader and keyboard only",
    "Respects low-energy mode with reduced motion",
    "Data stays on device unless explicitly exported",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaRecord {
    pub id: u64,
    pub category: String,
    pub title: String,
    pub description: String,
    pub user_story: String,
    pub acceptance_criteria: Vec<String>,
    pub energy: String,
    pub spoon_cost: u8,
    pub priority: String,
    pub status: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

fn parse_base_time(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| format!("invalid RFC 3339 timestamp {raw}: {error}"))
}

#[derive(Debug, Clone, Args)]
pub struct SeedArgs {
    #[arg(long, default_value = "ideas-seed.json")]
    pub output: PathBuf,

    #[arg(long = "per-category", default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..))]
    pub per_category: u32,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Timestamp of the newest record in each category.
    #[arg(long = "base-time", default_value = DEFAULT_BASE_TIME, value_parser = parse_base_time)]
    pub base_time: DateTime<Utc>,

    /// Use the current time as the base timestamp (output is then not reproducible).
    #[arg(long)]
    pub now: bool,

    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub output: PathBuf,
    pub per_category: u32,
    pub seed: u64,
    pub base_time: DateTime<Utc>,
}

impl From<SeedArgs> for SeedPlan {
    fn from(args: SeedArgs) -> Self {
        Self {
            output: args.output,
            per_category: args.per_category,
            seed: args.seed,
            base_time: if args.now { Utc::now() } else { args.base_time },
        }
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn build_record<R: Rng + ?Sized>(
    rng: &mut R,
    id: u64,
    category: &Category,
    created_at: DateTime<Utc>,
) -> IdeaRecord {
    let verb = pick(rng, &VERBS);
    let feature = pick(rng, &FEATURES);
    let dimension = pick(rng, &DIMENSIONS);
    let trigger = pick(rng, &TRIGGERS);
    let integration = pick(rng, &INTEGRATIONS);

    let mut acceptance_criteria = COMMON_CRITERIA
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    acceptance_criteria.push(category.criterion.to_string());

    let mut tags = vec![category.slug.to_string()];
    tags.extend(TAGS.choose_multiple(rng, 2).map(ToString::to_string));

    IdeaRecord {
        id,
        category: category.slug.to_string(),
        title: format!("{verb} {feature} {dimension}"),
        description: format!(
            "{verb} {feature} {dimension}, surfaced {trigger} and synced with {integration}."
        ),
        user_story: format!(
            "As someone managing {}, I want to {} {feature} {trigger} so that I can plan around my energy.",
            category.audience,
            verb.to_lowercase()
        ),
        acceptance_criteria,
        energy: pick(rng, &ENERGIES).to_string(),
        spoon_cost: SPOON_COSTS.choose(rng).copied().unwrap_or(1),
        priority: pick(rng, &PRIORITIES).to_string(),
        status: pick(rng, &STATUSES).to_string(),
        tags,
        created_at: utc_iso(created_at),
    }
}

/// Generate `per_category` records for every category, in category order.
///
/// All randomness comes from `rng`; ids run from 1 across the whole set and
/// timestamps step back one minute per record within a category.
pub fn generate_ideas<R: Rng + ?Sized>(
    per_category: u32,
    base_time: DateTime<Utc>,
    rng: &mut R,
) -> Vec<IdeaRecord> {
    let mut records = Vec::with_capacity(per_category as usize * CATEGORIES.len());
    let mut next_id = 1_u64;

    for category in &CATEGORIES {
        for index in 0..per_category {
            let created_at = base_time - Duration::minutes(i64::from(index));
            records.push(build_record(rng, next_id, category, created_at));
            next_id += 1;
        }
        debug!(category = category.slug, count = per_category, "generated category");
    }

    records
}

/// The full JSON document for a plan, exactly as it is written to disk.
pub fn render_ideas(plan: &SeedPlan) -> Result<(String, usize)> {
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let records = generate_ideas(plan.per_category, plan.base_time, &mut rng);
    Ok((to_pretty_json(&records)?, records.len()))
}

pub fn run_seed(args: SeedArgs) -> Result<()> {
    let integration = OutputIntegration::detect();
    let ui = output_for(&integration);
    let summary_path = args.summary.clone();
    let plan = SeedPlan::from(args);

    ui.rule(Some("hub_maint seed-ideas"));
    ui.info(&format!(
        "seed={} per_category={} categories={} base_time={}",
        plan.seed,
        plan.per_category,
        CATEGORIES.len(),
        utc_iso(plan.base_time)
    ));

    let (document, count) = render_ideas(&plan)?;
    write_string(&plan.output, &document)?;
    info!(output = %plan.output.display(), records = count, "wrote seed ideas");
    ui.success(&format!(
        "wrote {count} ideas to {}",
        plan.output.display()
    ));

    let mut summary = RunSummary::new("seed-ideas");
    summary.count("records", count as u64);
    summary.count("categories", CATEGORIES.len() as u64);
    summary.note(format!("seed={}", plan.seed));
    summary.note(format!("output={}", plan.output.display()));
    summary.emit(summary_path.as_deref(), &integration)?;
    Ok(())
}
