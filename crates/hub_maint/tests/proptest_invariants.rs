//! Property-based invariant tests for the recolor, theme, and seed pipelines.
//!
//! Invariants checked:
//! 1. Applying a built-in preset twice is the same as applying it once.
//! 2. A second pass over already-recolored text reports zero replacements.
//! 3. Darkening never raises a channel and strictly lowers every nonzero one.
//! 4. Malformed hex strings are never flagged as pastel.
//! 5. A theme whose aesthetic mentions "pastel" is always dropped.
//! 6. Seed ids are contiguous from 1 and the count is per-category times nine.
//! 7. The same seed always renders the same document.

use chrono::{DateTime, Utc};
use hub_maint::color::{Rgb, darken_hex, is_pastel_hex, parse_hex};
use hub_maint::preset::load_preset;
use hub_maint::recolor::{CLASSES_PRESET, PURGE_PRESET, apply_preset};
use hub_maint::seed::{CATEGORIES, SeedPlan, generate_ideas, render_ideas};
use hub_maint::themes::{BLOCKED_WORDS, filter_themes};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .expect("fixed timestamp")
        .with_timezone(&Utc)
}

// ── Strategies ──────────────────────────────────────────────────────────

fn class_token() -> impl Strategy<Value = String> {
    let variant = prop::sample::select(vec!["", "hover:", "focus:", "dark:", "md:"]);
    let utility = prop::sample::select(vec![
        "text", "bg", "border", "ring", "from", "via", "to", "shadow",
    ]);
    let hue = prop::sample::select(vec![
        "pink", "yellow", "rose", "lime", "fuchsia", "amber", "sky", "purple", "slate",
    ]);
    let shade = prop::sample::select(vec!["50", "100", "200", "300", "400", "500", "900"]);
    (variant, utility, hue, shade)
        .prop_map(|(variant, utility, hue, shade)| format!("{variant}{utility}-{hue}-{shade}"))
}

fn hex_token() -> impl Strategy<Value = String> {
    "#f[a-f0-9][0-9a-f]{4}"
}

fn source_text() -> impl Strategy<Value = String> {
    let token = prop_oneof![3 => class_token(), 1 => hex_token(), 1 => "[a-z]{1,8}"];
    let separator = prop::sample::select(vec![" ", "\n", "\t", "  "]);
    prop::collection::vec((token, separator), 0..24).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(token, separator)| format!("{token}{separator}"))
            .collect()
    })
}

fn pastel_rgb() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>())
        .prop_map(|(r, g, b)| Rgb::new(r, g, b))
        .prop_filter("pastel only", |rgb| rgb.is_pastel())
}

fn malformed_hex() -> impl Strategy<Value = String> {
    prop_oneof![
        "#?[0-9a-f]{0,5}",
        "#?[0-9a-f]{7,10}",
        "#?[0-9a-f]{0,5}[g-z][0-9a-f]{0,5}",
        "[ ]{1,2}#[0-9a-f]{6}",
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Preset idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn presets_are_idempotent(text in source_text()) {
        for name in [CLASSES_PRESET, PURGE_PRESET] {
            let preset = load_preset(name).expect("built-in preset");
            let once = apply_preset(&text, &preset);
            let twice = apply_preset(&once.content, &preset);
            prop_assert_eq!(&twice.content, &once.content, "preset {} not idempotent", name);
            prop_assert_eq!(twice.replacements, 0);
        }
    }
}

proptest! {
    #[test]
    fn purge_leaves_no_ff_hex_literals(text in source_text()) {
        let preset = load_preset(PURGE_PRESET).expect("built-in preset");
        let rewritten = apply_preset(&text, &preset).content;
        for token in rewritten.split_whitespace() {
            let lowered = token.to_ascii_lowercase();
            prop_assert!(
                !(lowered.len() == 7 && lowered.starts_with("#ff")),
                "light hex survived: {}",
                token
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3-4. Color heuristic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn darken_never_raises_a_channel(rgb in pastel_rgb(), factor in 0.0f64..0.99) {
        let hex = rgb.to_hex();
        prop_assert!(is_pastel_hex(&hex));
        let darkened = darken_hex(&hex, factor).expect("well-formed hex");
        let out = parse_hex(&darkened).expect("darkened hex parses");
        for (before, after) in [(rgb.r, out.r), (rgb.g, out.g), (rgb.b, out.b)] {
            prop_assert!(after <= before);
            if before > 0 {
                prop_assert!(after < before, "{} -> {} at factor {}", before, after, factor);
            }
        }
    }
}

proptest! {
    #[test]
    fn malformed_hex_is_never_pastel(value in malformed_hex()) {
        prop_assume!(parse_hex(&value).is_none());
        prop_assert!(!is_pastel_hex(&value));
        prop_assert!(darken_hex(&value, 0.4).is_none());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Theme drop-list
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pastel_aesthetic_is_always_dropped(
        prefix in "[A-Za-z ]{0,12}",
        suffix in "[A-Za-z ]{0,12}",
        upper in any::<bool>(),
        primary in "#[0-9a-f]{6}",
    ) {
        let word = if upper { "PASTEL" } else { "pastel" };
        let themes = vec![
            json!({ "name": "Target", "primary": primary, "aesthetic": format!("{prefix}{word}{suffix}") }),
            json!({ "name": "Keeper", "primary": "#111111", "aesthetic": "gothic" }),
        ];
        let blocked = BLOCKED_WORDS.iter().map(ToString::to_string).collect::<Vec<_>>();

        let (kept, counts) = filter_themes(themes, 0.4, &blocked);

        prop_assert_eq!(counts.removed, 1);
        prop_assert_eq!(kept.len(), 1);
        prop_assert_eq!(&kept[0]["name"], "Keeper");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6-7. Seed generation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn seed_ids_are_contiguous(per_category in 1u32..8, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let records = generate_ideas(per_category, base_time(), &mut rng);

        prop_assert_eq!(records.len(), per_category as usize * CATEGORIES.len());
        for (index, record) in records.iter().enumerate() {
            prop_assert_eq!(record.id, index as u64 + 1);
            prop_assert_eq!(&record.tags[0], &record.category);
        }
    }

    #[test]
    fn same_seed_renders_identically(per_category in 1u32..5, seed in any::<u64>()) {
        let plan = SeedPlan {
            output: "ideas.json".into(),
            per_category,
            seed,
            base_time: base_time(),
        };
        let (first, first_count) = render_ideas(&plan).expect("render");
        let (second, second_count) = render_ideas(&plan).expect("render");
        prop_assert_eq!(first_count, second_count);
        prop_assert_eq!(first, second);
    }
}
