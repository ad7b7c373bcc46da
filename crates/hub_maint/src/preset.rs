use std::path::Path;

use regex_lite::Regex;

use crate::error::{MaintError, Result};

const GOTHIC_CLASSES: &str = include_str!("../presets/gothic-classes.map");
const PASTEL_PURGE: &str = include_str!("../presets/pastel-purge.map");

const BUILTIN_PRESETS: [(&str, &str); 2] = [
    ("gothic-classes", GOTHIC_CLASSES),
    ("pastel-purge", PASTEL_PURGE),
];

const RULE_SEPARATOR: &str = " => ";
const PATTERN_PREFIX: &str = "re:";

pub const DEFAULT_EXTENSIONS: [&str; 5] = ["tsx", "ts", "jsx", "js", "css"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRule {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub to: String,
}

/// An ordered substitution table. Literal rules always run before pattern
/// rules; within each group the file order is kept.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub extensions: Vec<String>,
    pub literals: Vec<LiteralRule>,
    pub patterns: Vec<PatternRule>,
}

impl Preset {
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.literals.len() + self.patterns.len()
    }
}

#[must_use]
pub fn list_preset_names() -> Vec<String> {
    BUILTIN_PRESETS
        .iter()
        .map(|(name, _)| (*name).to_string())
        .collect()
}

pub fn load_preset(name: &str) -> Result<Preset> {
    let (_, content) = BUILTIN_PRESETS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .ok_or_else(|| MaintError::PresetNotFound {
            name: name.to_string(),
        })?;

    parse_preset(name, content)
}

pub fn load_preset_file(path: &Path) -> Result<Preset> {
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map_or_else(|| "custom".to_string(), |stem| stem.to_string_lossy().into_owned());
    parse_preset(&name, &content)
}

pub fn parse_preset(name: &str, content: &str) -> Result<Preset> {
    let mut preset = Preset {
        name: name.to_string(),
        ..Preset::default()
    };

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(description) = line.strip_prefix("@description") {
            preset.description = description.trim().to_string();
            continue;
        }

        if let Some(extensions) = line.strip_prefix("@extensions") {
            preset.extensions = extensions
                .split(',')
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect();
            continue;
        }

        if line.starts_with('@') {
            return Err(MaintError::invalid_preset(
                name,
                line_no,
                format!("unknown directive: {line}"),
            ));
        }

        let Some((from, to)) = line.split_once(RULE_SEPARATOR) else {
            return Err(MaintError::invalid_preset(
                name,
                line_no,
                "missing `=>` separator",
            ));
        };
        let from = from.trim();
        let to = to.trim().to_string();

        if let Some(pattern) = from.strip_prefix(PATTERN_PREFIX) {
            let regex = Regex::new(pattern).map_err(|error| {
                MaintError::invalid_preset(name, line_no, format!("bad pattern: {error}"))
            })?;
            preset.patterns.push(PatternRule { regex, to });
        } else if from.is_empty() {
            return Err(MaintError::invalid_preset(name, line_no, "empty target"));
        } else {
            preset.literals.push(LiteralRule {
                from: from.to_string(),
                to,
            });
        }
    }

    if preset.rule_count() == 0 {
        return Err(MaintError::invalid_preset(name, 0, "no substitution rules"));
    }

    if preset.extensions.is_empty() {
        preset.extensions = DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect();
    }

    Ok(preset)
}

#[cfg(test)]
mod tests {
    use crate::error::MaintError;

    use super::{DEFAULT_EXTENSIONS, list_preset_names, load_preset, parse_preset};

    #[test]
    fn parses_rules_directives_and_comments() {
        let preset = parse_preset(
            "inline",
            r"
                # comment
                @description demo table
                @extensions .CSS, tsx
                text-pink- => text-purple-
                re:(?i)#ff[0-9a-f]{4}\b => #6b21a8
            ",
        )
        .expect("parse inline preset");

        assert_eq!(preset.description, "demo table");
        assert_eq!(preset.extensions, vec!["css", "tsx"]);
        assert_eq!(preset.literals.len(), 1);
        assert_eq!(preset.literals[0].from, "text-pink-");
        assert_eq!(preset.literals[0].to, "text-purple-");
        assert_eq!(preset.patterns.len(), 1);
        assert!(preset.patterns[0].regex.is_match("#FFEEDD"));
    }

    #[test]
    fn missing_extensions_fall_back_to_defaults() {
        let preset = parse_preset("inline", "a => b").expect("parse");
        assert_eq!(preset.extensions, DEFAULT_EXTENSIONS.to_vec());
    }

    #[test]
    fn rejects_line_without_separator() {
        let error = parse_preset("broken", "text-pink-\n").expect_err("should fail");
        assert!(matches!(
            error,
            MaintError::InvalidPreset { line: 1, ref name, .. } if name == "broken"
        ));
    }

    #[test]
    fn rejects_invalid_regex_and_unknown_directive() {
        assert!(parse_preset("bad", "re:([a-f => x").is_err());
        assert!(parse_preset("bad", "@colors red\na => b").is_err());
    }

    #[test]
    fn rejects_empty_table() {
        let error = parse_preset("empty", "# nothing here\n").expect_err("empty preset");
        assert!(error.to_string().contains("no substitution rules"));
    }

    #[test]
    fn all_builtin_presets_parse() {
        for name in list_preset_names() {
            let preset = load_preset(&name).expect("builtin preset parses");
            assert!(preset.rule_count() > 0, "{name} has rules");
            assert!(!preset.description.is_empty(), "{name} has a description");
        }
    }

    #[test]
    fn pastel_purge_is_a_superset_of_gothic_classes() {
        let classes = load_preset("gothic-classes").expect("gothic-classes");
        let purge = load_preset("pastel-purge").expect("pastel-purge");
        for rule in &classes.literals {
            assert!(purge.literals.contains(rule), "missing {rule:?}");
        }
        assert!(!purge.patterns.is_empty());
    }

    #[test]
    fn replacements_never_reintroduce_targets() {
        for name in list_preset_names() {
            let preset = load_preset(&name).expect("builtin preset");
            for replacement in preset
                .literals
                .iter()
                .map(|rule| rule.to.as_str())
                .chain(preset.patterns.iter().map(|rule| rule.to.as_str()))
            {
                for target in &preset.literals {
                    assert!(
                        !replacement.contains(target.from.as_str()),
                        "{name}: {replacement} contains {}",
                        target.from
                    );
                }
                for pattern in &preset.patterns {
                    assert!(
                        !pattern.regex.is_match(replacement),
                        "{name}: {replacement} matches a pattern"
                    );
                }
            }
        }
    }

    #[test]
    fn unknown_preset_is_reported() {
        let error = load_preset("neon").expect_err("unknown preset");
        assert!(matches!(error, MaintError::PresetNotFound { name } if name == "neon"));
    }
}
