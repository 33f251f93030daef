use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagType {
    /// One character per flag (the Hunspell default).
    #[default]
    Char,
    /// Two characters per flag.
    Long,
    /// Comma separated decimal numbers.
    Num,
}

impl FlagType {
    pub fn split(&self, flags: &str) -> Vec<String> {
        match self {
            FlagType::Char => flags.chars().map(|c| c.to_string()).collect(),
            FlagType::Long => flags
                .chars()
                .collect::<Vec<_>>()
                .chunks(2)
                .map(|pair| pair.iter().collect())
                .collect(),
            FlagType::Num => flags
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone)]
pub struct AffixEntry {
    strip: String,
    add: String,
    condition: Option<Regex>,
}

#[derive(Debug, Clone)]
pub struct AffixGroup {
    pub kind: AffixKind,
    pub cross_product: bool,
    entries: Vec<AffixEntry>,
}

impl AffixGroup {
    /// Surface forms produced by applying this group to `stem`.
    pub fn apply(&self, stem: &str) -> Vec<String> {
        let mut forms = Vec::new();
        for entry in &self.entries {
            if let Some(cond) = &entry.condition {
                if !cond.is_match(stem) {
                    continue;
                }
            }
            match self.kind {
                AffixKind::Suffix => {
                    if let Some(base) = stem.strip_suffix(entry.strip.as_str()) {
                        forms.push(format!("{}{}", base, entry.add));
                    }
                }
                AffixKind::Prefix => {
                    if let Some(base) = stem.strip_prefix(entry.strip.as_str()) {
                        forms.push(format!("{}{}", entry.add, base));
                    }
                }
            }
        }
        forms
    }
}

/// `FLAG` type and `PFX`/`SFX` groups of a Hunspell `.aff` file. Other
/// directives (REP, KEY, compounding) are skipped.
#[derive(Debug, Clone, Default)]
pub struct AffixRules {
    pub flag_type: FlagType,
    groups: HashMap<String, AffixGroup>,
}

impl AffixRules {
    pub fn parse(content: &str) -> Result<Self> {
        let mut rules = AffixRules::default();
        // Header of the group currently being read and the entries still expected.
        let mut pending: Option<(String, usize)> = None;

        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();

            match fields[0] {
                "FLAG" if fields.len() >= 2 => {
                    rules.flag_type = match fields[1] {
                        "long" => FlagType::Long,
                        "num" => FlagType::Num,
                        _ => FlagType::Char,
                    };
                }
                tag @ ("PFX" | "SFX") => {
                    let kind = if tag == "PFX" {
                        AffixKind::Prefix
                    } else {
                        AffixKind::Suffix
                    };

                    match pending.take() {
                        Some((flag, remaining)) if remaining > 0 && fields.get(1) == Some(&flag.as_str()) => {
                            let entry = parse_entry(kind, &fields)
                                .with_context(|| format!("Invalid affix entry on line {}", line_no + 1))?;
                            if let Some(group) = rules.groups.get_mut(&flag) {
                                group.entries.push(entry);
                            }
                            if remaining > 1 {
                                pending = Some((flag, remaining - 1));
                            }
                        }
                        _ => {
                            // Group header: "SFX flag cross_product count"
                            if fields.len() < 4 {
                                bail!("Invalid affix header on line {}", line_no + 1);
                            }
                            let flag = fields[1].to_string();
                            let count: usize = fields[3].parse().with_context(|| {
                                format!("Invalid affix count on line {}", line_no + 1)
                            })?;
                            rules.groups.insert(
                                flag.clone(),
                                AffixGroup {
                                    kind,
                                    cross_product: fields[2] == "Y",
                                    entries: Vec::with_capacity(count),
                                },
                            );
                            if count > 0 {
                                pending = Some((flag, count));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(rules)
    }

    pub fn group(&self, flag: &str) -> Option<&AffixGroup> {
        self.groups.get(flag)
    }

    /// Expand one `.dic` entry (`stem/FLAGS`) into every surface form it licenses.
    pub fn expand(&self, entry: &str) -> Vec<String> {
        let (stem, flags) = match entry.split_once('/') {
            Some((stem, flags)) => (stem, flags),
            None => (entry, ""),
        };
        // Morphological fields follow the flags after whitespace.
        let flags = flags.split_whitespace().next().unwrap_or("");

        let mut forms = vec![stem.to_string()];
        let groups: Vec<&AffixGroup> = self
            .flag_type
            .split(flags)
            .iter()
            .filter_map(|flag| self.group(flag))
            .collect();

        let mut suffixed = Vec::new();
        for group in groups.iter().filter(|g| g.kind == AffixKind::Suffix) {
            for form in group.apply(stem) {
                if group.cross_product {
                    suffixed.push(form.clone());
                }
                forms.push(form);
            }
        }

        for group in groups.iter().filter(|g| g.kind == AffixKind::Prefix) {
            forms.extend(group.apply(stem));
            if group.cross_product {
                for form in &suffixed {
                    forms.extend(group.apply(form));
                }
            }
        }

        forms
    }
}

fn parse_entry(kind: AffixKind, fields: &[&str]) -> Result<AffixEntry> {
    if fields.len() < 4 {
        bail!("expected at least 4 fields, got {}", fields.len());
    }
    let strip = if fields[2] == "0" { "" } else { fields[2] };
    // Continuation flags on the affix ("ing/S") are not followed.
    let add = fields[3].split('/').next().unwrap_or("");
    let add = if add == "0" { "" } else { add };
    let condition = match fields.get(4) {
        Some(&".") | None => None,
        Some(cond) => Some(condition_regex(kind, cond)?),
    };

    Ok(AffixEntry {
        strip: strip.to_string(),
        add: add.to_string(),
        condition,
    })
}

/// Hunspell conditions are a restricted regex dialect (literals, `.`, `[...]`,
/// `[^...]`) anchored at the end of the stem for suffixes and the start for prefixes.
fn condition_regex(kind: AffixKind, condition: &str) -> Result<Regex> {
    let mut pattern = String::new();
    let mut in_class = false;
    for ch in condition.chars() {
        match ch {
            '[' => {
                in_class = true;
                pattern.push('[');
            }
            ']' => {
                in_class = false;
                pattern.push(']');
            }
            '^' if in_class => pattern.push('^'),
            '.' if !in_class => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }

    let anchored = match kind {
        AffixKind::Suffix => format!("(?:{})$", pattern),
        AffixKind::Prefix => format!("^(?:{})", pattern),
    };
    Regex::new(&anchored).with_context(|| format!("Invalid affix condition '{}'", condition))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFF: &str = "\
SET UTF-8
TRY esianrtolcdugmphbyfvkwzESIANRTOLCDUGMPHBYFVKWZ'

PFX A Y 1
PFX A   0     re         .

SFX D Y 4
SFX D   0     d          e
SFX D   y     ied        [^aeiou]y
SFX D   0     ed         [^ey]
SFX D   0     ed         [aeiou]y

SFX S Y 2
SFX S   y     ies        [^aeiou]y
SFX S   0     s          [^sxzhy]
";

    #[test]
    fn test_parse_groups() {
        let rules = AffixRules::parse(AFF).unwrap();
        assert_eq!(rules.flag_type, FlagType::Char);
        assert_eq!(rules.group("D").map(|g| g.kind), Some(AffixKind::Suffix));
        assert_eq!(rules.group("A").map(|g| g.kind), Some(AffixKind::Prefix));
        assert!(rules.group("Z").is_none());
    }

    #[test]
    fn test_expand_suffixes_respect_conditions() {
        let rules = AffixRules::parse(AFF).unwrap();

        let forms = rules.expand("try/DS");
        assert!(forms.contains(&"try".to_string()));
        assert!(forms.contains(&"tried".to_string()));
        assert!(forms.contains(&"tries".to_string()));
        assert!(!forms.contains(&"tryed".to_string()));

        let forms = rules.expand("bake/D");
        assert!(forms.contains(&"baked".to_string()));
        assert!(!forms.contains(&"bakeed".to_string()));
    }

    #[test]
    fn test_expand_cross_product() {
        let rules = AffixRules::parse(AFF).unwrap();
        let forms = rules.expand("work/ADS");
        for expected in ["work", "worked", "works", "rework", "reworked", "reworks"] {
            assert!(forms.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_long_and_numeric_flags() {
        assert_eq!(FlagType::Long.split("AaBb"), vec!["Aa", "Bb"]);
        assert_eq!(FlagType::Num.split("101,7"), vec!["101", "7"]);
    }

    #[test]
    fn test_truncated_header_is_an_error() {
        assert!(AffixRules::parse("SFX D Y\n").is_err());
    }
}
