//! Drawing classification by file name.
//!
//! Construction drawing sets encode their discipline in the sheet number
//! prefix (`A-101`, `EA-301`, `S1-…`). The [`RuleTable`] maps a file name
//! to a `(category, subcategory)` pair with ordered, first-match-wins rules:
//!
//! 1. Test each category's primary pattern (case-sensitive) in table order.
//! 2. On the first match, test that category's subcategory patterns
//!    (case-insensitive, unanchored) in order; the first hit wins, otherwise
//!    the subcategory is [`GENERAL`].
//! 3. If no category matches, the result is `(Other, General)`.
//!
//! Only the base name is inspected; anything up to the last `/` or `\` is
//! ignored. Classification never fails.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Category assigned when no rule matches.
pub const OTHER: &str = "Other";
/// Subcategory assigned when a category matches but none of its subcategories do.
pub const GENERAL: &str = "General";

/// The standard discipline table, in evaluation order.
///
/// Each entry is `(category, primary pattern, [(subcategory, pattern)])`.
const STANDARD_TABLE: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "Architecture",
        r"^A-",
        &[
            ("Floor Plans", r"FLOOR[-\s]?PLAN|LEVEL"),
            ("Elevations", r"ELEVATION"),
            ("Sections", r"SECTION"),
            ("Details", r"DETAIL"),
            ("Ceiling Plans", r"CEILING"),
            ("Roof", r"ROOF"),
            ("Stairs", r"STAIR"),
            ("Millwork", r"MILLWORK"),
            ("Washrooms", r"WASHROOM|WC"),
            ("Museum", r"MUSEUM"),
            ("Theatre", r"THEATRE|THEATER"),
        ],
    ),
    (
        "Civil",
        r"^C-",
        &[
            ("Site Plans", r"SITE|EXISTING"),
            ("Grading", r"LEVELING|GRADING"),
            ("Details", r"DETAIL"),
        ],
    ),
    (
        "Electrical",
        r"^E[A-Z]-",
        &[
            ("Lighting", r"LIGHTING"),
            ("Services", r"SERVICE"),
            ("Fire Alarm", r"FIRE[-\s]?ALARM"),
            ("Distribution", r"DISTRIBUTION"),
            ("Scenography", r"SCENOGRAPHY"),
        ],
    ),
    (
        "Mechanical",
        r"^M[A-Z]-",
        &[
            ("Plumbing", r"PLUMBING"),
            ("HVAC", r"VENTILATION|HVAC"),
            ("Fire Protection", r"FIRE[-\s]?PROTECTION"),
            ("Piping", r"PIPING"),
            ("Controls", r"CONTROL"),
        ],
    ),
    (
        "Structure",
        r"^S\d",
        &[
            ("Foundation", r"FOUNDATION"),
            ("Floor Plans", r"PLAN"),
            ("Reinforcement", r"REINFORCEMENT"),
            ("Details", r"DETAIL"),
        ],
    ),
    (
        "Landscape",
        r"^L\d",
        &[
            ("Planting", r"PLANT"),
            ("Materials", r"MATERIAL"),
            ("Sections", r"SECTION"),
            ("Details", r"DETAIL"),
        ],
    ),
];

static STANDARD_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::from_entries(STANDARD_TABLE).expect("standard classification table must compile")
});

static REVISION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Rev\.?([0-9]+|[A-Za-z0-9_]+)").expect("revision pattern must compile")
});

/// Result of classifying a file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: String,
    pub subcategory: String,
}

impl Classification {
    fn new(category: &str, subcategory: &str) -> Self {
        Self {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
        }
    }

    /// `(Other, General)`.
    pub fn other() -> Self {
        Self::new(OTHER, GENERAL)
    }

    pub fn is_other(&self) -> bool {
        self.category == OTHER
    }
}

#[derive(Debug, Clone)]
struct SubcategoryRule {
    name: String,
    pattern: Regex,
}

/// One discipline: a case-sensitive primary pattern plus ordered,
/// case-insensitive subcategory patterns.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    name: String,
    pattern: Regex,
    subcategories: Vec<SubcategoryRule>,
}

impl CategoryRule {
    pub fn new(name: &str, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("invalid pattern for category '{}'", name))?;
        Ok(Self {
            name: name.to_string(),
            pattern,
            subcategories: Vec::new(),
        })
    }

    /// Append a subcategory; earlier subcategories take precedence.
    pub fn with_subcategory(mut self, name: &str, pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| {
                format!("invalid pattern for subcategory '{}/{}'", self.name, name)
            })?;
        self.subcategories.push(SubcategoryRule {
            name: name.to_string(),
            pattern,
        });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn subcategory_for(&self, base: &str) -> &str {
        self.subcategories
            .iter()
            .find(|s| s.pattern.is_match(base))
            .map(|s| s.name.as_str())
            .unwrap_or(GENERAL)
    }
}

/// Ordered category rules evaluated first-match-wins.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl RuleTable {
    /// An empty table: everything classifies as `(Other, General)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard discipline table (Architecture, Civil, Electrical,
    /// Mechanical, Structure, Landscape).
    pub fn standard() -> &'static RuleTable {
        &STANDARD_RULES
    }

    fn from_entries(entries: &[(&str, &str, &[(&str, &str)])]) -> Result<Self> {
        let mut table = Self::new();
        for (name, pattern, subs) in entries {
            let mut rule = CategoryRule::new(name, pattern)?;
            for (sub_name, sub_pattern) in subs.iter() {
                rule = rule.with_subcategory(sub_name, sub_pattern)?;
            }
            table.push(rule);
        }
        Ok(table)
    }

    /// Append a rule at the lowest precedence.
    pub fn push(&mut self, rule: CategoryRule) {
        self.rules.push(rule);
    }

    /// Category names in evaluation order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    pub fn classify(&self, file_name: &str) -> Classification {
        let base = base_name(file_name);
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(base))
            .map(|rule| Classification::new(&rule.name, rule.subcategory_for(base)))
            .unwrap_or_else(Classification::other)
    }
}

/// Classify a file name against the standard table.
pub fn classify(file_name: &str) -> Classification {
    STANDARD_RULES.classify(file_name)
}

/// Extract the revision token from a file name (`Plan-Rev.3.pdf` → `3`).
///
/// Matches `Rev` case-insensitively, an optional `.`, then a run of digits
/// or, failing that, word characters.
pub fn extract_revision(file_name: &str) -> Option<String> {
    REVISION
        .captures(base_name(file_name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Human-readable document name: trailing `.pdf` dropped, dashes to spaces.
pub fn display_name(file_name: &str) -> String {
    let base = base_name(file_name);
    let stem = base
        .len()
        .checked_sub(4)
        .and_then(|i| base.get(i..).map(|ext| (i, ext)))
        .filter(|(_, ext)| ext.eq_ignore_ascii_case(".pdf"))
        .map(|(i, _)| &base[..i])
        .unwrap_or(base);
    stem.replace('-', " ")
}

/// Dashboard colour for a category.
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Architecture" => "#3B82F6",
        "Civil" => "#10B981",
        "Electrical" => "#F59E0B",
        "Mechanical" => "#EF4444",
        "Structure" => "#8B5CF6",
        "Landscape" => "#22C55E",
        "Food-Services" => "#EC4899",
        "Scenography" => "#06B6D4",
        "AV-Equipment" => "#6366F1",
        _ => "#6B7280",
    }
}

fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str) -> (String, String) {
        let c = classify(name);
        (c.category, c.subcategory)
    }

    fn expect(name: &str, category: &str, subcategory: &str) {
        assert_eq!(
            pair(name),
            (category.to_string(), subcategory.to_string()),
            "classifying {}",
            name
        );
    }

    #[test]
    fn test_standard_disciplines() {
        expect("A-101-FLOOR-PLAN-LEVEL-1.pdf", "Architecture", "Floor Plans");
        expect("C-200-SITE.pdf", "Civil", "Site Plans");
        expect("EA-301-LIGHTING.pdf", "Electrical", "Lighting");
        expect("S1-FOUNDATION.pdf", "Structure", "Foundation");
        expect("MP-100-PLUMBING.pdf", "Mechanical", "Plumbing");
        expect("L2-PLANTING.pdf", "Landscape", "Planting");
    }

    #[test]
    fn test_subcategory_order_first_match_wins() {
        // LEVEL (Floor Plans) is listed before SECTION
        expect("A-300-SECTION-LEVEL-2.pdf", "Architecture", "Floor Plans");
        expect("A-500-DETAIL-SECTION.pdf", "Architecture", "Sections");
        expect("A-501-DETAILS.pdf", "Architecture", "Details");
        // PLAN in PLANT: Planting comes first for landscape
        expect("L1-PLANT-PLAN.pdf", "Landscape", "Planting");
        // Structure: Floor Plans before Details
        expect("S2-DETAIL-PLAN.pdf", "Structure", "Floor Plans");
    }

    #[test]
    fn test_subcategory_case_insensitive() {
        expect("A-201-elevation-north.pdf", "Architecture", "Elevations");
        expect("C-100-Grading.pdf", "Civil", "Grading");
        expect("ME-400-hvac.pdf", "Mechanical", "HVAC");
    }

    #[test]
    fn test_floor_plan_separators() {
        expect("A-100-FLOORPLAN.pdf", "Architecture", "Floor Plans");
        expect("A-100-FLOOR PLAN.pdf", "Architecture", "Floor Plans");
        expect("EF-1-FIRE ALARM.pdf", "Electrical", "Fire Alarm");
        expect("EF-1-FIREALARM.pdf", "Electrical", "Fire Alarm");
        expect("MF-2-FIRE-PROTECTION.pdf", "Mechanical", "Fire Protection");
    }

    #[test]
    fn test_general_when_no_subcategory_matches() {
        expect("A-900-COVER.pdf", "Architecture", "General");
        expect("S3-NOTES.pdf", "Structure", "General");
    }

    #[test]
    fn test_primary_pattern_is_case_sensitive() {
        expect("a-101-floor-plan.pdf", OTHER, GENERAL);
        expect("ea-301-lighting.pdf", OTHER, GENERAL);
        expect("s1-foundation.pdf", OTHER, GENERAL);
    }

    #[test]
    fn test_unmatched_names_are_other() {
        expect("", OTHER, GENERAL);
        expect("README.pdf", OTHER, GENERAL);
        expect("E-101-LIGHTING.pdf", OTHER, GENERAL);
        expect("SX-FOUNDATION.pdf", OTHER, GENERAL);
        expect("Ä-101-plan.pdf", OTHER, GENERAL);
    }

    #[test]
    fn test_architecture_never_falls_through() {
        // Contains DETAIL and SITE but the A- prefix decides first.
        expect("A-102-SITE-DETAIL.pdf", "Architecture", "Details");
    }

    #[test]
    fn test_path_components_ignored() {
        expect("C-DRAWINGS/A-101-ROOF.pdf", "Architecture", "Roof");
        expect("/plans/architecture/other.pdf", OTHER, GENERAL);
        expect(r"D:\plans\EL-200-SERVICE.pdf", "Electrical", "Services");
    }

    #[test]
    fn test_classify_idempotent() {
        let name = "MC-310-CONTROLS-Rev.2.pdf";
        assert_eq!(classify(name), classify(name));
        assert_eq!(extract_revision(name), extract_revision(name));
    }

    #[test]
    fn test_custom_table() {
        let mut table = RuleTable::new();
        table.push(
            CategoryRule::new("Food-Services", r"^FS-")
                .unwrap()
                .with_subcategory("Kitchen", "KITCHEN")
                .unwrap(),
        );
        assert_eq!(table.classify("FS-1-KITCHEN.pdf").subcategory, "Kitchen");
        assert_eq!(table.classify("A-101.pdf"), Classification::other());
        assert_eq!(table.categories().collect::<Vec<_>>(), vec!["Food-Services"]);
    }

    #[test]
    fn test_invalid_custom_pattern() {
        assert!(CategoryRule::new("Broken", "(").is_err());
    }

    #[test]
    fn test_standard_order() {
        let order: Vec<&str> = RuleTable::standard().categories().collect();
        assert_eq!(
            order,
            vec![
                "Architecture",
                "Civil",
                "Electrical",
                "Mechanical",
                "Structure",
                "Landscape"
            ]
        );
    }

    #[test]
    fn test_extract_revision() {
        assert_eq!(extract_revision("Plan-Rev.3.pdf").as_deref(), Some("3"));
        assert_eq!(extract_revision("Plan.pdf"), None);
        assert_eq!(extract_revision("A-101-REV2.pdf").as_deref(), Some("2"));
        assert_eq!(extract_revision("A-101-rev.B.pdf").as_deref(), Some("B"));
        assert_eq!(extract_revision("A-101-Rev12a.pdf").as_deref(), Some("12"));
        assert_eq!(extract_revision("A-101-Rev.pdf").as_deref(), Some("pdf"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("A-101-FLOOR-PLAN.pdf"), "A 101 FLOOR PLAN");
        assert_eq!(display_name("C-200-SITE.PDF"), "C 200 SITE");
        assert_eq!(display_name("notes.txt"), "notes.txt");
        assert_eq!(display_name("pdf"), "pdf");
        assert_eq!(display_name(".pdf"), "");
    }

    #[test]
    fn test_category_color() {
        assert_eq!(category_color("Architecture"), "#3B82F6");
        assert_eq!(category_color("AV-Equipment"), "#6366F1");
        assert_eq!(category_color("Other"), "#6B7280");
        assert_eq!(category_color("Plans"), "#6B7280");
    }
}
