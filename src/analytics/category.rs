use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of time categories, in fixed display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Production,
    NonProduction,
    AdminRest,
    Other,
}

impl Category {
    /// All categories, in the order they are reported and tie-broken
    pub const ALL: [Category; 4] = [
        Category::Production,
        Category::NonProduction,
        Category::AdminRest,
        Category::Other,
    ];

    /// Stable identifier used in rule files and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Production => "production",
            Category::NonProduction => "non_production",
            Category::AdminRest => "admin_rest",
            Category::Other => "other",
        }
    }

    /// Human-readable label for the terminal view
    pub fn label(&self) -> &'static str {
        match self {
            Category::Production => "Production",
            Category::NonProduction => "Non-production",
            Category::AdminRest => "Admin & rest",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the classification table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Substring the calendar name must contain
    pub pattern: String,
    /// Substring that vetoes the match when also present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless: Option<String>,
    /// Category assigned on match
    pub category: Category,
}

impl CategoryRule {
    /// True when the rule matches the given lower-cased calendar name
    fn matches(&self, name: &str) -> bool {
        if !name.contains(&self.pattern) {
            return false;
        }
        match &self.unless {
            Some(veto) => !name.contains(veto),
            None => true,
        }
    }
}

/// Ordered classification table, evaluated top to bottom, first match wins.
///
/// Matching is case-insensitive on the calendar display name. Events whose
/// calendar matches no rule land in [`Category::Other`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RuleTable")]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
}

/// On-disk shape of the rule file
#[derive(Debug, Deserialize)]
struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl From<RuleTable> for RuleSet {
    fn from(table: RuleTable) -> Self {
        RuleSet::new(table.rules)
    }
}

impl RuleSet {
    /// Build a rule set, lower-casing patterns so matching stays
    /// case-insensitive regardless of how the rules were written
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| CategoryRule {
                pattern: rule.pattern.to_lowercase(),
                unless: rule.unless.map(|veto| veto.to_lowercase()),
                category: rule.category,
            })
            .collect();
        RuleSet { rules }
    }

    /// Number of rules in the table
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules in evaluation order
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Classify a calendar display name into exactly one category.
    ///
    /// Missing or empty names short-circuit to [`Category::Other`]. The
    /// input is never mutated and the result depends on nothing but the
    /// name and the table.
    pub fn classify(&self, calendar_name: Option<&str>) -> Category {
        let name = match calendar_name {
            Some(name) if !name.is_empty() => name.to_lowercase(),
            _ => return Category::Other,
        };

        for rule in &self.rules {
            if rule.matches(&name) {
                return rule.category;
            }
        }

        Category::Other
    }
}

impl Default for RuleSet {
    /// The built-in table: `prod` (unless `nonprod`), `nonprod`, `admin`,
    /// `rest`, in that order
    fn default() -> Self {
        RuleSet::new(vec![
            CategoryRule {
                pattern: String::from("prod"),
                unless: Some(String::from("nonprod")),
                category: Category::Production,
            },
            CategoryRule {
                pattern: String::from("nonprod"),
                unless: None,
                category: Category::NonProduction,
            },
            CategoryRule {
                pattern: String::from("admin"),
                unless: None,
                category: Category::AdminRest,
            },
            CategoryRule {
                pattern: String::from("rest"),
                unless: None,
                category: Category::AdminRest,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_classify() {
        let rules = RuleSet::default();

        assert_eq!(rules.classify(Some("Prod Support")), Category::Production);
        assert_eq!(
            rules.classify(Some("Nonprod Maintenance")),
            Category::NonProduction
        );
        assert_eq!(rules.classify(Some("Admin Tasks")), Category::AdminRest);
        assert_eq!(rules.classify(Some("Rest Breaks")), Category::AdminRest);
        assert_eq!(rules.classify(Some("Team Offsite")), Category::Other);
    }

    #[test]
    fn test_nonprod_takes_precedence_over_prod() {
        let rules = RuleSet::default();

        // "nonprod" contains "prod", so the veto on the first rule must fire
        assert_eq!(
            rules.classify(Some("Actual Diary - Nonprod")),
            Category::NonProduction
        );
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let rules = RuleSet::default();

        assert_eq!(
            rules.classify(Some("ADMIN Tasks")),
            rules.classify(Some("admin tasks"))
        );
        assert_eq!(rules.classify(Some("PROD ROTA")), Category::Production);
        assert_eq!(rules.classify(Some("NoNpRoD")), Category::NonProduction);
    }

    #[test]
    fn test_missing_or_empty_name_is_other() {
        let rules = RuleSet::default();

        assert_eq!(rules.classify(None), Category::Other);
        assert_eq!(rules.classify(Some("")), Category::Other);
    }

    #[test]
    fn test_first_match_wins() {
        let rules = RuleSet::new(vec![
            CategoryRule {
                pattern: String::from("work"),
                unless: None,
                category: Category::Production,
            },
            CategoryRule {
                pattern: String::from("work"),
                unless: None,
                category: Category::AdminRest,
            },
        ]);

        assert_eq!(rules.classify(Some("Work Diary")), Category::Production);
    }

    #[test]
    fn test_rules_from_file_are_lowercased() {
        let rules = RuleSet::new(vec![CategoryRule {
            pattern: String::from("PROD"),
            unless: Some(String::from("NONPROD")),
            category: Category::Production,
        }]);

        assert_eq!(rules.classify(Some("prod support")), Category::Production);
        assert_eq!(rules.classify(Some("nonprod support")), Category::Other);
    }

    #[test]
    fn test_empty_table_maps_everything_to_other() {
        let rules = RuleSet::new(Vec::new());

        assert!(rules.is_empty());
        assert_eq!(rules.classify(Some("Prod Support")), Category::Other);
    }

    #[test]
    fn test_rule_table_parses_from_toml() {
        let table = r#"
            [[rules]]
            pattern = "deep"
            category = "production"

            [[rules]]
            pattern = "shallow"
            unless = "deep"
            category = "admin_rest"
        "#;

        let rules: RuleSet = toml::from_str(table).expect("rule table should parse");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.classify(Some("Deep Work")), Category::Production);
        assert_eq!(rules.classify(Some("Shallow Focus")), Category::AdminRest);
        assert_eq!(rules.classify(Some("Shallow but Deep")), Category::Production);
    }
}
