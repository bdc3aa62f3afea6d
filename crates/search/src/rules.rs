use serde::{Deserialize, Serialize};

/// Query substring that forces a set of paths into the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRule {
    /// Lower-case substring looked up in the lower-cased query
    pub trigger: String,

    /// Path substrings; the first matches of each are force-included
    pub include: Vec<String>,
}

impl TriggerRule {
    pub fn new(trigger: &str, include: &[&str]) -> Self {
        Self {
            trigger: trigger.to_string(),
            include: include.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Installation-specific selection tables
///
/// Rule order is significant: trigger rules are evaluated top to bottom and
/// each hit is inserted at the front, so later rules end up closer to the head
/// of the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionRules {
    /// Paths always selected first when present in the index
    pub pinned: Vec<String>,

    pub triggers: Vec<TriggerRule>,

    /// Interface words; a hit front-loads markup files
    pub ui_words: Vec<String>,

    /// Styling words; a hit appends stylesheets
    pub style_words: Vec<String>,

    pub ui_take: usize,
    pub style_take: usize,

    /// Index paths taken per trigger substring
    pub per_pattern_take: usize,
}

impl Default for SelectionRules {
    fn default() -> Self {
        fn strings(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| (*s).to_string()).collect()
        }

        Self {
            pinned: strings(&[
                "src/parsers/customerDispatchParser.ts",
                "src/services/emailSender.ts",
                "src/services/portalAutomation.ts",
                "src/services/scheduler.ts",
                "src/utils/excelReader.ts",
                "CLAUDE.md",
            ]),
            triggers: vec![
                TriggerRule::new("smtp", &["src/services/emailSender.ts", "CLAUDE.md"]),
                TriggerRule::new("portal", &["src/services/portalAutomation.ts"]),
                TriggerRule::new("dispatch", &["src/parsers/customerDispatchParser.ts"]),
                TriggerRule::new("contact", &["src/utils/excelReader.ts"]),
                TriggerRule::new("email", &["src/services/emailSender.ts", "CLAUDE.md"]),
                TriggerRule::new("screenshot", &["src/services/portalAutomation.ts"]),
                TriggerRule::new("scheduler", &["src/services/scheduler.ts"]),
                TriggerRule::new("office 365", &["CLAUDE.md"]),
                TriggerRule::new("gmail", &["CLAUDE.md"]),
                TriggerRule::new(
                    "test email",
                    &[
                        "src/tests/phase3/test-aaron-safe.ts",
                        "src/tests/phase3/test-email-only.ts",
                    ],
                ),
            ],
            ui_words: strings(&["html", "button", "form", "ui", "interface", "tab"]),
            style_words: strings(&["style", "css", "color", "design", "layout"]),
            ui_take: 3,
            style_take: 2,
            per_pattern_take: 2,
        }
    }
}

impl SelectionRules {
    pub fn validate(&self) -> Result<(), String> {
        if self.per_pattern_take == 0 {
            return Err("per_pattern_take must be > 0".to_string());
        }
        if let Some(rule) = self.triggers.iter().find(|r| r.trigger.trim().is_empty()) {
            return Err(format!(
                "trigger rule with empty trigger (includes {:?})",
                rule.include
            ));
        }
        if self
            .triggers
            .iter()
            .any(|r| r.trigger != r.trigger.to_lowercase())
        {
            return Err("trigger words must be lower-case".to_string());
        }
        Ok(())
    }
}

/// Coarse intent of a user query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    EmailConfiguration,
    PortalIssues,
    ContactManagement,
    DispatchParsing,
    Testing,
    Troubleshooting,
    General,
}

const CATEGORY_RULES: &[(&[&str], QueryCategory)] = &[
    (
        &["email", "smtp", "gmail", "office 365", "outlook", "mail"],
        QueryCategory::EmailConfiguration,
    ),
    (
        &["portal", "login", "screenshot", "browser", "puppeteer"],
        QueryCategory::PortalIssues,
    ),
    (
        &["contact", "excel", "facility", "recipient"],
        QueryCategory::ContactManagement,
    ),
    (
        &["parse", "dispatch", "event", "extract", "parsing"],
        QueryCategory::DispatchParsing,
    ),
    (&["test", "verify", "check", "validate"], QueryCategory::Testing),
    (
        &["can't", "cannot", "blocked", "why not", "error", "fail"],
        QueryCategory::Troubleshooting,
    ),
];

impl QueryCategory {
    /// First category whose keywords occur in the query
    pub fn classify(query: &str) -> Self {
        let query = query.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(words, _)| words.iter().any(|w| query.contains(w)))
            .map_or(Self::General, |(_, category)| *category)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailConfiguration => "email_configuration",
            Self::PortalIssues => "portal_issues",
            Self::ContactManagement => "contact_management",
            Self::DispatchParsing => "dispatch_parsing",
            Self::Testing => "testing",
            Self::Troubleshooting => "troubleshooting",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
