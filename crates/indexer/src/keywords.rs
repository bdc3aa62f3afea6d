use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Identifiers shorter than this are too generic to be useful as keywords
const MIN_IDENTIFIER_LEN: usize = 4;

static CLASS_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+(\w+)").expect("valid regex"));
static FUNCTION_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:function|async\s+function)\s+(\w+)").expect("valid regex"));
static EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:class|function|async\s+function)\s+(\w+)").expect("valid regex")
});
static ID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"id=["']([^"']+)["']"#).expect("valid regex"));
static CLASS_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class=["']([^"']+)["']"#).expect("valid regex"));

/// Extracts keyword sets from file content
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    vocabulary: Vec<String>,
}

impl KeywordExtractor {
    pub fn new(vocabulary: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|term| term.into().to_lowercase())
                .collect(),
        }
    }

    pub fn extract(&self, content: &str, extension: &str) -> BTreeSet<String> {
        let mut keywords = BTreeSet::new();

        let lowered = content.to_lowercase();
        for term in &self.vocabulary {
            if lowered.contains(term.as_str()) {
                keywords.insert(term.clone());
            }
        }

        if is_source_extension(extension) {
            for pattern in [&*CLASS_DECL, &*FUNCTION_DECL, &*EXPORT_DECL] {
                collect_identifiers(pattern, content, &mut keywords);
            }
        }

        if is_markup_extension(extension) {
            collect_identifiers(&ID_ATTR, content, &mut keywords);
            for caps in CLASS_ATTR.captures_iter(content) {
                for class in caps[1].split_whitespace() {
                    push_identifier(class, &mut keywords);
                }
            }
        }

        keywords
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(DOMAIN_TERMS.iter().chain(REGION_TERMS.iter()).copied())
    }
}

fn collect_identifiers(pattern: &Regex, content: &str, out: &mut BTreeSet<String>) {
    for caps in pattern.captures_iter(content) {
        push_identifier(&caps[1], out);
    }
}

fn push_identifier(raw: &str, out: &mut BTreeSet<String>) {
    if raw.chars().count() >= MIN_IDENTIFIER_LEN {
        out.insert(raw.to_lowercase());
    }
}

fn is_source_extension(ext: &str) -> bool {
    SOURCE_EXTENSIONS.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate))
}

fn is_markup_extension(ext: &str) -> bool {
    MARKUP_EXTENSIONS.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate))
}

const SOURCE_EXTENSIONS: &[&str] = &["js", "ts"];
const MARKUP_EXTENSIONS: &[&str] = &["html"];

/// Dispatch automation vocabulary
pub const DOMAIN_TERMS: &[&str] = &[
    "dispatch",
    "smtp",
    "imap",
    "portal",
    "screenshot",
    "email sender",
    "automation",
    "facility",
    "contact",
    "puppeteer",
    "test email",
    "office 365",
    "gmail",
    "nodemailer",
    "excel",
    "parser",
    "scheduler",
    "customer dispatch",
    "event",
    "notification",
    "cpowerenergy",
    "northeast",
    "aaron industries",
    "usage data",
    "portal automation",
    "email configuration",
];

/// Grid operators, states and their abbreviations
pub const REGION_TERMS: &[&str] = &[
    "isone",
    "iso-ne",
    "nyiso",
    "ercot",
    "caiso",
    "aps",
    "massachusetts",
    "new york",
    "texas",
    "california",
    "arizona",
    "ct",
    "ma",
    "ny",
    "tx",
    "ca",
    "az",
    "pjm",
    "mdu",
    "miso",
    "pennsylvania",
    "pa",
    "new jersey",
    "nj",
    "maryland",
    "md",
    "delaware",
    "de",
    "virginia",
    "va",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_matches_are_case_insensitive() {
        let extractor = KeywordExtractor::new(["smtp", "office 365"]);
        let keywords = extractor.extract("Configure SMTP for Office 365 tenants", "md");
        assert!(keywords.contains("smtp"));
        assert!(keywords.contains("office 365"));
    }

    #[test]
    fn source_files_yield_declared_identifiers() {
        let extractor = KeywordExtractor::new(Vec::<String>::new());
        let source = r#"
export class EmailSender {}
async function sendTestEmail() {}
function run() {}
class Foo {}
"#;
        let keywords = extractor.extract(source, "ts");
        assert!(keywords.contains("emailsender"));
        assert!(keywords.contains("sendtestemail"));
        assert!(!keywords.contains("run"), "short identifiers are dropped");
        assert!(!keywords.contains("foo"));
    }

    #[test]
    fn markup_files_yield_ids_and_classes() {
        let extractor = KeywordExtractor::new(Vec::<String>::new());
        let html = r#"<div id="chat-panel" class="panel wide tab"><button id='send'>Go</button></div>"#;
        let keywords = extractor.extract(html, "html");
        assert!(keywords.contains("chat-panel"));
        assert!(keywords.contains("panel"));
        assert!(keywords.contains("wide"));
        assert!(keywords.contains("send"));
        assert!(!keywords.contains("tab"));
    }

    #[test]
    fn identifiers_are_not_extracted_from_other_extensions() {
        let extractor = KeywordExtractor::new(Vec::<String>::new());
        let keywords = extractor.extract("class Scheduler:\n    pass\n", "py");
        assert!(keywords.is_empty());
    }
}
