use assist_indexer::{FileKind, FileRecord};
use std::collections::BTreeSet;

const KEYWORD_MATCH_WEIGHT: f32 = 0.3;
const PREVIEW_HIT_WEIGHT: f32 = 0.1;
const MAX_SCORE: f32 = 1.0;

/// Extra condition a record must satisfy for a boost to apply
#[derive(Debug, Clone, Copy)]
pub enum BoostCondition {
    /// Case-sensitive substring of the content preview
    PreviewContains(&'static str),
    KindIn(&'static [FileKind]),
}

impl BoostCondition {
    fn holds(self, record: &FileRecord) -> bool {
        match self {
            Self::PreviewContains(needle) => record.preview.contains(needle),
            Self::KindIn(kinds) => kinds.contains(&record.kind),
        }
    }
}

/// Domain boost keyed on query substrings
#[derive(Debug, Clone, Copy)]
pub struct ScoreBoost {
    pub triggers: &'static [&'static str],
    pub condition: BoostCondition,
    pub weight: f32,
}

pub const DEFAULT_BOOSTS: &[ScoreBoost] = &[
    ScoreBoost {
        triggers: &["email", "smtp"],
        condition: BoostCondition::PreviewContains("emailSender"),
        weight: 0.5,
    },
    ScoreBoost {
        triggers: &["dispatch", "parser"],
        condition: BoostCondition::KindIn(&[FileKind::ParserModule, FileKind::ServiceModule]),
        weight: 0.2,
    },
    ScoreBoost {
        triggers: &["portal", "screenshot"],
        condition: BoostCondition::PreviewContains("portalAutomation"),
        weight: 0.3,
    },
];

/// Keyword/substring relevance of a file record to a query, in `[0, 1]`
#[derive(Debug, Clone, Copy)]
pub struct RelevanceScorer {
    boosts: &'static [ScoreBoost],
}

impl RelevanceScorer {
    pub const fn new(boosts: &'static [ScoreBoost]) -> Self {
        Self { boosts }
    }

    pub fn score(&self, record: &FileRecord, query: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let terms: BTreeSet<&str> = query_lower.split_whitespace().collect();

        let keyword_matches = terms.iter().filter(|t| record.has_keyword(t)).count();

        let preview_lower = record.preview.to_lowercase();
        let preview_hits = terms
            .iter()
            .filter(|t| preview_lower.contains(*t))
            .count();

        #[allow(clippy::cast_precision_loss)]
        let mut score = keyword_matches as f32 * KEYWORD_MATCH_WEIGHT
            + preview_hits as f32 * PREVIEW_HIT_WEIGHT;

        for boost in self.boosts {
            let triggered = boost
                .triggers
                .iter()
                .any(|trigger| query_lower.contains(trigger));
            if triggered && boost.condition.holds(record) {
                score += boost.weight;
            }
        }

        score.min(MAX_SCORE)
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_BOOSTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, keywords: &[&str], preview: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            size: preview.len() as u64,
            extension: "ts".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            preview: preview.to_string(),
            kind: FileKind::classify(path),
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn keyword_and_preview_hits_accumulate() {
        let scorer = RelevanceScorer::default();
        let rec = record("src/app.ts", &["smtp", "test"], "smtp test harness");
        assert!(approx(scorer.score(&rec, "SMTP test"), 0.8));
    }

    #[test]
    fn repeated_query_tokens_count_once() {
        let scorer = RelevanceScorer::default();
        let rec = record("src/app.ts", &["smtp"], "");
        assert!(approx(scorer.score(&rec, "smtp smtp smtp"), 0.3));
    }

    #[test]
    fn email_boost_requires_sentinel_in_preview() {
        let scorer = RelevanceScorer::default();
        let with = record("src/app.ts", &[], "import { emailSender } from './x'");
        let without = record("src/app.ts", &[], "import { sender } from './x'");
        assert!(approx(scorer.score(&with, "why does email fail"), 0.5));
        assert!(approx(scorer.score(&without, "why does email fail"), 0.0));
    }

    #[test]
    fn dispatch_boost_applies_to_parser_and_service_kinds() {
        let scorer = RelevanceScorer::default();
        let parser = record("src/parsers/p.ts", &[], "");
        let util = record("src/utils/u.ts", &[], "");
        assert!(approx(scorer.score(&parser, "dispatch window"), 0.2));
        assert!(approx(scorer.score(&util, "dispatch window"), 0.0));
    }

    #[test]
    fn score_is_clamped() {
        let scorer = RelevanceScorer::default();
        let rec = record(
            "src/services/emailSender.ts",
            &["smtp", "email", "dispatch", "portal"],
            "emailSender portalAutomation smtp email dispatch portal",
        );
        assert!(approx(scorer.score(&rec, "smtp email dispatch portal"), 1.0));
    }
}
