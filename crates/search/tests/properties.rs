use assist_indexer::{FileIndex, FileKind, FileRecord};
use assist_search::{ContextAssembler, FileReader, FileSelector, RelevanceScorer, SelectionRules};
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;

const WORDS: &[&str] = &["smtp", "portal", "dispatch", "email", "test", "css", "form"];

fn record(path: String, keywords: Vec<String>, preview: String) -> FileRecord {
    let extension = path.rsplit('.').next().unwrap_or_default().to_string();
    FileRecord {
        kind: FileKind::classify(&path),
        size: preview.len() as u64,
        path,
        extension,
        keywords: keywords.into_iter().collect(),
        preview,
    }
}

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(WORDS).prop_map(str::to_string)
}

fn records() -> impl Strategy<Value = Vec<FileRecord>> {
    prop::collection::vec(
        (
            "(src|docs|public)/[a-z]{1,8}\\.(ts|md|html|css)",
            prop::collection::vec(word(), 0..3),
            prop::collection::vec(word(), 0..4).prop_map(|w| w.join(" ")),
        ),
        0..30,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(path, keywords, preview)| record(path, keywords, preview))
            .collect()
    })
}

fn query() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..4).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn proptest_score_is_pure_and_bounded(recs in records(), q in query()) {
        let scorer = RelevanceScorer::default();
        for rec in &recs {
            let first = scorer.score(rec, &q);
            prop_assert_eq!(first.to_bits(), scorer.score(rec, &q).to_bits());
            prop_assert!((0.0..=1.0).contains(&first));
        }
    }

    #[test]
    fn proptest_pinned_files_always_selected(
        recs in records(),
        q in query(),
        pick in 0usize..30,
    ) {
        let index = FileIndex::from_records(PathBuf::from("/p"), recs);
        let paths: Vec<String> = index.paths().map(str::to_string).collect();
        prop_assume!(!paths.is_empty());
        let pinned = paths[pick % paths.len()].clone();

        let rules = SelectionRules {
            pinned: vec![pinned.clone(), "not/indexed.md".to_string()],
            ..SelectionRules::default()
        };
        let scorer = RelevanceScorer::default();
        let selected = FileSelector::new(&rules, &scorer, 20).select(&q, &index);

        prop_assert!(selected.contains(&pinned));
        prop_assert!(!selected.contains(&"not/indexed.md".to_string()));

        let mut deduped = selected.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), selected.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn proptest_assembled_context_within_budget(
        bodies in prop::collection::vec("[a-zé\n ]{0,400}", 1..6),
        max_chars in 0usize..1500,
        margin in 0usize..150,
    ) {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut paths = Vec::new();
        for (i, body) in bodies.iter().enumerate() {
            let name = format!("f{i}.md");
            fs::write(temp.path().join(&name), body).expect("write");
            paths.push(name);
        }
        let reader = FileReader::new(temp.path(), 8);

        let ctx = ContextAssembler::new(&reader, margin).assemble(&paths, max_chars);

        prop_assert!(ctx.total_chars <= max_chars);
        prop_assert_eq!(ctx.text.chars().count(), ctx.total_chars);
        prop_assert!(paths.starts_with(&ctx.files));
    }
}
