use assist_indexer::IndexOptions;
use assist_search::{ContextOptions, ContextService, QueryCategory, SelectionRules};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, body).expect("write file");
}

fn service(root: &Path) -> ContextService {
    ContextService::new(
        IndexOptions::for_root(root),
        ContextOptions::default(),
        SelectionRules::default(),
    )
    .expect("service")
}

#[test]
fn pinned_file_leads_ranked_files() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(root, "src/utils/excelReader.ts", "const rows = [];\n");
    write(root, "docs/notes.md", "smtp test notes\n");
    write(root, "docs/relay.md", "smtp relay\n");
    write(root, "docs/unrelated.md", "nothing here\n");

    let svc = service(root);
    let selected = svc.context_files("smtp test");

    assert_eq!(
        selected,
        vec!["src/utils/excelReader.ts", "docs/notes.md", "docs/relay.md"]
    );
}

#[test]
fn test_email_trigger_forces_phase3_script_to_front() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(root, "src/services/emailSender.ts", "export function emailSender() {}\n");
    write(root, "CLAUDE.md", "# project notes\n");
    write(root, "src/tests/phase3/test-email-only.ts", "describe();\n");

    let svc = service(root);
    let selected = svc.context_files("send a test email");

    assert_eq!(selected[0], "src/tests/phase3/test-email-only.ts");
    assert!(selected.contains(&"src/services/emailSender.ts".to_string()));
    assert!(selected.contains(&"CLAUDE.md".to_string()));
}

#[test]
fn prepared_context_respects_budget_and_lists_files() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(root, "CLAUDE.md", &"gmail app password\n".repeat(100));
    write(root, "src/services/emailSender.ts", &"// smtp\n".repeat(100));

    let svc = service(root);
    let ctx = svc.prepare_context_with_budget("gmail smtp", None, 400);

    assert!(ctx.total_chars <= 400);
    assert_eq!(ctx.text.chars().count(), ctx.total_chars);
    assert!(ctx.truncated);
    assert_eq!(ctx.files.len(), 1);
    assert!(ctx.text.starts_with(&format!("\n=== {} ===\n", ctx.files[0])));
}

#[test]
fn explicit_files_bypass_selection() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(root, "CLAUDE.md", "notes\n");
    write(root, "docs/a.md", "alpha\n");

    let svc = service(root);
    let files = vec!["docs/a.md".to_string(), "../outside.md".to_string()];
    let ctx = svc.prepare_context("anything", Some(&files));

    assert_eq!(ctx.files, vec!["docs/a.md"]);
    assert_eq!(ctx.text, "\n=== docs/a.md ===\nalpha\n");
}

#[test]
fn refresh_picks_up_new_files_and_clears_cache() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(root, "CLAUDE.md", "old\n");

    let svc = service(root);
    let before = svc.prepare_context("notes", None);
    assert!(before.text.contains("old"));
    assert_eq!(svc.cached_files(), 1);

    write(root, "CLAUDE.md", "new\n");
    write(root, "docs/extra.md", "extra\n");
    let stats = svc.refresh().expect("refresh");

    assert_eq!(stats.files, 2);
    assert_eq!(svc.cached_files(), 0);
    let after = svc.prepare_context("notes", None);
    assert!(after.text.contains("new"));
    assert_eq!(svc.summary().total, 2);
}

#[test]
fn grep_and_summary_go_through_the_service() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(root, "src/services/emailSender.ts", "const host = 'SMTP.office365.com';\n");
    write(root, "docs/readme.md", "one\ntwo\nthree\n");

    let svc = service(root);
    let hits = svc.search_files("smtp\\.", Some(".ts")).expect("search");
    assert_eq!(
        hits["src/services/emailSender.ts"],
        vec!["Line 1: const host = 'SMTP.office365.com';".to_string()]
    );

    let summary = svc.file_summary("docs/readme.md", 2).expect("summary");
    assert_eq!(summary, "one\ntwo\n... [1 more lines]");

    assert_eq!(
        QueryCategory::classify("Why is the SMTP relay rejecting mail?"),
        QueryCategory::EmailConfiguration
    );
}
