//! Cross-crate property tests
//!
//! Each test drives `cami-core` against real files in a temporary workspace
//! and checks one observable guarantee of the agent manager.

use std::fs;
use std::path::Path;

use cami_core::{
    AgentSource, Error, FixMode, ParseErrorKind, ProjectNormalizationOptions, ProjectState,
    SourceNormalizationOptions, SourceSpec, Workspace, analyze_project, analyze_source, apply_fix,
    load_agents_from_sources, normalize_project, normalize_source, parse_agent_str, reconcile,
};
use cami_fs::{WorkspaceLayout, content_hash};
use cami_test_utils::{TestWorkspace, write_agent};

fn open(fixture: &TestWorkspace) -> Workspace {
    let ws = Workspace::open(WorkspaceLayout::at(fixture.root()));
    ws.init().unwrap();
    ws
}

fn parse_kind(text: &str) -> ParseErrorKind {
    match parse_agent_str(text, Path::new("agent.md")) {
        Err(Error::Parse(e)) => e.kind,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

// =============================================================================
// Hashing
// =============================================================================

#[test]
fn content_hash_ignores_line_endings_and_trailing_space() {
    let reference = content_hash("line1\nline2");
    assert_eq!(content_hash("line1\r\nline2\r\n"), reference);
    assert_eq!(content_hash("line1  \nline2  "), reference);
}

#[test]
fn content_hash_is_stable_under_renormalization() {
    let text = "a \r\n\tb\t\r\n\r\n";
    let once = cami_fs::normalize_content(text);
    let twice = cami_fs::normalize_content(&once);
    assert_eq!(content_hash(text), content_hash(&twice));
}

// =============================================================================
// Parsing and aggregation
// =============================================================================

#[test]
fn parse_rejects_missing_frontmatter_and_empty_files() {
    assert_eq!(parse_kind("no frontmatter here"), ParseErrorKind::MissingDelimiter);
    assert_eq!(parse_kind(""), ParseErrorKind::Empty);
}

#[test]
fn higher_priority_source_wins() {
    let fixture = TestWorkspace::new();
    let low = fixture.create_source("low", &[("x", "1.0.0")]);
    let high = fixture.create_source("high", &[("x", "2.0.0")]);

    let outcome = load_agents_from_sources(&[SourceSpec::new(&low, 100), SourceSpec::new(&high, 200)]);

    assert_eq!(outcome.agents.len(), 1);
    assert_eq!(outcome.agents[0].record.version, "2.0.0");
    assert_eq!(outcome.agents[0].priority, 200);
}

#[test]
fn missing_source_does_not_fail_the_load() {
    let fixture = TestWorkspace::new();
    let valid = fixture.create_source("valid", &[("only", "1.0.0")]);

    let outcome = load_agents_from_sources(&[
        SourceSpec::new("/nonexistent", 100),
        SourceSpec::new(&valid, 50),
    ]);

    assert_eq!(outcome.agents.len(), 1);
    assert_eq!(outcome.failed_sources.len(), 1);
}

// =============================================================================
// Compliance and normalization
// =============================================================================

#[test]
fn source_becomes_compliant_after_normalization() {
    let fixture = TestWorkspace::new();
    let source = fixture.create_source("team", &[("frontend", "1.0.0"), ("backend", "")]);

    let before = analyze_source("team", &source).unwrap();
    assert!(!before.is_compliant);
    assert!(before.missing_ignore_file);
    assert_eq!(before.issues.len(), 1);
    assert_eq!(before.issues[0].agent_file, "backend.md");
    assert!(before.issues[0].problems.iter().any(|p| p.contains("missing version")));

    let result = normalize_source("team", &source, SourceNormalizationOptions::all()).unwrap();
    assert!(result.success);
    assert!(result.backup_path.is_dir());
    fixture.assert_file_contains(&source.join("backend.md"), "version: 1.0.0");

    let after = analyze_source("team", &source).unwrap();
    assert!(after.is_compliant, "{after:?}");
    assert!(!after.missing_ignore_file);
}

#[test]
fn project_moves_through_states() {
    let fixture = TestWorkspace::new();
    let ws = open(&fixture);
    let project = fixture.create_project("app", &[]);

    assert_eq!(analyze_project(&project, &[]).unwrap().state, ProjectState::NonCami);

    let agents_dir = project.join(".claude/agents");
    write_agent(&agents_dir, "reviewer", "1.2.0");
    write_agent(&agents_dir, "planner", "0.1.0");
    assert_eq!(analyze_project(&project, &[]).unwrap().state, ProjectState::CamiAware);

    normalize_project(ws.manifests(), &project, &ProjectNormalizationOptions::default(), &[])
        .unwrap();
    assert_eq!(analyze_project(&project, &[]).unwrap().state, ProjectState::CamiNative);

    let manifest = ws.manifests().read_project(&project).unwrap();
    let mut names: Vec<_> = manifest.agents.iter().map(|a| a.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["planner", "reviewer"]);
    assert!(manifest.agents.iter().all(|a| a.source == "unknown"));
}

// =============================================================================
// Reconciliation
// =============================================================================

#[test]
fn reconciliation_reaches_a_fixed_point() {
    let fixture = TestWorkspace::new();
    let ws = open(&fixture);
    let a = fixture.create_source("a", &[("one", "1.0.0")]);
    fixture.create_source("b", &[("two", "1.0.0")]);
    fixture.create_source("c", &[("three", "1.0.0")]);
    ws.config()
        .update(|c| c.add_source(AgentSource::local("a", &a, 100)))
        .unwrap();

    let report = reconcile(&ws).unwrap();
    let mut untracked: Vec<_> = report.untracked.iter().map(|u| u.name.as_str()).collect();
    untracked.sort_unstable();
    assert_eq!(untracked, ["b", "c"]);
    assert!(report.orphaned.is_empty());

    let added = apply_fix(&ws, &report, &FixMode::Auto).unwrap();
    assert_eq!(added.len(), 2);

    let again = reconcile(&ws).unwrap();
    assert!(again.untracked.is_empty());
    assert!(again.orphaned.is_empty());
    assert!(again.is_clean());
}

#[test]
fn deleted_source_directory_is_orphaned() {
    let fixture = TestWorkspace::new();
    let ws = open(&fixture);
    let gone = fixture.create_source("gone", &[("x", "1.0.0")]);
    ws.config()
        .update(|c| c.add_source(AgentSource::local("gone", &gone, 50)))
        .unwrap();
    fs::remove_dir_all(&gone).unwrap();

    let report = reconcile(&ws).unwrap();
    assert_eq!(report.orphaned, vec!["gone".to_string()]);
    assert!(report.untracked.is_empty());
}
