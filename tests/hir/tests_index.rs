//! Project index tests: per-file replacement, tie-breaks and generations.

use rstest::rstest;
use xref::base::FileId;
use xref::hir::{DeclKind, Dependencies, ProjectIndex, extract};
use xref::syntax::{SyntaxKind, read_file};

use crate::helpers::hir_helpers::index_from_sources;

fn put_text(index: &mut ProjectIndex, file: u32, path: &str, text: &str) -> u64 {
    let file = FileId::new(file);
    let kind = SyntaxKind::from_path(path).unwrap();
    let syntax = read_file(kind, text).unwrap();
    index.put(file, path, extract(file, path, &syntax))
}

// =============================================================================
// REPLACEMENT
// =============================================================================

#[rstest]
#[case(DeclKind::Service, "app.old", false)]
#[case(DeclKind::Service, "app.kept", true)]
#[case(DeclKind::Service, "app.new", true)]
#[case(DeclKind::Parameter, "old.param", false)]
#[case(DeclKind::Parameter, "new.param", true)]
fn test_invalidate_then_put_has_no_stale_entries(
    #[case] kind: DeclKind,
    #[case] name: &str,
    #[case] present: bool,
) {
    let mut index = ProjectIndex::new();
    put_text(
        &mut index,
        0,
        "config/services.yaml",
        "parameters:\n    old.param: 1\nservices:\n    app.old: { class: App\\Old }\n    app.kept: { class: App\\Kept }\n",
    );

    assert!(index.invalidate(FileId::new(0)));
    assert!(index.query(DeclKind::Service, "app.old").is_empty());

    put_text(
        &mut index,
        0,
        "config/services.yaml",
        "parameters:\n    new.param: 2\nservices:\n    app.kept: { class: App\\Kept }\n    app.new: { class: App\\New }\n",
    );

    let found = index.query(kind, name);
    assert_eq!(!found.is_empty(), present, "{:?} {}", kind, name);
    if present {
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location().file, FileId::new(0));
    }
}

#[test]
fn test_put_replaces_without_invalidate() {
    let mut index = ProjectIndex::new();
    put_text(&mut index, 0, "a.twig", "{% block one %}{% endblock %}");
    put_text(&mut index, 0, "a.twig", "{% block two %}{% endblock %}");

    let names: Vec<String> = index.all_names(DeclKind::TemplateBlock).into_iter().collect();
    assert_eq!(names, vec!["two".to_string()]);
}

#[test]
fn test_invalidate_unknown_file_is_noop() {
    let mut index = ProjectIndex::new();
    let revision = index.revision();
    assert!(!index.invalidate(FileId::new(9)));
    assert_eq!(index.revision(), revision);
}

// =============================================================================
// DUPLICATE IDS
// =============================================================================

#[rstest]
#[case(&[0, 1])]
#[case(&[1, 0])]
fn test_duplicate_service_id_is_won_by_later_path(#[case] order: &[usize]) {
    let files = [
        ("config/a.yaml", "services:\n    app.mailer: { class: App\\FirstMailer }\n"),
        ("config/b.yaml", "services:\n    app.mailer: { class: App\\SecondMailer }\n"),
    ];
    let mut index = ProjectIndex::new();
    for (file, &i) in order.iter().enumerate() {
        put_text(&mut index, file as u32, files[i].0, files[i].1);
    }

    let winner = index.lookup(DeclKind::Service, "app.mailer").unwrap();
    assert_eq!(winner.as_service().unwrap().class.as_deref(), Some("App\\SecondMailer"));
    assert_eq!(index.query(DeclKind::Service, "app.mailer").len(), 2);
}

// =============================================================================
// GENERATIONS
// =============================================================================

#[test]
fn test_generations_track_commits() {
    let mut index = ProjectIndex::new();
    let first = put_text(&mut index, 0, "a.twig", "{% block one %}{% endblock %}");
    let second = put_text(&mut index, 1, "config/services.yaml", "services:\n    app.x: ~\n");

    assert!(second > first);
    assert_eq!(index.generation(FileId::new(0)), Some(first));
    assert_eq!(index.generation(FileId::new(1)), Some(second));
    assert_eq!(index.revision(), second);
    assert_eq!(index.kind_revision(DeclKind::TemplateBlock), first);
    assert_eq!(index.kind_revision(DeclKind::Service), second);
}

#[test]
fn test_dependencies_invalidate_only_on_touched_kinds() {
    let mut index = index_from_sources(&[
        ("a.twig", "{% block one %}{% endblock %}"),
        ("config/services.yaml", "services:\n    app.x: ~\n"),
    ]);
    let blocks = Dependencies::on_kinds(&index, &[DeclKind::TemplateBlock]);
    let services = Dependencies::on_kinds(&index, &[DeclKind::Service]);
    let file = Dependencies::on_kinds(&index, &[]).with_file(&index, FileId::new(0));

    put_text(&mut index, 1, "config/services.yaml", "services:\n    app.y: ~\n");

    assert!(blocks.is_current(&index));
    assert!(file.is_current(&index));
    assert!(!services.is_current(&index));

    index.invalidate(FileId::new(0));
    assert!(!blocks.is_current(&index));
    assert!(!file.is_current(&index));
}

#[test]
fn test_all_names_is_stable_between_changes() {
    let index = index_from_sources(&[(
        "config/services.yaml",
        "services:\n    b.service: ~\n    a.service: ~\n",
    )]);
    let first = index.all_names(DeclKind::Service);
    let second = index.all_names(DeclKind::Service);
    assert_eq!(first, second);
    assert_eq!(first.into_iter().collect::<Vec<_>>(), vec!["a.service", "b.service"]);
}
