//! Template block visibility tests.

use tokio_util::sync::CancellationToken;
use xref::base::FileId;
use xref::hir::{AnalysisConfig, blocks_visible_at, by_global_name};

use crate::helpers::hir_helpers::{host_from_sources, index_from_sources};
use crate::helpers::source_fixtures::{BASE_TWIG, CHILD_TWIG};

#[test]
fn test_child_block_overrides_base() {
    let host = host_from_sources(&[
        ("base.html.twig", BASE_TWIG),
        ("child.html.twig", CHILD_TWIG),
    ]);
    let analysis = host.analysis();
    let child = host.file_id("child.html.twig").unwrap();
    let base = host.file_id("base.html.twig").unwrap();

    let visible = analysis.blocks_visible_at(child);
    let content: Vec<_> = visible.iter().filter(|b| b.name == "content").collect();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0].primary.location.file, child);
    assert!(content[0].primary.has_parent_template);
    assert!(content[0].overrides_parent());

    let all = analysis.find_block_declarations(Some(child), "content");
    let files: Vec<FileId> = all.locations().iter().map(|l| l.file).collect();
    assert_eq!(files, vec![child, base]);

    let names: Vec<&str> = visible.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["content", "title"]);
}

#[test]
fn test_new_child_block_does_not_override() {
    let host = host_from_sources(&[
        ("base.html.twig", BASE_TWIG),
        (
            "child.html.twig",
            "{% extends 'base.html.twig' %}{% block sidebar %}{% endblock %}",
        ),
    ]);
    let analysis = host.analysis();
    let child = host.file_id("child.html.twig").unwrap();

    let visible = analysis.blocks_visible_at(child);
    let sidebar = visible.iter().find(|b| b.name == "sidebar").unwrap();
    assert!(sidebar.primary.has_parent_template);
    assert!(!sidebar.overrides_parent());
    assert_eq!(sidebar.all.len(), 1);
}

#[test]
fn test_extends_is_walked_before_embeds() {
    let index = index_from_sources(&[
        ("layout.twig", "{% block side %}L{% endblock %}"),
        ("card.twig", "{% block side %}C{% endblock %}{% block footer %}{% endblock %}"),
        (
            "page.twig",
            "{% extends 'layout.twig' %}{% embed 'card.twig' %}{% endembed %}",
        ),
    ]);
    let visible = blocks_visible_at(
        &index,
        "page.twig",
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    let side = visible.iter().find(|b| b.name == "side").unwrap();
    assert_eq!(side.primary.template_path, "layout.twig");
    assert_eq!(side.all.len(), 2);
    assert!(visible.iter().any(|b| b.name == "footer"));
}

#[test]
fn test_inheritance_cycle_terminates() {
    let index = index_from_sources(&[
        ("a.twig", "{% extends 'b.twig' %}{% block one %}{% endblock %}"),
        ("b.twig", "{% extends 'a.twig' %}{% block two %}{% endblock %}"),
        ("self.twig", "{% extends 'self.twig' %}{% block three %}{% endblock %}"),
    ]);
    let config = AnalysisConfig::default();
    let cancel = CancellationToken::new();

    let names = |template: &str| -> Vec<String> {
        blocks_visible_at(&index, template, &config, &cancel)
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect()
    };
    assert_eq!(names("a.twig"), vec!["one", "two"]);
    assert_eq!(names("b.twig"), vec!["two", "one"]);
    assert_eq!(names("self.twig"), vec!["three"]);
}

#[test]
fn test_missing_parent_keeps_own_blocks() {
    let index = index_from_sources(&[(
        "orphan.twig",
        "{% extends 'nowhere.twig' %}{% block body %}{% endblock %}",
    )]);
    let visible = blocks_visible_at(
        &index,
        "orphan.twig",
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(visible.len(), 1);
    assert!(!visible[0].overrides_parent());
}

#[test]
fn test_include_is_not_inherited() {
    let index = index_from_sources(&[
        ("footer.twig", "{% block footer %}{% endblock %}"),
        ("page.twig", "{% include 'footer.twig' %}{% block body %}{% endblock %}"),
    ]);
    let visible = blocks_visible_at(
        &index,
        "page.twig",
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    let names: Vec<&str> = visible.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["body"]);
}

#[test]
fn test_cancelled_walk_returns_none() {
    let index = index_from_sources(&[("base.html.twig", BASE_TWIG), ("child.html.twig", CHILD_TWIG)]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(blocks_visible_at(&index, "child.html.twig", &AnalysisConfig::default(), &cancel).is_none());
}

#[test]
fn test_global_name_lookup() {
    let index = index_from_sources(&[
        ("base.html.twig", BASE_TWIG),
        ("child.html.twig", CHILD_TWIG),
    ]);
    assert_eq!(by_global_name(&index, "content").len(), 2);
    assert_eq!(by_global_name(&index, " title ").len(), 1);
    assert!(by_global_name(&index, "sidebar").is_empty());
}
