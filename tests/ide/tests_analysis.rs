//! Analysis host tests: batching, read failures and concurrent snapshots.

use std::sync::atomic::{AtomicBool, Ordering};

use xref::hir::{DeclKind, ReferenceKind};
use xref::ide::AnalysisHost;
use xref::syntax::{ReadError, SyntaxFile, TwigFile};

use crate::helpers::hir_helpers::php_class;
use crate::helpers::source_fixtures::{ALIASES_YAML, BASE_TWIG, CHILD_TWIG, LISTENER_SERVICES_YAML};

#[test]
fn test_load_files_assigns_ids_in_order() {
    let host = AnalysisHost::new();
    let ids = host.load_files(vec![
        ("src/A.php".to_string(), php_class("App", "A", &["run"])),
        ("src/B.php".to_string(), php_class("App", "B", &[])),
        (
            "templates/base.html.twig".to_string(),
            SyntaxFile::Twig(TwigFile::new().with_block("body")),
        ),
    ]);

    assert_eq!(ids.len(), 3);
    assert_eq!(host.file_id("src/B.php"), Some(ids[1]));
    assert_eq!(host.file_path(ids[2]).as_deref(), Some("templates/base.html.twig"));

    let analysis = host.analysis();
    let classes: Vec<String> = analysis.all_names(DeclKind::Class).iter().cloned().collect();
    assert_eq!(classes.len(), 2);
    assert!(analysis.all_names(DeclKind::TemplateBlock).contains("body"));
}

#[test]
fn test_load_file_contents_reports_failures() {
    let host = AnalysisHost::new();
    let failed = host.load_file_contents(vec![
        ("config/services.yaml".to_string(), LISTENER_SERVICES_YAML.to_string()),
        ("templates/broken.twig".to_string(), "{% block".to_string()),
        ("notes.txt".to_string(), "hello".to_string()),
    ]);

    let paths: Vec<&str> = failed.iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&"templates/broken.twig"));
    assert!(paths.contains(&"notes.txt"));
    assert!(
        failed
            .iter()
            .any(|(_, err)| matches!(err, ReadError::Unsupported(_)))
    );

    assert!(host.file_id("config/services.yaml").is_some());
    assert!(host.file_id("notes.txt").is_none());
    assert!(host.analysis().service_graph().service("app.listener").is_some());
}

#[test]
fn test_failed_reread_keeps_previous_declarations() {
    let host = AnalysisHost::new();
    host.set_file_content("templates/base.html.twig", BASE_TWIG).unwrap();
    let before = host.analysis().revision();

    assert!(host.set_file_content("templates/base.html.twig", "{% block").is_err());

    let analysis = host.analysis();
    assert_eq!(analysis.revision(), before);
    assert_eq!(analysis.by_global_name("content").len(), 1);
}

#[test]
fn test_snapshot_survives_removal() {
    let host = AnalysisHost::new();
    host.set_file_content("config/services.yaml", ALIASES_YAML).unwrap();
    let old = host.analysis();

    assert!(host.remove_file("config/services.yaml"));
    assert!(!host.remove_file("config/services.yaml"));

    let new = host.analysis();
    assert!(old.resolve(ReferenceKind::ServiceId, "mailer", None).is_found());
    assert!(!new.resolve(ReferenceKind::ServiceId, "mailer", None).is_found());
    assert!(new.revision() > old.revision());
}

#[test]
fn test_readers_see_consistent_snapshots_while_writing() {
    let host = AnalysisHost::new();
    host.set_file_content("templates/base.html.twig", BASE_TWIG).unwrap();
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let analysis = host.analysis();
                    let revision = analysis.revision();
                    let blocks = analysis.by_global_name("content");
                    // Base always declares one; the child adds a second.
                    assert!((1..=2).contains(&blocks.len()));
                    assert_eq!(analysis.revision(), revision);
                }
            });
        }

        for round in 0..50 {
            if round % 2 == 0 {
                host.set_file_content("templates/child.html.twig", CHILD_TWIG).unwrap();
            } else {
                host.remove_file("templates/child.html.twig");
            }
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(host.analysis().by_global_name("content").len(), 1);
}

#[test]
fn test_resolution_tracks_new_revisions() {
    let host = AnalysisHost::new();
    host.set_file_content("config/services.yaml", LISTENER_SERVICES_YAML).unwrap();

    let first = host.analysis();
    assert!(!first.resolve(ReferenceKind::ClassName, "App\\Listener", None).is_found());

    host.set_file("src/Listener.php", &php_class("App", "Listener", &["onCreated"]));
    let second = host.analysis();
    assert!(second.resolve(ReferenceKind::ClassName, "App\\Listener", None).is_found());
    assert!(
        second
            .resolve(ReferenceKind::Controller, "app.listener:onCreated", None)
            .is_found()
    );

    // The older snapshot still answers from its own data.
    assert!(!first.resolve(ReferenceKind::ClassName, "App\\Listener", None).is_found());
}
