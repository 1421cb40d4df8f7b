//! Service graph tests: parent chains, cycles, aliases and tags.

use tokio_util::sync::CancellationToken;
use xref::hir::{AnalysisConfig, ServiceGraph};

use crate::helpers::hir_helpers::{host_from_sources, index_from_sources};
use crate::helpers::source_fixtures::{
    ALIASES_YAML, LISTENER_SERVICES_YAML, PARENT_CHAIN_YAML, PARENT_CYCLE_YAML, SERVICES_XML,
};

fn graph_of(files: &[(&str, &str)]) -> ServiceGraph {
    let index = index_from_sources(files);
    ServiceGraph::build(&index, &AnalysisConfig::default(), &CancellationToken::new()).unwrap()
}

#[test]
fn test_parent_chain_round_trip() {
    let graph = graph_of(&[("config/services.yaml", PARENT_CHAIN_YAML)]);
    assert_eq!(graph.get_service_class("serviceA"), Some("App\\Foo"));
    assert_eq!(graph.get_service_class("child"), Some("App\\Foo"));
    assert_eq!(graph.get_service_class("grandchild"), Some("App\\Foo"));
}

#[test]
fn test_parent_cycle_terminates_and_excludes() {
    let graph = graph_of(&[("config/services.yaml", PARENT_CYCLE_YAML)]);
    for id in ["a", "b", "c"] {
        assert_eq!(graph.get_service_class(id), None, "{}", id);
        assert!(graph.is_broken(id), "{}", id);
    }
    assert_eq!(graph.get_service_class("ok"), Some("App\\Ok"));
    assert!(!graph.is_broken("ok"));
}

#[test]
fn test_self_parent_is_broken() {
    let graph = graph_of(&[("config/services.yaml", "services:\n    loop:\n        parent: loop\n")]);
    assert!(graph.is_broken("loop"));
}

#[test]
fn test_hop_bound_is_configurable() {
    let index = index_from_sources(&[("config/services.yaml", PARENT_CHAIN_YAML)]);
    let config = AnalysisConfig::default().with_max_chain_hops(1);
    let graph = ServiceGraph::build(&index, &config, &CancellationToken::new()).unwrap();

    assert_eq!(graph.get_service_class("child"), Some("App\\Foo"));
    assert_eq!(graph.get_service_class("grandchild"), None);
}

#[test]
fn test_aliases_and_parameter_classes() {
    let graph = graph_of(&[("config/services.yaml", ALIASES_YAML)]);
    assert_eq!(graph.get_service_class("app.mailer"), Some("App\\Mailer"));
    assert_eq!(graph.get_service_class("mailer"), Some("App\\Mailer"));
    assert_eq!(graph.get_service_class("mailer.legacy"), Some("App\\Mailer"));
    assert_eq!(
        graph.get_service_class("App\\Command\\ImportCommand"),
        Some("App\\Command\\ImportCommand")
    );
    assert!(graph.is_service_class("App\\Anything\\Here"));
    assert!(!graph.is_service_class("Vendor\\Thing"));
}

#[test]
fn test_services_by_tag_across_formats() {
    let graph = graph_of(&[
        ("config/services.yaml", LISTENER_SERVICES_YAML),
        ("config/services.xml", SERVICES_XML),
    ]);
    let mut ids: Vec<&str> = graph
        .get_services_by_tag("kernel.event_listener")
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["app.listener", "app.mailer"]);
    assert!(graph.get_services_by_tag("console.command").is_empty());
}

#[test]
fn test_graph_is_built_once_per_revision() {
    let host = host_from_sources(&[("config/services.yaml", PARENT_CHAIN_YAML)]);
    let first = host.analysis().service_graph();
    let again = host.analysis().service_graph();
    assert!(std::sync::Arc::ptr_eq(&first, &again));

    // Touching an unrelated kind keeps the graph.
    host.set_file_content("base.html.twig", "{% block a %}{% endblock %}")
        .unwrap();
    let after_twig = host.analysis().service_graph();
    assert!(std::sync::Arc::ptr_eq(&first, &after_twig));

    host.set_file_content("config/more.yaml", "services:\n    extra: { class: App\\Extra }\n")
        .unwrap();
    let rebuilt = host.analysis().service_graph();
    assert!(!std::sync::Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(rebuilt.get_service_class("extra"), Some("App\\Extra"));
}

#[test]
fn test_cancelled_collection_returns_none() {
    let host = host_from_sources(&[("config/services.yaml", PARENT_CHAIN_YAML)]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(host.analysis().service_graph_cancellable(&cancel).is_none());
    // A later uncancelled request still builds.
    assert!(host.analysis().service_graph().service("child").is_some());
}
