//! Extraction tests over real source text.

use rstest::rstest;
use xref::base::FileId;
use xref::hir::{DeclKind, SiteOrigin, SubscriptionOrigin};
use xref::syntax::{PhpClass, PhpExpr, PhpFile, PhpMethod, SyntaxFile};

use crate::helpers::diagnostic_helpers::text_at;
use crate::helpers::hir_helpers::{index_from_sources, index_from_trees};

fn service_yaml(body: &str) -> String {
    format!("services:\n    app.listener:\n        class: App\\Listener\n{}", body)
}

// =============================================================================
// YAML METHOD SITES
// =============================================================================

#[rstest]
#[case("        tags:\n            - { name: kernel.event_listener, event: app.created, method: onCreated }\n", &["onCreated"])]
#[case("        tags:\n            - { name: kernel.event_listener, event: app.created, method: '  ' }\n", &[])]
#[case("        tags:\n            - kernel.event_listener\n", &[])]
#[case("        tags:\n            - kernel.event_listener: { event: app.created, method: onNamed }\n", &["onNamed"])]
#[case("        calls:\n            - [setLogger, ['@logger']]\n", &["setLogger"])]
#[case("        calls:\n            - { method: setMailer }\n", &["setMailer"])]
#[case("        calls:\n            - setCache: ['@cache']\n", &["setCache"])]
fn test_yaml_method_sites(#[case] body: &str, #[case] expected: &[&str]) {
    let source = service_yaml(body);
    let index = index_from_sources(&[("config/services.yaml", &source)]);
    let sites = index.sites_in_file(FileId::new(0));

    let methods: Vec<&str> = sites.iter().map(|s| s.method.as_str()).collect();
    assert_eq!(methods, expected);
    for site in sites {
        assert_eq!(text_at(&source, site.range.range), site.method);
    }
}

#[test]
fn test_yaml_tag_site_carries_event() {
    let source = service_yaml(
        "        tags:\n            - { name: kernel.event_listener, event: app.created, method: onCreated }\n        calls:\n            - [setLogger, []]\n",
    );
    let index = index_from_sources(&[("config/services.yaml", &source)]);
    let sites = index.sites_in_file(FileId::new(0));

    assert_eq!(sites[0].origin, SiteOrigin::YamlTag);
    assert_eq!(sites[0].event.as_deref(), Some("app.created"));
    assert_eq!(sites[1].origin, SiteOrigin::YamlCall);
    assert_eq!(sites[1].event, None);
}

#[test]
fn test_yaml_blank_values_are_absent() {
    let index = index_from_sources(&[(
        "config/services.yaml",
        "services:\n    app.blank:\n        class: '   '\n        parent: ''\n",
    )]);
    let service = index.lookup(DeclKind::Service, "app.blank").unwrap();
    let service = service.as_service().unwrap();
    assert_eq!(service.class, None);
    assert_eq!(service.parent_id, None);
}

// =============================================================================
// XML
// =============================================================================

#[test]
fn test_xml_prototype_excludes_are_merged() {
    let source = r#"<container>
    <services>
        <prototype namespace="App\" resource="../src/" exclude="../src/Kernel.php">
            <exclude>../src/Entity/</exclude>
            <exclude>  </exclude>
            <exclude>../src/Kernel.php</exclude>
        </prototype>
    </services>
</container>"#;
    let index = index_from_sources(&[("config/services.xml", source)]);
    let decls = index.declarations_of_kind(DeclKind::Service);
    let prototype = decls[0].as_service().unwrap().prototype.clone().unwrap();

    let excludes: Vec<&str> = prototype.exclude.iter().map(String::as_str).collect();
    assert_eq!(excludes, vec!["../src/Entity/", "../src/Kernel.php"]);
}

#[test]
fn test_xml_call_and_tag_sites() {
    let source = crate::helpers::source_fixtures::SERVICES_XML;
    let index = index_from_sources(&[("config/services.xml", source)]);
    let sites = index.sites_in_file(FileId::new(0));

    let found: Vec<(SiteOrigin, &str)> = sites
        .iter()
        .map(|s| (s.origin, text_at(source, s.range.range)))
        .collect();
    assert!(found.contains(&(SiteOrigin::XmlCall, "setLogger")));
    assert!(found.contains(&(SiteOrigin::XmlTag, "onMailCreated")));
}

// =============================================================================
// PHP SUBSCRIBED EVENTS
// =============================================================================

#[rstest]
#[case(PhpExpr::string("onCreated"), &[("onCreated", 0)])]
#[case(PhpExpr::list([PhpExpr::string("onCreated"), PhpExpr::Int(10)]), &[("onCreated", 10)])]
#[case(
    PhpExpr::list([
        PhpExpr::list([PhpExpr::string("first"), PhpExpr::Int(5)]),
        PhpExpr::list([PhpExpr::string("second")]),
    ]),
    &[("first", 5), ("second", 0)]
)]
fn test_subscribed_events_forms(#[case] value: PhpExpr, #[case] expected: &[(&str, i64)]) {
    let class = PhpClass::new("Subscriber").with_method(
        PhpMethod::new("getSubscribedEvents")
            .as_static()
            .with_return(PhpExpr::map([(PhpExpr::string("app.created"), value)])),
    );
    let index = index_from_trees(vec![(
        "src/Subscriber.php",
        SyntaxFile::Php(PhpFile::new(Some("App")).with_class(class)),
    )]);

    let subscriptions: Vec<(String, i64)> = index
        .query(DeclKind::EventSubscription, "app.created")
        .iter()
        .filter_map(|d| match d {
            xref::hir::Declaration::Event(e) => {
                assert_eq!(e.origin, SubscriptionOrigin::InterfaceImplemented);
                assert_eq!(e.owning_class, "App\\Subscriber");
                Some((e.method_name.clone(), e.priority))
            }
            _ => None,
        })
        .collect();
    let expected: Vec<(String, i64)> = expected.iter().map(|(m, p)| (m.to_string(), *p)).collect();
    assert_eq!(subscriptions, expected);
}

#[test]
fn test_class_constant_event_keys() {
    let class = PhpClass::new("Subscriber").with_method(
        PhpMethod::new("getSubscribedEvents").as_static().with_return(PhpExpr::map([(
            PhpExpr::ClassConstant {
                class: "KernelEvents".to_string(),
                name: "REQUEST".to_string(),
            },
            PhpExpr::string("onRequest"),
        )])),
    );
    let index = index_from_trees(vec![(
        "src/Subscriber.php",
        SyntaxFile::Php(
            PhpFile::new(Some("App"))
                .with_import("Symfony\\Component\\HttpKernel\\KernelEvents", None)
                .with_class(class),
        ),
    )]);

    let found = index.query(
        DeclKind::EventSubscription,
        "Symfony\\Component\\HttpKernel\\KernelEvents::REQUEST",
    );
    assert_eq!(found.len(), 1);
}
