//! Missing-method validation tests.

use rstest::rstest;
use xref::hir::{AnalysisConfig, MISSING_METHOD_MESSAGE, Severity, codes};
use xref::ide::AnalysisHost;
use xref::syntax::{PhpAttribute, PhpClass, PhpExpr, PhpMethod, PhpFile, SyntaxFile};

use crate::helpers::diagnostic_helpers::{
    assert_no_diagnostics, create_method_fix, diagnostics_for, text_at,
};
use crate::helpers::hir_helpers::{host_from_sources, php_class, php_file};
use crate::helpers::source_fixtures::{LISTENER_SERVICES_YAML, ROUTES_YAML, SERVICES_XML};

const LISTENER_ATTRIBUTE: &str = "Symfony\\Component\\EventDispatcher\\Attribute\\AsEventListener";
const SUBSCRIBER: &str = "Symfony\\Component\\EventDispatcher\\EventSubscriberInterface";

fn listener_host(methods: &[&str]) -> AnalysisHost {
    let host = host_from_sources(&[("config/services.yaml", LISTENER_SERVICES_YAML)]);
    host.set_file("src/Listener.php", &php_class("App", "Listener", methods));
    host
}

#[test]
fn test_missing_listener_method_is_reported() {
    let host = listener_host(&["onDeleted"]);
    let diagnostics = diagnostics_for(&host, "config/services.yaml");

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(&*diagnostic.message, MISSING_METHOD_MESSAGE);
    assert_eq!(diagnostic.code.as_deref(), Some(codes::MISSING_METHOD));
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(text_at(LISTENER_SERVICES_YAML, diagnostic.range), "onCreated");

    let fix = create_method_fix(diagnostic);
    assert_eq!(fix.class, "App\\Listener");
    assert_eq!(fix.method, "onCreated");
    assert!(fix.parameter_types.is_empty());
    assert!(fix.imports.is_empty());
    assert_eq!(fix.stub, "public function onCreated()\n{\n}\n");
    assert_eq!(fix.class_location.file, host.file_id("src/Listener.php").unwrap());
}

#[test]
fn test_fix_borrows_parameter_types_from_other_listeners() {
    let host = listener_host(&[]);
    host.set_file(
        "src/EventLog.php",
        &SyntaxFile::Php(
            PhpFile::new(Some("App"))
                .with_import("App\\Event\\Created", None)
                .with_import(LISTENER_ATTRIBUTE, None)
                .with_class(
                    PhpClass::new("EventLog").with_method(
                        PhpMethod::new("record")
                            .with_parameter("$event", Some("Created"))
                            .with_attribute(
                                PhpAttribute::new("AsEventListener")
                                    .with_positional(PhpExpr::string("app.created")),
                            ),
                    ),
                ),
        ),
    );

    let diagnostics = diagnostics_for(&host, "config/services.yaml");
    assert_eq!(diagnostics.len(), 1);
    let fix = create_method_fix(&diagnostics[0]);
    assert_eq!(fix.parameter_types, vec!["App\\Event\\Created".to_string()]);
    assert_eq!(fix.imports, vec!["App\\Event\\Created".to_string()]);
    assert_eq!(fix.stub, "public function onCreated(Created $event)\n{\n}\n");
}

#[rstest]
#[case::declared(&["onCreated"])]
#[case::different_case(&["ONCREATED"])]
fn test_existing_method_is_clean(#[case] methods: &[&str]) {
    let host = listener_host(methods);
    assert_no_diagnostics(&host, "config/services.yaml");
}

#[test]
fn test_inherited_method_is_clean() {
    let host = host_from_sources(&[("config/services.yaml", LISTENER_SERVICES_YAML)]);
    host.set_file("src/Base.php", &php_class("App", "BaseListener", &["onCreated"]));
    host.set_file(
        "src/Listener.php",
        &php_file("App", PhpClass::new("Listener").extends("BaseListener")),
    );
    assert_no_diagnostics(&host, "config/services.yaml");
}

#[test]
fn test_unindexed_ancestor_is_not_reported() {
    let host = host_from_sources(&[("config/services.yaml", LISTENER_SERVICES_YAML)]);
    host.set_file(
        "src/Listener.php",
        &php_file("App", PhpClass::new("Listener").extends("\\Vendor\\BaseListener")),
    );
    assert_no_diagnostics(&host, "config/services.yaml");
}

#[test]
fn test_unknown_class_is_not_reported() {
    let host = host_from_sources(&[("config/services.yaml", LISTENER_SERVICES_YAML)]);
    assert_no_diagnostics(&host, "config/services.yaml");
}

fn subscriber_class(implements: bool) -> SyntaxFile {
    let mut class = PhpClass::new("Subscriber").with_method(
        PhpMethod::new("getSubscribedEvents")
            .as_static()
            .with_return(PhpExpr::map([(
                PhpExpr::string("app.created"),
                PhpExpr::string("onMissing"),
            )])),
    );
    if implements {
        class = class.implements(format!("\\{}", SUBSCRIBER));
    }
    php_file("App", class)
}

#[rstest]
#[case::subscriber(true, 1)]
#[case::plain_class(false, 0)]
fn test_subscribed_events_require_subscriber(#[case] implements: bool, #[case] expected: usize) {
    let host = AnalysisHost::new();
    host.set_file("src/Subscriber.php", &subscriber_class(implements));
    let diagnostics = diagnostics_for(&host, "src/Subscriber.php");
    assert_eq!(diagnostics.len(), expected);
    if let Some(diagnostic) = diagnostics.first() {
        assert_eq!(create_method_fix(diagnostic).method, "onMissing");
    }
}

#[test]
fn test_xml_call_and_tag_are_checked() {
    let host = host_from_sources(&[("config/services.xml", SERVICES_XML)]);
    host.set_file("src/Mailer.php", &php_class("App", "Mailer", &["setLogger"]));

    let diagnostics = diagnostics_for(&host, "config/services.xml");
    let texts: Vec<&str> = diagnostics
        .iter()
        .map(|d| text_at(SERVICES_XML, d.range))
        .collect();
    assert_eq!(texts, vec!["onMailCreated"]);
}

#[test]
fn test_route_controller_method_is_checked() {
    let host = host_from_sources(&[("config/routes.yaml", ROUTES_YAML)]);
    host.set_file(
        "src/Controller/BlogController.php",
        &php_class("App\\Controller", "BlogController", &["index"]),
    );

    let diagnostics = diagnostics_for(&host, "config/routes.yaml");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(text_at(ROUTES_YAML, diagnostics[0].range), "show");
    assert_eq!(create_method_fix(&diagnostics[0]).class, "App\\Controller\\BlogController");
}

#[test]
fn test_custom_listener_tag() {
    let yaml = LISTENER_SERVICES_YAML.replace("kernel.event_listener", "app.listener_tag");
    let host = AnalysisHost::with_config(
        AnalysisConfig::default().with_event_listener_tag("app.listener_tag"),
    );
    host.set_file_content("config/services.yaml", &yaml).unwrap();
    host.set_file("src/Listener.php", &php_class("App", "Listener", &[]));

    let diagnostics = diagnostics_for(&host, "config/services.yaml");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(create_method_fix(&diagnostics[0]).method, "onCreated");
}
