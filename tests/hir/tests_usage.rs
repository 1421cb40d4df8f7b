//! Implicit usage tests.

use rstest::rstest;
use xref::syntax::{PhpAttribute, PhpClass, PhpExpr, PhpFile, PhpMethod, SyntaxFile, Visibility};

use crate::helpers::hir_helpers::{host_from_sources, php_class, php_file};
use crate::helpers::source_fixtures::{ALIASES_YAML, LISTENER_SERVICES_YAML, ROUTES_YAML};

const LEGACY_SERVICES_YAML: &str = r#"services:
    app.legacy_controller:
        class: App\Controller\LegacyController
"#;

fn annotated_controller() -> SyntaxFile {
    SyntaxFile::Php(
        PhpFile::new(Some("App\\Controller"))
            .with_import("Symfony\\Component\\Routing\\Annotation\\Route", None)
            .with_class(
                PhpClass::new("PageController")
                    .with_method(PhpMethod::new("about").with_doc_annotation(
                        PhpAttribute::new("@Route").with_positional(PhpExpr::string("/about")),
                    ))
                    .with_method(
                        PhpMethod::new("secret")
                            .with_visibility(Visibility::Private)
                            .with_doc_annotation(PhpAttribute::new("@Route")),
                    )
                    .with_method(PhpMethod::new("helper")),
            ),
    )
}

#[rstest]
#[case::doc_annotation("about", true)]
#[case::private_method("secret", false)]
#[case::plain_method("helper", false)]
#[case::undeclared("missing", false)]
fn test_annotated_routes(#[case] method: &str, #[case] used: bool) {
    let host = host_from_sources(&[]);
    host.set_file("src/Controller/PageController.php", &annotated_controller());
    let analysis = host.analysis();
    assert_eq!(
        analysis.is_method_implicitly_used("App\\Controller\\PageController", method),
        used
    );
}

#[rstest]
#[case::controller_key("index", true)]
#[case::defaults_controller("show", true)]
#[case::case_insensitive("SHOW", true)]
#[case::not_routed("edit", false)]
fn test_routing_file_controllers(#[case] method: &str, #[case] used: bool) {
    let host = host_from_sources(&[("config/routes.yaml", ROUTES_YAML)]);
    host.set_file(
        "src/Controller/BlogController.php",
        &php_class("App\\Controller", "BlogController", &["index", "show", "edit"]),
    );
    let analysis = host.analysis();
    assert_eq!(
        analysis.is_method_implicitly_used("App\\Controller\\BlogController", method),
        used
    );
}

#[test]
fn test_service_id_controller() {
    let host = host_from_sources(&[
        ("config/routes.yaml", ROUTES_YAML),
        ("config/services.yaml", LEGACY_SERVICES_YAML),
    ]);
    host.set_file(
        "src/Controller/LegacyController.php",
        &php_class("App\\Controller", "LegacyController", &["run", "stop"]),
    );
    let analysis = host.analysis();
    assert!(analysis.is_method_implicitly_used("App\\Controller\\LegacyController", "run"));
    assert!(!analysis.is_method_implicitly_used("App\\Controller\\LegacyController", "stop"));
    assert!(analysis.is_class_implicitly_used("App\\Controller\\LegacyController"));
}

#[test]
fn test_tagged_listener_method() {
    let host = host_from_sources(&[("config/services.yaml", LISTENER_SERVICES_YAML)]);
    host.set_file("src/Listener.php", &php_class("App", "Listener", &["onCreated", "reset"]));
    let analysis = host.analysis();
    assert!(analysis.is_method_implicitly_used("App\\Listener", "onCreated"));
    assert!(!analysis.is_method_implicitly_used("App\\Listener", "reset"));
    assert!(analysis.is_class_implicitly_used("App\\Listener"));
}

#[test]
fn test_listener_inherited_by_subclass_owner() {
    let host = host_from_sources(&[("config/services.yaml", LISTENER_SERVICES_YAML)]);
    host.set_file("src/Base.php", &php_class("App", "BaseListener", &["onCreated"]));
    host.set_file(
        "src/Listener.php",
        &php_file("App", PhpClass::new("Listener").extends("BaseListener")),
    );
    let analysis = host.analysis();
    assert!(analysis.is_method_implicitly_used("App\\BaseListener", "onCreated"));
}

#[rstest]
#[case::registered_command("App\\Command\\ImportCommand", true)]
#[case::unregistered_command("Other\\ExportCommand", false)]
fn test_command_classes(#[case] fqn: &str, #[case] used: bool) {
    let host = host_from_sources(&[("config/services.yaml", ALIASES_YAML)]);
    let (namespace, name) = fqn.rsplit_once('\\').unwrap();
    host.set_file(
        &format!("src/{}.php", name),
        &php_file(
            namespace,
            PhpClass::new(name).extends("\\Symfony\\Component\\Console\\Command\\Command"),
        ),
    );
    assert_eq!(host.analysis().is_class_implicitly_used(fqn), used);
}

#[test]
fn test_unknown_class_is_unused() {
    let host = host_from_sources(&[("config/routes.yaml", ROUTES_YAML)]);
    let analysis = host.analysis();
    assert!(!analysis.is_class_implicitly_used("App\\Controller\\BlogController"));
    assert!(!analysis.is_method_implicitly_used("App\\Controller\\BlogController", "index"));
}
