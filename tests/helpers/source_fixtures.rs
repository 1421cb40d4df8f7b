//! Common source text fixtures for tests.

/// The listener service whose `onCreated` method is checked.
pub const LISTENER_SERVICES_YAML: &str = r#"services:
    app.listener:
        class: App\Listener
        tags:
            - { name: kernel.event_listener, event: app.created, method: onCreated }
"#;

pub const PARENT_CHAIN_YAML: &str = r#"services:
    serviceA:
        class: '\App\Foo'
    child:
        parent: serviceA
    grandchild:
        parent: child
"#;

pub const PARENT_CYCLE_YAML: &str = r#"services:
    a:
        parent: b
    b:
        parent: c
    c:
        parent: a
    ok:
        class: App\Ok
"#;

pub const ALIASES_YAML: &str = r#"parameters:
    mailer.class: App\Mailer

services:
    app.mailer:
        class: '%mailer.class%'
    mailer: '@app.mailer'
    mailer.legacy:
        alias: mailer
    App\Command\ImportCommand: ~
    App\:
        resource: '../src/'
        exclude: '../src/{Entity,Kernel.php}'
"#;

pub const SERVICES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container xmlns="http://symfony.com/schema/dic/services">
    <services>
        <service id="app.mailer" class="App\Mailer">
            <call method="setLogger"/>
            <tag name="kernel.event_listener" event="app.created" method="onMailCreated"/>
        </service>
    </services>
</container>
"#;

pub const ROUTES_YAML: &str = r#"blog_index:
    path: /blog
    controller: App\Controller\BlogController::index
blog_show:
    path: /blog/{slug}
    defaults:
        _controller: App\Controller\BlogController::show
legacy:
    path: /legacy
    controller: app.legacy_controller:run
"#;

pub const BASE_TWIG: &str = r#"<html>
<head>{% block title %}Site{% endblock %}</head>
<body>{% block content %}{% endblock %}</body>
</html>
"#;

pub const CHILD_TWIG: &str = r#"{% extends 'base.html.twig' %}
{% block content %}Hello{% endblock %}
"#;
