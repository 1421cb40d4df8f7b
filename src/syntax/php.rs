//! PHP declaration trees.
//!
//! Only the shapes the extractors look at are modelled: namespace and `use`
//! imports, classes with their methods, attributes, doc-block annotations,
//! and the expressions a method returns.

use rustc_hash::FxHashMap;

use crate::base::TextRange;

/// A string literal with the range of its contents (without quotes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringLiteral {
    pub value: String,
    pub range: TextRange,
}

impl StringLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            range: TextRange::default(),
        }
    }

    pub fn at(mut self, range: TextRange) -> Self {
        self.range = range;
        self
    }
}

/// An expression, reduced to what the extractors need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpExpr {
    String(StringLiteral),
    Int(i64),
    /// `Foo::BAR` with the class name as written.
    ClassConstant { class: String, name: String },
    Array(Vec<PhpArrayItem>),
    Other,
}

impl PhpExpr {
    pub fn string(value: impl Into<String>) -> Self {
        PhpExpr::String(StringLiteral::new(value))
    }

    /// Array with positional items only.
    pub fn list(values: impl IntoIterator<Item = PhpExpr>) -> Self {
        PhpExpr::Array(
            values
                .into_iter()
                .map(|value| PhpArrayItem { key: None, value })
                .collect(),
        )
    }

    /// Array with `key => value` items.
    pub fn map(items: impl IntoIterator<Item = (PhpExpr, PhpExpr)>) -> Self {
        PhpExpr::Array(
            items
                .into_iter()
                .map(|(key, value)| PhpArrayItem {
                    key: Some(key),
                    value,
                })
                .collect(),
        )
    }

    pub fn as_string(&self) -> Option<&StringLiteral> {
        match self {
            PhpExpr::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One item of an array literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpArrayItem {
    pub key: Option<PhpExpr>,
    pub value: PhpExpr,
}

/// An attribute or doc-block annotation argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpArgument {
    /// Named-argument key, `None` for positional arguments.
    pub name: Option<String>,
    pub value: PhpExpr,
}

/// `#[Name(...)]` attribute or `@Name(...)` doc-block annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpAttribute {
    /// Name as written in source (may be short or aliased).
    pub name: String,
    pub arguments: Vec<PhpArgument>,
    pub range: TextRange,
}

impl PhpAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            range: TextRange::default(),
        }
    }

    pub fn with_positional(mut self, value: PhpExpr) -> Self {
        self.arguments.push(PhpArgument { name: None, value });
        self
    }

    pub fn with_named(mut self, name: impl Into<String>, value: PhpExpr) -> Self {
        self.arguments.push(PhpArgument {
            name: Some(name.into()),
            value,
        });
        self
    }

    /// Argument by named key, falling back to the positional index.
    pub fn argument(&self, name: &str, position: usize) -> Option<&PhpExpr> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .or_else(|| {
                self.arguments
                    .iter()
                    .filter(|a| a.name.is_none())
                    .nth(position)
            })
            .map(|a| &a.value)
    }

    /// Named argument only.
    pub fn named(&self, name: &str) -> Option<&PhpExpr> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| &a.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpParameter {
    pub name: String,
    /// Type hint as written (may be short, aliased or a union).
    pub type_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhpMethod {
    pub name: String,
    pub name_range: TextRange,
    pub visibility: Visibility,
    pub is_static: bool,
    pub parameters: Vec<PhpParameter>,
    pub attributes: Vec<PhpAttribute>,
    pub doc_annotations: Vec<PhpAttribute>,
    /// Expressions of every `return` statement in the body.
    pub returns: Vec<PhpExpr>,
}

impl PhpMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, type_hint: Option<&str>) -> Self {
        self.parameters.push(PhpParameter {
            name: name.into(),
            type_hint: type_hint.map(str::to_string),
        });
        self
    }

    pub fn with_attribute(mut self, attribute: PhpAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_doc_annotation(mut self, annotation: PhpAttribute) -> Self {
        self.doc_annotations.push(annotation);
        self
    }

    pub fn with_return(mut self, expr: PhpExpr) -> Self {
        self.returns.push(expr);
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhpClass {
    /// Short class name as declared.
    pub name: String,
    pub name_range: TextRange,
    pub is_abstract: bool,
    pub is_interface: bool,
    /// `extends` target as written.
    pub parent: Option<String>,
    /// `implements` targets (or `extends` targets of an interface) as written.
    pub interfaces: Vec<String>,
    /// `use Trait;` statements inside the class body, as written.
    pub traits: Vec<String>,
    pub attributes: Vec<PhpAttribute>,
    pub doc_annotations: Vec<PhpAttribute>,
    pub methods: Vec<PhpMethod>,
}

impl PhpClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn uses_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(name.into());
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn with_attribute(mut self, attribute: PhpAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_method(mut self, method: PhpMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// A `use Foo\Bar [as Baz];` import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpImport {
    pub fqn: String,
    pub alias: Option<String>,
}

impl PhpImport {
    /// The name the import is visible under in the file.
    pub fn visible_name(&self) -> &str {
        match self.alias {
            Some(ref alias) => alias,
            None => self.fqn.rsplit('\\').next().unwrap_or(&self.fqn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhpFile {
    pub namespace: Option<String>,
    pub imports: Vec<PhpImport>,
    pub classes: Vec<PhpClass>,
}

impl PhpFile {
    pub fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(|ns| ns.trim_matches('\\').to_string()),
            ..Self::default()
        }
    }

    pub fn with_import(mut self, fqn: &str, alias: Option<&str>) -> Self {
        self.imports.push(PhpImport {
            fqn: fqn.trim_start_matches('\\').to_string(),
            alias: alias.map(str::to_string),
        });
        self
    }

    pub fn with_class(mut self, class: PhpClass) -> Self {
        self.classes.push(class);
        self
    }

    /// Visible name → fully-qualified name for every `use` import.
    pub fn import_alias_table(&self) -> FxHashMap<String, String> {
        self.imports
            .iter()
            .map(|i| (i.visible_name().to_string(), i.fqn.clone()))
            .collect()
    }

    /// Fully-qualified name of a class declared in this file.
    pub fn qualify_declared(&self, short_name: &str) -> String {
        match self.namespace {
            Some(ref ns) if !ns.is_empty() => format!("{}\\{}", ns, short_name),
            _ => short_name.to_string(),
        }
    }
}
