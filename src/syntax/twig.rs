//! Twig template trees.

use crate::base::TextRange;

/// A template name referenced by `extends`, `embed`, `use` or `include`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub name: String,
    pub range: TextRange,
}

impl TemplateRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: TextRange::default(),
        }
    }
}

/// A `{% block name %}` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwigBlockTag {
    pub name: String,
    /// Range of the block name.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TwigFile {
    /// Logical template name (e.g. `base.html.twig`) when the host knows it;
    /// the file path is used otherwise.
    pub name: Option<String>,
    pub extends: Vec<TemplateRef>,
    pub embeds: Vec<TemplateRef>,
    pub uses: Vec<TemplateRef>,
    pub includes: Vec<TemplateRef>,
    /// Blocks in source order.
    pub blocks: Vec<TwigBlockTag>,
}

impl TwigFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.extends.push(TemplateRef::new(name));
        self
    }

    pub fn embeds(mut self, name: impl Into<String>) -> Self {
        self.embeds.push(TemplateRef::new(name));
        self
    }

    pub fn uses(mut self, name: impl Into<String>) -> Self {
        self.uses.push(TemplateRef::new(name));
        self
    }

    pub fn with_block(mut self, name: impl Into<String>) -> Self {
        self.blocks.push(TwigBlockTag {
            name: name.into(),
            range: TextRange::default(),
        });
        self
    }
}
