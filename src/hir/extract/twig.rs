//! Twig templates.

use crate::syntax::{TemplateRef, TwigFile};

use super::super::declarations::{
    Declaration, TemplateBlockDeclaration, TemplateDeclaration, TemplateLink,
};
use super::Extraction;

pub(super) fn extract(out: &mut Extraction, path: &str, twig: &TwigFile) {
    let template = twig
        .name
        .as_deref()
        .and_then(crate::syntax::non_blank)
        .unwrap_or(path)
        .to_string();
    let has_parent_template = !twig.extends.is_empty() || !twig.uses.is_empty();

    for block in &twig.blocks {
        if block.name.trim().is_empty() {
            continue;
        }
        let location = out.range(block.range);
        out.push_arc(
            Declaration::Block,
            TemplateBlockDeclaration {
                name: block.name.trim().to_string(),
                template_path: template.clone(),
                location,
                has_parent_template,
            },
        );
    }

    let links = |refs: &[TemplateRef]| -> Vec<TemplateLink> {
        refs.iter()
            .filter(|r| !r.name.trim().is_empty())
            .map(|r| TemplateLink {
                name: r.name.trim().to_string(),
                location: out.range(r.range),
            })
            .collect()
    };
    let declaration = TemplateDeclaration {
        extends: links(&twig.extends),
        embeds: links(&twig.embeds),
        uses: links(&twig.uses),
        includes: links(&twig.includes),
        location: out.range(Default::default()),
        path: template,
    };
    out.push_arc(Declaration::Template, declaration);
}
