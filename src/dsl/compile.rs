//! Document assembly — renders every root and injects component assets.
//!
//! Rendering and asset collection are two separate passes. Rendering sees
//! the tree after child filtering; asset collection walks the raw parsed
//! forest, so a child dropped by its parent's `allow_children` still
//! contributes its stylesheet and script.

use crate::diagnostics::{Diagnostics, Warning};
use crate::registry::Registry;

use super::ast::Element;
use super::error::CompileError;
use super::placeholder::expand_script;
use super::render::Renderer;

/// Marker after which the style block is inserted.
pub const HEAD_OPEN: &str = "<head>";
/// Marker before which the script block is inserted.
pub const BODY_CLOSE: &str = "</body>";

/// The result of compiling one source document.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    pub html: String,
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Stylesheets and scripts of the components present in a forest,
/// deduplicated, in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assets {
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
}

impl Assets {
    fn push_stylesheet(&mut self, css: &str) {
        let css = css.trim();
        if !css.is_empty() && !self.stylesheets.iter().any(|s| s == css) {
            self.stylesheets.push(css.to_string());
        }
    }

    fn push_script(&mut self, script: String) {
        let script = script.trim();
        if !script.is_empty() && !self.scripts.iter().any(|s| s == script) {
            self.scripts.push(script.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stylesheets.is_empty() && self.scripts.is_empty()
    }
}

/// Compile a parsed forest into a document.
pub fn compile_document(
    elements: &[Element],
    registry: &Registry,
) -> Result<CompiledDocument, CompileError> {
    let mut diagnostics = Diagnostics::new();
    let mut roots = Vec::with_capacity(elements.len());
    {
        let mut renderer = Renderer::new(registry, &mut diagnostics);
        for element in elements {
            roots.push(renderer.render(element, 0)?);
        }
    }

    let assets = collect_assets(elements, registry);
    let html = inject_assets(format!("{}\n", roots.join("\n")), &assets);

    Ok(CompiledDocument {
        html,
        stylesheets: assets.stylesheets,
        scripts: assets.scripts,
        warnings: diagnostics.into_warnings(),
    })
}

/// Walk the raw forest and gather default stylesheets and per-instance
/// script expansions.
pub fn collect_assets(elements: &[Element], registry: &Registry) -> Assets {
    let mut assets = Assets::default();
    for root in elements {
        root.walk(&mut |element| {
            let Some(descriptor) = registry.get(&element.name) else {
                return;
            };
            assets.push_stylesheet(&descriptor.default_css);
            if !descriptor.default_script.is_empty() {
                assets.push_script(expand_script(&descriptor.default_script, &element.data));
            }
        });
    }
    assets
}

/// Insert the style block after the first `<head>` (or prepend it) and the
/// script block before the first `</body>` (or append it).
pub fn inject_assets(mut html: String, assets: &Assets) -> String {
    if !assets.stylesheets.is_empty() {
        let block = format!("<style>\n{}\n</style>\n", assets.stylesheets.join("\n"));
        match html.find(HEAD_OPEN) {
            Some(at) => html.insert_str(at + HEAD_OPEN.len(), &format!("\n{block}")),
            None => html.insert_str(0, &block),
        }
    }

    if !assets.scripts.is_empty() {
        let block = format!("<script>\n{}\n</script>\n", assets.scripts.join("\n"));
        match html.find(BODY_CLOSE) {
            Some(at) => html.insert_str(at, &block),
            None => html.push_str(&block),
        }
    }

    html
}
