//! Markdown ↔ structured document conversion that keeps the author's
//! formatting.
//!
//! ```text
//! source ──MarkupRenderer──▶ MarkupNode ──build──▶ Document
//! Document (+ pristine Document) ──serialize──▶ source
//! ```
//!
//! Nodes that were not edited since parsing are written back exactly as they
//! appeared in the source; edited nodes are re-serialized, reusing the
//! original list markers and emphasis delimiters where they can be sniffed.

pub mod ast;
pub mod config;
pub mod error;
pub mod markup;
pub mod text;

pub use ast::{
    Attrs, ChangeTracker, Document, FactorySpec, FactorySpecs, Mark, MarkType, Node, NodeType,
    Renderers, TypeName, build,
};
pub use crate::config::{Loader, Settings};
pub use error::{ConvertError, Result};
pub use markup::{CmarkRenderer, MarkupNode, MarkupRenderer};

/// Render `source` with `renderer` and build the document from the tree.
pub fn parse_document(
    source: &str,
    renderer: &dyn MarkupRenderer,
    specs: &FactorySpecs,
) -> Result<Document> {
    let tree = renderer.render(source)?;
    let doc = build(&tree, specs, source)?;
    tracing::debug!(blocks = doc.blocks().len(), "parsed document");
    Ok(doc)
}

/// Serialize `doc`, replaying source text for everything unchanged relative
/// to `pristine`.
pub fn serialize(
    doc: &Document,
    pristine: Option<&Document>,
    renderers: &Renderers,
    options: &crate::config::SerializerOptions,
) -> Result<String> {
    ast::serialize(doc, pristine, renderers, options)
}

/// Parse and serialize with the default tables, replaying unchanged source.
pub fn roundtrip(source: &str) -> Result<String> {
    let doc = parse_document(source, &CmarkRenderer::new(), &FactorySpecs::default())?;
    serialize(&doc, Some(&doc), &Renderers::default(), &Default::default())
}
