//! The structured document model and the conversions into and out of it.

pub mod attrs;
pub mod factory;
pub mod node;
pub mod parse;
pub mod schema;
pub mod tracker;
pub mod writer;

pub use attrs::{Attrs, SOURCE_MAP_KEY, SOURCE_MARKDOWN};
pub use factory::{FactorySpec, FactorySpecs, Role};
pub use node::{Document, Mark, Node};
pub use parse::build;
pub use schema::{Content, MarkType, NodeType, TypeName};
pub use tracker::ChangeTracker;
pub use writer::{
    Delimiters, NodeRenderer, RenderContext, Renderers, Serializer, serialize,
    should_render_as_markdown_table,
};
