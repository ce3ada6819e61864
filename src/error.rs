use crate::ast::TypeName;

/// Errors raised while converting between markdown and the document tree.
///
/// `NoSpecification` and `NoRenderer` mean the factory table or the render
/// registry does not cover the grammar in use. They abort the whole call.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("no factory specification for markup kind `{kind}`")]
    NoSpecification { kind: String },

    #[error("no renderer registered for `{type_name}`")]
    NoRenderer { type_name: TypeName },

    #[error("markup renderer produced no content")]
    NoContent,

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl ConvertError {
    pub(crate) fn no_specification(kind: &str) -> Self {
        tracing::error!(kind, "markup kind has no factory specification");
        ConvertError::NoSpecification {
            kind: kind.to_string(),
        }
    }

    pub(crate) fn no_renderer(type_name: TypeName) -> Self {
        tracing::error!(%type_name, "document type has no renderer");
        ConvertError::NoRenderer { type_name }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
