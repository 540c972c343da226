use thiserror::Error;

/// Caller errors raised by [`crate::graph::BoxGraph`] mutation.
///
/// The graph is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate box id {0}")]
    DuplicateId(String),
    #[error("unknown box id {0}")]
    UnknownId(String),
    #[error("box {0} cannot be linked to itself")]
    SelfLoop(String),
}
