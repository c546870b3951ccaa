use crate::{convert::ConvertError, node::CriteriaError};
use thiserror::Error;

/// Top-level error for operations that can fail in more than one layer.
#[derive(Debug, PartialEq, Error)]
pub enum TreeError {
    #[error("failed to convert the matching rules with {0:?}")]
    Convert(#[from] ConvertError),
    #[error("failed with {0:?}")]
    Criteria(#[from] CriteriaError),
}
