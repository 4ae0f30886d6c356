// ---------------------------------------------------------------------------
// DispatchError: typed failures for batch input and ledger operations
// ---------------------------------------------------------------------------

use crate::resource_type::ResourceType;
use crate::road_graph::Location;

/// Errors produced while reading a dispatch batch or mutating the ledger.
///
/// "No unit reachable" is not an error; it is a normal
/// [`DispatchOutcome`](crate::resolver::DispatchOutcome).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Road, inventory or request data failed structural or numeric validation.
    /// `line` is 1-based; `None` when the input had no line structure (JSON).
    #[error("Malformed input{}: {reason}", line_suffix(.line))]
    MalformedInput { line: Option<usize>, reason: String },
    /// A type code that the active [`TypeCodeTable`](crate::resource_type::TypeCodeTable)
    /// does not know.
    #[error("Unknown resource type code {code:?}{}", line_suffix(.line))]
    UnknownTypeCode { line: Option<usize>, code: String },
    /// `decrement` was called on a location holding no unit of the type.
    #[error("No {resource} unit left at location {location} to dispatch")]
    InsufficientInventory {
        location: Location,
        resource: ResourceType,
    },
    /// I/O error while reading an input or parameter file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON batch or parameter document could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DispatchError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        DispatchError::MalformedInput {
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// True for every variant that means "the batch itself is bad".
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DispatchError::MalformedInput { .. }
                | DispatchError::UnknownTypeCode { .. }
                | DispatchError::Json(_)
        )
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" at line {n}"),
        None => String::new(),
    }
}
