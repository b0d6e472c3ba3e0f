use derive_more::{Display, Error};
use scythe_daw::DawError;

/// Why a tool call didn't succeed.
///
/// Everything except [`ToolError::UnknownTool`] ends up as error result shown to the model.
#[derive(Clone, PartialEq, Debug, Display, Error)]
pub enum ToolError {
    /// The request doesn't make sense, e.g. an index out of range. The message is shown as is.
    #[display(fmt = "{}", message)]
    Invalid { message: String },
    /// The DAW failed while the tool was running.
    #[display(fmt = "{}", source)]
    Daw { source: DawError },
    /// Like [`ToolError::Daw`] but enriched with what the tool was trying to do.
    #[display(fmt = "Failed to {}: {}", context, source)]
    Failed {
        context: &'static str,
        source: DawError,
    },
    #[display(fmt = "Failed to {}: internal error", context)]
    Panicked { context: &'static str },
    #[display(fmt = "Unknown tool: {}", name)]
    UnknownTool { name: String },
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::Invalid {
            message: message.into(),
        }
    }

    /// Attaches the failure context of a tool to a bare DAW error.
    pub(crate) fn in_context(self, context: &'static str) -> Self {
        match self {
            ToolError::Daw { source } => ToolError::Failed { context, source },
            e => e,
        }
    }
}

impl From<DawError> for ToolError {
    fn from(source: DawError) -> Self {
        ToolError::Daw { source }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
