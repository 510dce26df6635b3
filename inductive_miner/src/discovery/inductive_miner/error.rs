use crate::event_log::import_uvcl::UVCLImportError;

/// Error type of the Inductive Miner
#[derive(Debug)]
pub enum InductiveMinerError {
    /// The input log is not a valid compressed log
    MalformedInput(UVCLImportError),
    /// Unknown variant identifier
    UnsupportedVariant(String),
    /// An option is outside of its domain
    InvalidOption {
        /// Name of the option
        name: String,
        /// Offending value
        value: String,
    },
    /// A cut or projection broke an internal invariant (this is a bug)
    InternalInvariant(String),
    /// The recursion exceeded the configured maximal depth
    ResourceExhausted {
        /// Depth at which discovery was aborted
        depth: usize,
    },
}

impl std::fmt::Display for InductiveMinerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InductiveMinerError::MalformedInput(e) => write!(f, "Malformed input: {}", e),
            InductiveMinerError::UnsupportedVariant(v) => write!(f, "Unsupported variant: {}", v),
            InductiveMinerError::InvalidOption { name, value } => {
                write!(f, "Invalid value for option {}: {}", name, value)
            }
            InductiveMinerError::InternalInvariant(s) => write!(f, "Internal invariant: {}", s),
            InductiveMinerError::ResourceExhausted { depth } => {
                write!(f, "Maximal recursion depth exceeded at depth {}", depth)
            }
        }
    }
}

impl std::error::Error for InductiveMinerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InductiveMinerError::MalformedInput(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UVCLImportError> for InductiveMinerError {
    fn from(e: UVCLImportError) -> Self {
        InductiveMinerError::MalformedInput(e)
    }
}
