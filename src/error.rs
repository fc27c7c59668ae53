use std::fmt;

/// Errors reported by the fallible constructors and insertions.
///
/// A failed operation never leaves a list or queue half-modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The allocator could not provide `bytes` bytes for a node or its text.
    OutOfMemory { bytes: usize },
    /// The text contains a NUL byte at `position`.
    InteriorNul { position: usize },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::OutOfMemory { bytes } => {
                write!(f, "failed to allocate {} bytes", bytes)
            }
            QueueError::InteriorNul { position } => {
                write!(f, "text contains a NUL byte at position {}", position)
            }
        }
    }
}

impl std::error::Error for QueueError {}
