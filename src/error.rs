//! Error types for the caller-facing validation edge.
//!
//! The core pipeline itself is total over well-typed input: extraction of
//! unrecognized text yields an empty list and missing gate context is
//! permissive. Errors exist only where callers opt into validation
//! (`Squad::validate`) or decode persisted records.

use thiserror::Error;

/// Errors surfaced by squad validation and persisted-record decoding.
///
/// # Examples
///
/// ```rust
/// use squadstat::SquadError;
///
/// let err = SquadError::DuplicateUnit { id: "u1".to_string() };
/// assert!(err.to_string().contains("u1"));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SquadError {
    /// The same unit id occupies more than one squad slot.
    #[error("duplicate unit in squad: {id}")]
    DuplicateUnit { id: String },

    /// A slot index outside the fixed squad size was addressed.
    #[error("squad slot {slot} out of range (squad holds {size} slots)")]
    SlotOutOfRange { slot: usize, size: usize },

    /// A persisted unit record could not be decoded.
    #[error("malformed saved unit: {0}")]
    Persistence(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SquadError::SlotOutOfRange { slot: 9, size: 8 };
        let text = err.to_string();
        assert!(text.contains('9'));
        assert!(text.contains('8'));
    }
}
