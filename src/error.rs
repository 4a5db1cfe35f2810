//! Error types for NEXUS reading, manipulation and writing.
//!
//! This module provides [NexusError], the single error enum returned by all
//! fallible operations of this crate.

use thiserror::Error;

// =#========================================================================#=
// NEXUS ERROR
// =#========================================================================$=
/// Errors that can occur while reading or manipulating NEXUS files.
///
/// Three families of failure:
/// - [`NexusError::Io`] — the file could not be opened or read; raised
///   before any block splitting begins.
/// - [`NexusError::Format`] — the structural grammar of the file is broken
///   (duplicate blocks, taxon-count mismatch in a TAXA block, a tree
///   statement inside an unterminated translate region, ...). These are
///   hard failures: the input cannot be trusted and no reader instance is
///   produced.
/// - [`NexusError::Translate`] — a translation table is inconsistent
///   (duplicate index, duplicate name, or a detranslation pass that did not
///   account for every table entry).
///
/// Declared ntax/nchar values in a DATA block that disagree with the parsed
/// matrix are deliberately *not* errors; they emit a `tracing` warning and
/// parsing continues with the parsed values (see
/// [DataBlock](crate::blocks::DataBlock)).
#[derive(Error, Debug)]
pub enum NexusError {
    /// Underlying I/O failure while reading or writing a file.
    #[error("I/O error - {0}")]
    Io(#[from] std::io::Error),

    /// Malformed NEXUS structure.
    #[error("Invalid NEXUS format - {0}")]
    Format(String),

    /// Inconsistent translate table or failed detranslation.
    #[error("Invalid translate table - {0}")]
    Translate(String),
}

impl NexusError {
    /// Convenience constructor for [`NexusError::Format`].
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        NexusError::Format(msg.into())
    }

    /// Convenience constructor for [`NexusError::Translate`].
    pub(crate) fn translate(msg: impl Into<String>) -> Self {
        NexusError::Translate(msg.into())
    }
}
