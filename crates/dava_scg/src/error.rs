//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`dava_ka::Error`], covering the container
    /// header and every keyed archive node
    #[error(transparent)]
    Archive(#[from] dava_ka::Error),

    /// A blob is not the size its header fields describe
    #[error("{field} holds {actual} bytes but {expected} were expected, node at offset {offset:#x}")]
    SizeMismatch {
        /// The blob field
        field: &'static str,
        /// Size implied by the count and layout fields
        expected: u64,
        /// Size of the blob
        actual: u64,
        /// Offset of the node the blob belongs to
        offset: u64,
    },

    /// Vertex data uses a packing other than `NONE`
    #[error("unsupported vertex packing {packing}, node at offset {offset:#x}")]
    UnsupportedPacking {
        /// The raw packing value
        packing: u32,
        /// Offset of the node
        offset: u64,
    },

    /// The primitive type selector is not one this library can assemble
    #[error("unsupported primitive type {primitive_type}, node at offset {offset:#x}")]
    UnsupportedPrimitiveType {
        /// The raw selector
        primitive_type: u32,
        /// Offset of the node
        offset: u64,
    },

    /// The index format selector is neither 16 nor 32 bit
    #[error("unsupported index format {format}, node at offset {offset:#x}")]
    UnsupportedIndexFormat {
        /// The raw selector
        format: u32,
        /// Offset of the node
        offset: u64,
    },

    /// A polygon group lacks a required field
    #[error("polygon group is missing {field:?}, node at offset {offset:#x}")]
    MissingField {
        field: &'static str,
        offset: u64,
    },

    /// A polygon group field holds a value of the wrong type or range
    #[error("polygon group field {field:?} has an invalid value, node at offset {offset:#x}")]
    InvalidField {
        field: &'static str,
        offset: u64,
    },

    /// A node is not a polygon group and foreign nodes are not skipped
    #[error("node {name:?} at offset {offset:#x} is not a polygon group")]
    ForeignNode {
        /// The `##name` of the node, empty when it has none
        name: String,
        offset: u64,
    },
}

impl Error {
    /// The byte offset at which the error was detected, when known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Archive(error) => error.offset(),
            Error::SizeMismatch { offset, .. }
            | Error::UnsupportedPacking { offset, .. }
            | Error::UnsupportedPrimitiveType { offset, .. }
            | Error::UnsupportedIndexFormat { offset, .. }
            | Error::MissingField { offset, .. }
            | Error::InvalidField { offset, .. }
            | Error::ForeignNode { offset, .. } => Some(*offset),
            Error::IOError(_) => None,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
