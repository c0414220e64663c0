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
    /// header and every keyed archive in the scene
    #[error(transparent)]
    Archive(#[from] dava_ka::Error),

    /// The descriptor declared a size too small to hold its own fields
    #[error("descriptor size {size} is smaller than 8 at offset {offset:#x}")]
    InvalidDescriptorSize {
        /// The declared size
        size: u32,
        /// Offset of the size field
        offset: u64,
    },
}

impl Error {
    /// The byte offset at which the error was detected, when known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Archive(error) => error.offset(),
            Error::InvalidDescriptorSize { offset, .. } => Some(*offset),
            Error::IOError(_) => None,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
