//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// The magic bytes at the start of a container did not match
    #[error("expected magic {expected:?} at offset {offset:#x}")]
    MagicMismatch {
        /// The magic the container should start with
        expected: &'static str,
        /// Offset of the first magic byte
        offset: u64,
    },

    /// The archive declared a version this library does not know
    #[error("unsupported keyed archive version {version} at offset {offset:#x}")]
    UnsupportedVersion {
        /// The declared version
        version: u16,
        /// Offset of the version field
        offset: u64,
    },

    /// A value was prefixed by an unknown type tag
    #[error("unknown type tag {tag} at offset {offset:#x}")]
    UnknownTag {
        /// The raw tag byte
        tag: u8,
        /// Offset of the tag byte
        offset: u64,
    },

    /// A read went past the end of the source
    #[error("input truncated at offset {offset:#x}")]
    TruncatedInput {
        /// Offset at which the read started
        offset: u64,
    },

    /// An inline string did not hold valid UTF-8
    #[error("invalid utf-8 string at offset {offset:#x}")]
    InvalidString {
        /// Offset of the string data
        offset: u64,
        /// Underlying decoding failure
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Arrays or nested archives were nested deeper than the decoder allows
    #[error("values nested deeper than {limit} levels at offset {offset:#x}")]
    NestingTooDeep {
        /// The nesting limit
        limit: u32,
        /// Offset of the tag that would open one level too many
        offset: u64,
    },

    /// A deferred string reference had no entry in the string table
    #[error("unresolved string reference {index} read at offset {offset:#x}")]
    UnresolvedStringReference {
        /// The string table index
        index: u32,
        /// Offset the index was read from
        offset: u64,
    },
}

impl Error {
    /// The byte offset at which the error was detected, when known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::MagicMismatch { offset, .. }
            | Error::UnsupportedVersion { offset, .. }
            | Error::UnknownTag { offset, .. }
            | Error::TruncatedInput { offset }
            | Error::InvalidString { offset, .. }
            | Error::NestingTooDeep { offset, .. }
            | Error::UnresolvedStringReference { offset, .. } => Some(*offset),
            Error::BinRWError(binrw::Error::BadMagic { pos, .. }) => Some(*pos),
            Error::IOError(_) | Error::BinRWError(_) => None,
        }
    }

    /// Translate a failure reading a fixed `binrw` header that starts at `offset`.
    pub fn from_header(error: binrw::Error, expected: &'static str, offset: u64) -> Self {
        match error {
            binrw::Error::BadMagic { .. } => Error::MagicMismatch { expected, offset },
            binrw::Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Error::TruncatedInput { offset }
            }
            binrw::Error::Backtrace(backtrace) => Self::from_header(*backtrace.error, expected, offset),
            other => Error::BinRWError(other),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
