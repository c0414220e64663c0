//! Base types for structure of SCPG files.

use binrw::BinRead;

#[cfg(feature = "serde")]
use serde::Serialize;

/// SCPG file header
///
/// Every geometry file starts with "SCPG" followed by three little endian u32 fields.
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[br(magic = b"SCPG", little)]
pub struct GeometryHeader {
    /// Format version
    pub version: u32,

    /// The number of keyed archive nodes that follow the header
    pub node_count: u32,

    /// A second count whose meaning is unknown, kept as read
    pub reserved: u32,
}

/// How the indices of a polygon group form primitives
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u32)]
pub enum PrimitiveType {
    /// Consecutive, non-overlapping index triples
    TriangleList = 1,

    /// Every index after the second closes a triangle with the two before it
    TriangleStrip = 2,

    /// Consecutive, non-overlapping index pairs
    LineList = 10,
}

impl TryFrom<u32> for PrimitiveType {
    type Error = u32;

    fn try_from(value: u32) -> core::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(PrimitiveType::TriangleList),
            2 => Ok(PrimitiveType::TriangleStrip),
            10 => Ok(PrimitiveType::LineList),
            other => Err(other),
        }
    }
}

/// Width of the entries in an index blob
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u32)]
pub enum IndexFormat {
    U16 = 0,
    U32 = 1,
}

impl IndexFormat {
    /// Size of one index in bytes
    pub fn width(self) -> usize {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

impl TryFrom<u32> for IndexFormat {
    type Error = u32;

    fn try_from(value: u32) -> core::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(IndexFormat::U16),
            1 => Ok(IndexFormat::U32),
            other => Err(other),
        }
    }
}

/// Vertex packing mode
///
/// Only unpacked vertex data can be decoded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u32)]
pub enum VertexPacking {
    #[default]
    None = 0,
    Default = 1,
}

impl TryFrom<u32> for VertexPacking {
    type Error = u32;

    fn try_from(value: u32) -> core::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(VertexPacking::None),
            1 => Ok(VertexPacking::Default),
            other => Err(other),
        }
    }
}
