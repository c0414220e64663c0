//! Base types for structure of SFV2 scene files.

use binrw::BinRead;

#[cfg(feature = "serde")]
use serde::Serialize;

/// SFV2 file header
///
/// Every scene file starts with "SFV2" followed by a version and a node count.
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[br(magic = b"SFV2", little)]
pub struct SceneHeader {
    /// Format version, selects which optional sections follow
    pub version: u32,

    /// Declared node count
    pub node_count: u32,
}

impl SceneHeader {
    /// Whether a version tags archive follows the header
    pub fn has_version_tags(&self) -> bool {
        self.version >= 14
    }

    /// Whether a descriptor follows the version tags
    pub fn has_descriptor(&self) -> bool {
        self.version >= 10
    }

    /// Whether the file ends with a list of data nodes
    pub fn has_data_nodes(&self) -> bool {
        self.version >= 2
    }
}

/// Kind of file a descriptor announces
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum DescriptorFileType {
    SceneFile,
    ModelFile,
    Unknown(u32),
}

impl From<u32> for DescriptorFileType {
    fn from(value: u32) -> Self {
        match value {
            0 => DescriptorFileType::SceneFile,
            1 => DescriptorFileType::ModelFile,
            other => DescriptorFileType::Unknown(other),
        }
    }
}

/// Scene descriptor
///
/// Only the file type is understood, the rest of the descriptor is kept as read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Descriptor {
    /// Declared size, including the size and file type fields
    pub size: u32,

    pub file_type: DescriptorFileType,

    /// The remaining `size - 8` bytes
    pub payload: Vec<u8>,
}
