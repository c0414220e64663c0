//! Types for reading SFV2 scene files
//!

use std::io::{Read, Seek};

use dava_ka::{read::read_archive, ByteCursor, KeyedArchive};
use tracing::{debug, instrument, trace};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::{Error, Result},
    types::{Descriptor, DescriptorFileType, SceneHeader},
};

/// A decoded SFV2 scene file
///
/// Sections a file's version predates are `None` (or empty for data nodes).
///
/// ```no_run
/// use std::fs::File;
///
/// fn list_nodes(path: &str) -> dava_sc2::error::Result<()> {
///     let mut file = File::open(path)?;
///     let scene = dava_sc2::SceneDocument::read(&mut file)?;
///
///     for node in &scene.nodes {
///         println!("{:?}", node.get("##name"));
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SceneDocument {
    pub header: SceneHeader,

    /// Version tags archive, present from version 14
    pub version_tags: Option<KeyedArchive>,

    /// Descriptor, present from version 10
    pub descriptor: Option<Descriptor>,

    /// Data nodes in file order, present from version 2
    pub nodes: Vec<KeyedArchive>,
}

impl SceneDocument {
    /// Read a scene starting at the current position of `reader`.
    pub fn read<R: Read + Seek>(reader: R) -> Result<SceneDocument> {
        read_scene(&mut ByteCursor::new(reader)?)
    }

    /// Format version declared by the header
    pub fn version(&self) -> u32 {
        self.header.version
    }
}

/// Decode a complete SFV2 file at the cursor position.
#[instrument(level = "debug", skip_all)]
pub fn read_scene<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<SceneDocument> {
    let header: SceneHeader = cursor.read_header("SFV2")?;
    debug!(
        version = header.version,
        nodes = header.node_count,
        "scene header"
    );

    let version_tags = if header.has_version_tags() {
        Some(read_archive(cursor)?)
    } else {
        None
    };

    let descriptor = if header.has_descriptor() {
        Some(read_descriptor(cursor)?)
    } else {
        None
    };

    let mut nodes = Vec::new();
    if header.has_data_nodes() {
        let count = cursor.read_u32()?;
        trace!(count, "data nodes");

        for _ in 0..count {
            nodes.push(read_archive(cursor)?);
        }
    }

    Ok(SceneDocument {
        header,
        version_tags,
        descriptor,
        nodes,
    })
}

fn read_descriptor<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Descriptor> {
    let offset = cursor.tell()?;
    let size = cursor.read_u32()?;
    let payload_len = size
        .checked_sub(8)
        .ok_or(Error::InvalidDescriptorSize { size, offset })?;

    let file_type = DescriptorFileType::from(cursor.read_u32()?);
    let payload = cursor.read_bytes(payload_len.into())?;
    trace!(size, ?file_type, "descriptor");

    Ok(Descriptor {
        size,
        file_type,
        payload,
    })
}
