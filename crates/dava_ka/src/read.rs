//! Types for reading keyed archives
//!

use std::io::{Read, Seek};

use tracing::{debug, instrument, trace};

use crate::codec::{read_array, read_value};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::types::{
    ArchiveHeader, ArchiveVersion, DeferredStringRef, KAValue, KeyedArchive, StringKind,
    StringTable,
};

impl KeyedArchive {
    /// Read a keyed archive starting at the current position of `reader`.
    ///
    /// ```no_run
    /// use std::fs::File;
    ///
    /// fn list_keys(path: &str) -> dava_ka::error::Result<()> {
    ///     let mut file = File::open(path)?;
    ///     let archive = dava_ka::KeyedArchive::read(&mut file)?;
    ///
    ///     for key in archive.keys() {
    ///         println!("{:?}", key);
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn read<R: Read + Seek>(reader: R) -> Result<KeyedArchive> {
        read_archive(&mut ByteCursor::new(reader)?)
    }

    /// Read a keyed archive from an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Result<KeyedArchive> {
        read_archive(&mut ByteCursor::from_bytes(data))
    }
}

/// Decode one keyed archive at the cursor position.
///
/// The archive is read eagerly and completely; any failure aborts the whole
/// archive. [`ArchiveVersion::V2`] archives come back fully resolved.
#[instrument(level = "trace", skip_all)]
pub fn read_archive<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<KeyedArchive> {
    let start = cursor.tell()?;
    let header: ArchiveHeader = cursor.read_header("KA")?;

    let version = ArchiveVersion::try_from(header.version).map_err(|version| {
        Error::UnsupportedVersion {
            version,
            offset: start + 2,
        }
    })?;
    debug!(offset = start, ?version, count = header.count, "keyed archive");

    if header.count == 0 {
        return Ok(KeyedArchive::new(version, Vec::new()));
    }

    match version {
        ArchiveVersion::V1 | ArchiveVersion::V258 => read_pairs(cursor, version, header.count),
        ArchiveVersion::V2 => read_v2(cursor, header.count),
    }
}

fn read_pairs<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    version: ArchiveVersion,
    count: u32,
) -> Result<KeyedArchive> {
    let entries = (0..count)
        .map(|_| -> Result<_> {
            let key = read_value(cursor, version)?;
            Ok((key, read_value(cursor, version)?))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(KeyedArchive::new(version, entries))
}

fn read_v2<R: Read + Seek>(cursor: &mut ByteCursor<R>, count: u32) -> Result<KeyedArchive> {
    let table = read_string_table(cursor, count)?;

    let nodes = cursor.read_u32()?;
    trace!(strings = table.len(), nodes, "v2 hierarchy");

    let mut entries = Vec::with_capacity(nodes.min(count) as usize);
    for _ in 0..nodes {
        let offset = cursor.tell()?;
        let key = KAValue::Deferred(DeferredStringRef {
            index: cursor.read_u32()?,
            kind: StringKind::String,
            offset,
        });
        let value = KAValue::Array(read_array(cursor, ArchiveVersion::V2)?);
        entries.push((key, value));
    }

    // Nothing is resolved until the whole hierarchy has been read
    KeyedArchive::new(ArchiveVersion::V2, entries).resolve(&table)
}

/// Read a pool of `count` u16 length prefixed strings followed by `count`
/// table indices, pairing each index with the string at the same position.
pub fn read_string_table<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    count: u32,
) -> Result<StringTable> {
    let pool = (0..count)
        .map(|_| -> Result<_> {
            let len = cursor.read_u16()?;
            cursor.read_string(len.into())
        })
        .collect::<Result<Vec<_>>>()?;

    let table = pool
        .into_iter()
        .map(|string| -> Result<_> { Ok((cursor.read_u32()?, string)) })
        .collect::<Result<_>>()?;

    Ok(StringTable::new(table))
}
