//! Tag dispatch for individual keyed archive values.

use std::io::{Read, Seek};

use tracing::trace;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::read::read_archive;
use crate::types::{
    AABBox3, ArchiveVersion, DeferredStringRef, KAValue, KeyedArchive, StringKind, TypeTag,
};

/// Read a tag byte followed by the value it announces.
pub fn read_value<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    version: ArchiveVersion,
) -> Result<KAValue> {
    let offset = cursor.tell()?;
    let tag = cursor.read_u8()?;
    decode_value(cursor, tag, offset, version)
}

/// Decode the value for an already consumed `tag` read at `offset`.
///
/// Scalar, vector, matrix, color and blob tags decode the same way in every
/// version. String family tags are stored inline in [`ArchiveVersion::V1`]
/// archives and as string table indices otherwise.
pub fn decode_value<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    tag: u8,
    offset: u64,
    version: ArchiveVersion,
) -> Result<KAValue> {
    let tag = TypeTag::try_from(tag).map_err(|tag| Error::UnknownTag { tag, offset })?;

    Ok(match tag {
        TypeTag::None => KAValue::None,
        TypeTag::Boolean => KAValue::Boolean(cursor.read_u8()? != 0),
        TypeTag::Int8 => KAValue::Int8(cursor.read_i8()?),
        TypeTag::UInt8 => KAValue::UInt8(cursor.read_u8()?),
        TypeTag::Int16 => KAValue::Int16(cursor.read_i16()?),
        TypeTag::UInt16 => KAValue::UInt16(cursor.read_u16()?),
        TypeTag::Int32 => KAValue::Int32(cursor.read_i32()?),
        TypeTag::UInt32 => KAValue::UInt32(cursor.read_u32()?),
        TypeTag::Int64 => KAValue::Int64(cursor.read_i64()?),
        TypeTag::UInt64 => KAValue::UInt64(cursor.read_u64()?),
        TypeTag::Float => KAValue::Float(cursor.read_f32()?),
        TypeTag::Float64 => KAValue::Float64(cursor.read_f64()?),
        TypeTag::ByteArray => {
            let len = cursor.read_u32()?;
            KAValue::ByteArray(cursor.read_bytes(len.into())?)
        }
        TypeTag::Vector2 => KAValue::Vector2(cursor.read_f32_array()?),
        TypeTag::Vector3 => KAValue::Vector3(cursor.read_f32_array()?),
        TypeTag::Vector4 => KAValue::Vector4(cursor.read_f32_array()?),
        TypeTag::Matrix2 => KAValue::Matrix2([cursor.read_f32_array()?, cursor.read_f32_array()?]),
        TypeTag::Matrix3 => KAValue::Matrix3([
            cursor.read_f32_array()?,
            cursor.read_f32_array()?,
            cursor.read_f32_array()?,
        ]),
        TypeTag::Matrix4 => KAValue::Matrix4([
            cursor.read_f32_array()?,
            cursor.read_f32_array()?,
            cursor.read_f32_array()?,
            cursor.read_f32_array()?,
        ]),
        TypeTag::Color => KAValue::Color(cursor.read_f32_array()?),
        TypeTag::AABBox3 => KAValue::AABBox3(AABBox3 {
            min: cursor.read_f32_array()?,
            max: cursor.read_f32_array()?,
        }),
        TypeTag::String => read_string(cursor, StringKind::String, version)?,
        TypeTag::WideString => read_string(cursor, StringKind::WideString, version)?,
        TypeTag::FastName => read_string(cursor, StringKind::FastName, version)?,
        TypeTag::FilePath => read_string(cursor, StringKind::FilePath, version)?,
        TypeTag::KeyedArchive => {
            cursor.enter(offset)?;
            let archive = read_nested(cursor)?;
            cursor.leave();
            KAValue::KeyedArchive(archive)
        }
        TypeTag::Array => {
            cursor.enter(offset)?;
            let values = read_array(cursor, version)?;
            cursor.leave();
            KAValue::Array(values)
        }
    })
}

/// Read a u32 element count followed by that many tag prefixed values.
pub fn read_array<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    version: ArchiveVersion,
) -> Result<Vec<KAValue>> {
    let count = cursor.read_u32()?;
    (0..count).map(|_| read_value(cursor, version)).collect()
}

fn read_string<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    kind: StringKind,
    version: ArchiveVersion,
) -> Result<KAValue> {
    let offset = cursor.tell()?;
    let len = cursor.read_u32()?;

    if version.defers_strings() {
        return Ok(KAValue::Deferred(DeferredStringRef {
            index: len,
            kind,
            offset,
        }));
    }

    Ok(match kind {
        StringKind::String => KAValue::String(cursor.read_string(len.into())?),
        StringKind::WideString => KAValue::WideString(cursor.read_wide_string(len.into())?),
        StringKind::FastName => KAValue::FastName(cursor.read_string(len.into())?),
        StringKind::FilePath => KAValue::FilePath(cursor.read_string(len.into())?),
    })
}

// The outer cursor always advances by the declared length, however much of
// the slice the nested archive actually uses.
fn read_nested<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<KeyedArchive> {
    let len = cursor.read_u32()?;
    let base = cursor.tell()?;
    let slice = cursor.read_bytes(len.into())?;
    trace!(offset = base, len, "nested keyed archive");

    read_archive(&mut ByteCursor::nested(slice, base).within(cursor))
}
