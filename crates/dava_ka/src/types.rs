//! Value model produced by the keyed archive decoder.

use binrw::BinRead;
use derive_more::derive::{Constructor, Deref};
use std::collections::HashMap;
use widestring::U16String;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, Result};

/// Keyed archive header
///
/// Every archive starts with "KA", a version and a count whose meaning
/// depends on the version: item pairs for V1 and V258, the string pool size
/// for V2.
#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(magic = b"KA", little)]
pub struct ArchiveHeader {
    /// Raw wire version, see [`ArchiveVersion`]
    pub version: u16,

    /// Item pairs or string pool size
    pub count: u32,
}

/// One-byte discriminator preceding every encoded value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    None = 0,
    Boolean = 1,
    Int32 = 2,
    Float = 3,
    String = 4,
    WideString = 5,
    ByteArray = 6,
    UInt32 = 7,
    KeyedArchive = 8,
    Int64 = 9,
    UInt64 = 10,
    Vector2 = 11,
    Vector3 = 12,
    Vector4 = 13,
    Matrix2 = 14,
    Matrix3 = 15,
    Matrix4 = 16,
    Color = 17,
    FastName = 18,
    AABBox3 = 19,
    FilePath = 20,
    Float64 = 21,
    Int8 = 22,
    UInt8 = 23,
    Int16 = 24,
    UInt16 = 25,
    // No revision of the format assigns a number to arrays; 26 was the
    // sentinel after the last scalar type.
    Array = 26,
}

impl TryFrom<u8> for TypeTag {
    type Error = u8;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        Ok(match value {
            0 => TypeTag::None,
            1 => TypeTag::Boolean,
            2 => TypeTag::Int32,
            3 => TypeTag::Float,
            4 => TypeTag::String,
            5 => TypeTag::WideString,
            6 => TypeTag::ByteArray,
            7 => TypeTag::UInt32,
            8 => TypeTag::KeyedArchive,
            9 => TypeTag::Int64,
            10 => TypeTag::UInt64,
            11 => TypeTag::Vector2,
            12 => TypeTag::Vector3,
            13 => TypeTag::Vector4,
            14 => TypeTag::Matrix2,
            15 => TypeTag::Matrix3,
            16 => TypeTag::Matrix4,
            17 => TypeTag::Color,
            18 => TypeTag::FastName,
            19 => TypeTag::AABBox3,
            20 => TypeTag::FilePath,
            21 => TypeTag::Float64,
            22 => TypeTag::Int8,
            23 => TypeTag::UInt8,
            24 => TypeTag::Int16,
            25 => TypeTag::UInt16,
            26 => TypeTag::Array,
            other => return Err(other),
        })
    }
}

/// Wire version of a keyed archive
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u16)]
pub enum ArchiveVersion {
    /// Strings are stored inline next to their values
    V1 = 1,

    /// The archive carries its own string pool and table
    V2 = 2,

    /// Strings are indices into the table of an enclosing [`ArchiveVersion::V2`] archive
    V258 = 258,
}

impl ArchiveVersion {
    /// Whether string family values are stored as string table indices
    pub fn defers_strings(self) -> bool {
        !matches!(self, ArchiveVersion::V1)
    }
}

impl TryFrom<u16> for ArchiveVersion {
    type Error = u16;

    fn try_from(value: u16) -> core::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ArchiveVersion::V1),
            2 => Ok(ArchiveVersion::V2),
            258 => Ok(ArchiveVersion::V258),
            other => Err(other),
        }
    }
}

/// The string family tag a deferred reference was read for
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum StringKind {
    String,
    WideString,
    FastName,
    FilePath,
}

/// Index into a string table that has not been resolved yet
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DeferredStringRef {
    /// String table index
    pub index: u32,

    /// Which kind of value the reference resolves to
    pub kind: StringKind,

    /// Absolute offset the index was read from
    pub offset: u64,
}

impl DeferredStringRef {
    /// Look the reference up, producing a value of the kind it was read as.
    pub fn resolve(&self, table: &StringTable) -> Result<KAValue> {
        let value = table
            .get(&self.index)
            .ok_or(Error::UnresolvedStringReference {
                index: self.index,
                offset: self.offset,
            })?
            .clone();

        Ok(match self.kind {
            StringKind::String => KAValue::String(value),
            StringKind::WideString => KAValue::WideString(U16String::from_str(&value)),
            StringKind::FastName => KAValue::FastName(value),
            StringKind::FilePath => KAValue::FilePath(value),
        })
    }
}

/// Axis aligned bounding box
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AABBox3 {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// A decoded keyed archive value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum KAValue {
    None,
    Boolean(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Float64(f64),
    String(String),
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_wide_string"))]
    WideString(U16String),
    ByteArray(Vec<u8>),
    Array(Vec<KAValue>),
    KeyedArchive(KeyedArchive),
    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Vector4([f32; 4]),
    Matrix2([[f32; 2]; 2]),
    Matrix3([[f32; 3]; 3]),
    Matrix4([[f32; 4]; 4]),
    Color([f32; 4]),
    FastName(String),
    AABBox3(AABBox3),
    FilePath(String),
    Deferred(DeferredStringRef),
}

#[cfg(feature = "serde")]
fn serialize_wide_string<S>(value: &U16String, serializer: S) -> core::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string_lossy())
}

impl KAValue {
    /// The text of a string family value.
    ///
    /// Wide strings are not returned here since they are not stored as UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KAValue::String(s) | KAValue::FastName(s) | KAValue::FilePath(s) => Some(s),
            _ => None,
        }
    }

    /// Any integer value that fits in a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            KAValue::UInt8(v) => Some(v.into()),
            KAValue::UInt16(v) => Some(v.into()),
            KAValue::UInt32(v) => Some(v.into()),
            KAValue::UInt64(v) => Some(v),
            KAValue::Int8(v) => u64::try_from(v).ok(),
            KAValue::Int16(v) => u64::try_from(v).ok(),
            KAValue::Int32(v) => u64::try_from(v).ok(),
            KAValue::Int64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Any integer value that fits in a u32.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|v| u32::try_from(v).ok())
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            KAValue::ByteArray(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[KAValue]> {
        match self {
            KAValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_archive(&self) -> Option<&KeyedArchive> {
        match self {
            KAValue::KeyedArchive(archive) => Some(archive),
            _ => None,
        }
    }

    /// Whether this value, or anything nested in it, is still a [`KAValue::Deferred`].
    pub fn has_deferred(&self) -> bool {
        match self {
            KAValue::Deferred(_) => true,
            KAValue::Array(values) => values.iter().any(KAValue::has_deferred),
            KAValue::KeyedArchive(archive) => archive.has_deferred(),
            _ => false,
        }
    }

    /// Replace every deferred reference in this value, including those inside
    /// nested archives and arrays.
    pub fn resolve(self, table: &StringTable) -> Result<KAValue> {
        match self {
            KAValue::Deferred(reference) => reference.resolve(table),
            KAValue::Array(values) => values
                .into_iter()
                .map(|value| value.resolve(table))
                .collect::<Result<Vec<_>>>()
                .map(KAValue::Array),
            KAValue::KeyedArchive(archive) => archive.resolve(table).map(KAValue::KeyedArchive),
            other => Ok(other),
        }
    }
}

/// String table built from the pool of a [`ArchiveVersion::V2`] archive
#[derive(Constructor, Clone, Debug, Default, PartialEq, Eq, Deref)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StringTable(HashMap<u32, String>);

/// An ordered list of key/value pairs
///
/// Entries are kept in wire order and duplicates are retained, so
/// [`KeyedArchive::len`] always matches the count declared by the archive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct KeyedArchive {
    version: ArchiveVersion,
    entries: Vec<(KAValue, KAValue)>,
}

impl KeyedArchive {
    pub fn new(version: ArchiveVersion, entries: Vec<(KAValue, KAValue)>) -> Self {
        KeyedArchive { version, entries }
    }

    /// The wire version that produced this archive
    pub fn version(&self) -> ArchiveVersion {
        self.version
    }

    /// Number of entries in this archive
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the entries in wire order
    pub fn entries(&self) -> impl Iterator<Item = (&KAValue, &KAValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate over the keys in wire order
    pub fn keys(&self) -> impl Iterator<Item = &KAValue> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Look a value up by a textual key. When a key repeats the last entry wins.
    pub fn get(&self, key: &str) -> Option<&KAValue> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| match k {
                KAValue::WideString(wide) => wide.to_string_lossy() == key,
                other => other.as_str() == Some(key),
            })
            .map(|(_, v)| v)
    }

    /// Look a value up by an arbitrary key value. When a key repeats the last entry wins.
    pub fn get_value(&self, key: &KAValue) -> Option<&KAValue> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether any key or value still holds an unresolved reference
    pub fn has_deferred(&self) -> bool {
        self.entries
            .iter()
            .any(|(k, v)| k.has_deferred() || v.has_deferred())
    }

    /// Resolve every deferred reference against `table`.
    ///
    /// A [`ArchiveVersion::V258`] archive decoded on its own keeps its references
    /// until the table of the archive that embedded it is supplied here.
    pub fn resolve(self, table: &StringTable) -> Result<KeyedArchive> {
        let entries = self
            .entries
            .into_iter()
            .map(|(k, v)| -> Result<_> { Ok((k.resolve(table)?, v.resolve(table)?)) })
            .collect::<Result<Vec<_>>>()?;

        Ok(KeyedArchive {
            version: self.version,
            entries,
        })
    }
}

impl<'a> IntoIterator for &'a KeyedArchive {
    type Item = &'a (KAValue, KAValue);
    type IntoIter = std::slice::Iter<'a, (KAValue, KAValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
