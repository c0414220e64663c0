//! This library handles reading **Keyed Archive** (KA) data used by the *DAVA* engine.
//!
//! # Keyed Archive Format Documentation
//!
//! A keyed archive is an ordered list of typed key/value pairs. It is the
//! serialization container used throughout DAVA scene files: every scene node,
//! component, material and polygon group is stored as one. Archives nest, so
//! a value may itself be a complete keyed archive.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 2 bytes: "KA"                                              |
//! | 0x0002         | Version                | 2 bytes: 1, 2 or 258                                       |
//! | 0x0004         | Count                  | 4 bytes: Pair count (V1, V258) or string pool size (V2)    |
//!
//! A count of zero ends the archive right after the header, whatever the version.
//!
//! ### Version 1
//!
//! `count` pairs follow the header. Keys and values are both encoded values:
//! a one byte type tag followed by the payload that tag announces. Strings
//! are stored inline as a u32 length and that many bytes.
//!
//! ### Version 2
//!
//! The archive carries its own string table:
//!
//! - **Pool**: `count` strings, each a u16 length followed by UTF-8 bytes.
//! - **Table**: `count` u32 indices. The i-th index names the i-th pool string.
//! - **Hierarchy**: a u32 node count, then for each node a u32 string table
//!   index naming the node followed by an array value (u32 element count,
//!   then that many encoded values).
//!
//! String values inside a version 2 archive are u32 string table indices.
//!
//! ### Version 258
//!
//! Laid out like version 1, except string values are u32 indices into the
//! table of the version 2 archive that embeds it. A version 258 archive read
//! on its own keeps those indices as [`KAValue::Deferred`] until
//! [`KeyedArchive::resolve`] is given the table.
//!
//! ### Values
//!
//! | Tag | Type         | Payload                                                      |
//! |-----|--------------|--------------------------------------------------------------|
//! | 0   | None         | nothing                                                      |
//! | 1   | Boolean      | 1 byte, non-zero is true                                     |
//! | 2   | Int32        | 4 bytes                                                      |
//! | 3   | Float        | 4 bytes                                                      |
//! | 4   | String       | u32 length + UTF-8 bytes, or u32 table index                 |
//! | 5   | WideString   | u32 length + UTF-16 code units, or u32 table index           |
//! | 6   | ByteArray    | u32 length + bytes                                           |
//! | 7   | UInt32       | 4 bytes                                                      |
//! | 8   | KeyedArchive | u32 length + a complete nested archive                       |
//! | 9   | Int64        | 8 bytes                                                      |
//! | 10  | UInt64       | 8 bytes                                                      |
//! | 11  | Vector2      | 2 x f32                                                      |
//! | 12  | Vector3      | 3 x f32                                                      |
//! | 13  | Vector4      | 4 x f32                                                      |
//! | 14  | Matrix2      | 4 x f32, row-major                                           |
//! | 15  | Matrix3      | 9 x f32, row-major                                           |
//! | 16  | Matrix4      | 16 x f32, row-major                                          |
//! | 17  | Color        | 4 x f32 (r, g, b, a)                                         |
//! | 18  | FastName     | as String                                                    |
//! | 19  | AABBox3      | 6 x f32 (min then max)                                       |
//! | 20  | FilePath     | as String                                                    |
//! | 21  | Float64      | 8 bytes                                                      |
//! | 22  | Int8         | 1 byte                                                       |
//! | 23  | UInt8        | 1 byte                                                       |
//! | 24  | Int16        | 2 bytes                                                      |
//! | 25  | UInt16       | 2 bytes                                                      |
//! | 26  | Array        | u32 count + that many encoded values                         |
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte values
//! - **Errors**: every decoding error carries the absolute byte offset it was detected at
//!

pub mod codec;
pub mod cursor;
pub mod error;
pub mod read;
pub mod types;

pub use cursor::ByteCursor;
pub use error::{Error, Result};
pub use types::{
    AABBox3, ArchiveVersion, DeferredStringRef, KAValue, KeyedArchive, StringKind, StringTable,
    TypeTag,
};
