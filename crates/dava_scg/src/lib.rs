//! This library handles reading **SCPG** polygon geometry files used by the *DAVA* engine.
//!
//! # SCPG Format Documentation
//!
//! SCPG files (usually with the `.scg` extension) hold the vertex and index
//! buffers referenced by the meshes of a scene. Each buffer set is a polygon
//! group stored as a version 1 keyed archive, see [`dava_ka`].
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "SCPG"                                            |
//! | 0x0004         | Version                | 4 bytes: Format version                                    |
//! | 0x0008         | Node Count             | 4 bytes: Number of keyed archive nodes                     |
//! | 0x000C         | Reserved               | 4 bytes: Second count of unknown meaning                   |
//!
//! The header is followed by `Node Count` keyed archives.
//!
//! ### Polygon Group
//!
//! | Key                     | Type      | Description                                          |
//! |-------------------------|-----------|------------------------------------------------------|
//! | `##name`                | String    | Always "PolygonGroup"                                |
//! | `#id`                   | Integer or ByteArray | Group id, blobs hold a little endian integer |
//! | `vertexFormat`          | UInt32    | Attribute mask, see [`vertex::VertexFlags`]          |
//! | `vertexCount`           | UInt32    | Number of vertex records                             |
//! | `packing`               | UInt32    | 0 for unpacked data, the only supported packing      |
//! | `vertices`              | ByteArray | `vertexCount` interleaved records                    |
//! | `indexFormat`           | UInt32    | 0 for 16 bit, 1 for 32 bit indices                   |
//! | `indexCount`            | UInt32    | Number of indices                                    |
//! | `indices`               | ByteArray | Index data                                           |
//! | `rhi_primitiveType`     | UInt32    | 1 triangle list, 2 triangle strip, 10 line list      |
//! | `primitiveCount`        | UInt32    | Number of primitives                                 |
//! | `cubeTextureCoordCount` | UInt32    | Optional                                             |
//!
//! ### Vertex Records
//!
//! A record holds every attribute enabled in the mask, packed without padding
//! in the order of [`vertex::VertexAttribute::ALL`]:
//!
//! | Attribute                | Size (bytes) |
//! |--------------------------|--------------|
//! | Position                 | 12           |
//! | Normal                   | 12           |
//! | Color                    | 4            |
//! | Texture coordinates 0-3  | 8 each       |
//! | Tangent                  | 12           |
//! | Binormal                 | 12           |
//! | Hard joint index         | 4            |
//! | Cube texture coords 0-3  | 12 each      |
//! | Pivot                    | 16           |
//! | Flexibility              | 4            |
//! | Angle sin/cos            | 8            |
//! | Joint index              | 16           |
//! | Joint weight             | 16           |
//!
//! ## Additional Information
//!
//! - **File Extension**: `.scg`
//! - **Endianness**: Little-endian for all multi-byte values
//!

pub mod error;
pub mod primitive;
pub mod read;
pub mod types;
pub mod vertex;

pub use primitive::Primitives;
pub use read::{GeometryDocument, GeometryReaderOptions, PolygonGroup};
pub use vertex::{VertexAttribute, VertexData, VertexFlags, VertexFormat};
