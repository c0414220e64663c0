//! Types for reading SCPG geometry files
//!

use std::io::{Read, Seek};

use bon::Builder;
use byteorder::{ByteOrder, LittleEndian};
use dava_ka::{read::read_archive, ByteCursor, KAValue, KeyedArchive};
use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::{Error, Result},
    primitive::Primitives,
    types::{GeometryHeader, IndexFormat, PrimitiveType, VertexPacking},
    vertex::{VertexData, VertexFormat},
};

/// Name carried in the `##name` field of every polygon group node
pub const POLYGON_GROUP: &str = "PolygonGroup";

/// Options controlling how geometry files are decoded
///
/// ```
/// use dava_scg::read::GeometryReaderOptions;
///
/// let options = GeometryReaderOptions::builder()
///     .skip_foreign_nodes(false)
///     .build();
/// assert!(options.decode_attributes);
/// ```
#[derive(Debug, Clone, Copy, Builder)]
pub struct GeometryReaderOptions {
    /// Skip nodes that are not polygon groups instead of failing with [`Error::ForeignNode`]
    #[builder(default = true)]
    pub skip_foreign_nodes: bool,

    /// Decode every attribute present in the vertex format, not only positions
    #[builder(default = true)]
    pub decode_attributes: bool,
}

impl Default for GeometryReaderOptions {
    fn default() -> Self {
        GeometryReaderOptions::builder().build()
    }
}

/// A decoded polygon group
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PolygonGroup {
    /// Identifier referenced by scene nodes
    pub id: u64,

    /// Layout of one record in [`PolygonGroup::vertex_blob`]
    pub vertex_format: VertexFormat,

    pub vertex_count: u32,

    pub packing: VertexPacking,

    /// Raw interleaved vertex records
    pub vertex_blob: Vec<u8>,

    pub index_format: IndexFormat,

    pub index_count: u32,

    /// Raw index data
    pub index_blob: Vec<u8>,

    pub primitive_type: PrimitiveType,

    /// Primitive count as declared by the file
    pub primitive_count: u32,

    /// Kept as read, has no effect on the vertex layout
    pub cube_texture_coord_count: Option<u32>,

    /// Decoded vertex attributes
    pub vertices: VertexData,

    /// Decoded indices widened to u32
    pub indices: Vec<u32>,

    /// Primitives assembled from [`PolygonGroup::indices`]
    pub primitives: Primitives,
}

impl PolygonGroup {
    /// Vertex positions
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.vertices.positions
    }

    /// Build a polygon group from a decoded node that started at `offset`.
    ///
    /// The packing is checked before either blob is looked at.
    pub fn from_archive(
        node: &KeyedArchive,
        offset: u64,
        options: &GeometryReaderOptions,
    ) -> Result<PolygonGroup> {
        let fields = Fields { node, offset };

        let id = fields.id()?;
        let vertex_format = VertexFormat::new(fields.u32("vertexFormat")?);
        let vertex_count = fields.u32("vertexCount")?;

        let packing = fields.u32("packing")?;
        let packing = match VertexPacking::try_from(packing) {
            Ok(VertexPacking::None) => VertexPacking::None,
            _ => return Err(Error::UnsupportedPacking { packing, offset }),
        };

        let vertex_blob = fields.bytes("vertices")?;
        let expected = u64::from(vertex_format.stride()) * u64::from(vertex_count);
        if expected != vertex_blob.len() as u64 {
            return Err(Error::SizeMismatch {
                field: "vertices",
                expected,
                actual: vertex_blob.len() as u64,
                offset,
            });
        }

        let index_format = fields.u32("indexFormat")?;
        let index_format = IndexFormat::try_from(index_format)
            .map_err(|format| Error::UnsupportedIndexFormat { format, offset })?;
        let index_count = fields.u32("indexCount")?;
        let index_blob = fields.bytes("indices")?;
        let indices = read_indices(index_blob, index_format, index_count, offset)?;

        let primitive_type = fields.u32("rhi_primitiveType")?;
        let primitive_type = PrimitiveType::try_from(primitive_type).map_err(|primitive_type| {
            Error::UnsupportedPrimitiveType {
                primitive_type,
                offset,
            }
        })?;
        let primitive_count = fields.u32("primitiveCount")?;
        let cube_texture_coord_count = fields.optional_u32("cubeTextureCoordCount")?;

        trace!(
            id,
            stride = vertex_format.stride(),
            vertex_count,
            index_count,
            ?primitive_type,
            "polygon group"
        );

        Ok(PolygonGroup {
            id,
            vertex_format,
            vertex_count,
            packing,
            vertices: VertexData::decode(&vertex_format, vertex_blob, options.decode_attributes),
            vertex_blob: vertex_blob.to_vec(),
            index_format,
            index_count,
            index_blob: index_blob.to_vec(),
            primitives: Primitives::assemble(primitive_type, &indices),
            indices,
            primitive_type,
            primitive_count,
            cube_texture_coord_count,
        })
    }
}

fn read_indices(blob: &[u8], format: IndexFormat, count: u32, offset: u64) -> Result<Vec<u32>> {
    let width = format.width();
    let expected = width as u64 * u64::from(count);
    if (blob.len() as u64) < expected {
        return Err(Error::SizeMismatch {
            field: "indices",
            expected,
            actual: blob.len() as u64,
            offset,
        });
    }

    Ok(blob
        .chunks_exact(width)
        .take(count as usize)
        .map(|index| match format {
            IndexFormat::U16 => LittleEndian::read_u16(index).into(),
            IndexFormat::U32 => LittleEndian::read_u32(index),
        })
        .collect())
}

/// Typed field lookups on a polygon group node
struct Fields<'a> {
    node: &'a KeyedArchive,
    offset: u64,
}

impl<'a> Fields<'a> {
    fn value(&self, field: &'static str) -> Result<&'a KAValue> {
        self.node.get(field).ok_or(Error::MissingField {
            field,
            offset: self.offset,
        })
    }

    fn invalid(&self, field: &'static str) -> Error {
        Error::InvalidField {
            field,
            offset: self.offset,
        }
    }

    fn u32(&self, field: &'static str) -> Result<u32> {
        self.value(field)?
            .as_u32()
            .ok_or_else(|| self.invalid(field))
    }

    fn optional_u32(&self, field: &'static str) -> Result<Option<u32>> {
        match self.node.get(field) {
            Some(value) => value.as_u32().map(Some).ok_or_else(|| self.invalid(field)),
            None => Ok(None),
        }
    }

    fn bytes(&self, field: &'static str) -> Result<&'a [u8]> {
        self.value(field)?
            .as_bytes()
            .ok_or_else(|| self.invalid(field))
    }

    // Integer ids are taken as is, blob ids hold a little endian integer
    fn id(&self) -> Result<u64> {
        let value = self.value("#id")?;
        if let Some(id) = value.as_u64() {
            return Ok(id);
        }

        match value.as_bytes() {
            Some(bytes) if (1..=8).contains(&bytes.len()) => {
                Ok(LittleEndian::read_uint(bytes, bytes.len()))
            }
            _ => Err(self.invalid("#id")),
        }
    }
}

/// A decoded SCPG file
///
/// ```no_run
/// use std::fs::File;
///
/// fn count_triangles(path: &str) -> dava_scg::error::Result<usize> {
///     let mut file = File::open(path)?;
///     let geometry = dava_scg::GeometryDocument::read(&mut file)?;
///
///     Ok(geometry
///         .groups()
///         .filter_map(|group| group.primitives.triangles())
///         .map(|triangles| triangles.len())
///         .sum())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GeometryDocument {
    /// The file header, including the unused reserved count
    pub header: GeometryHeader,

    /// Polygon groups by id, in file order
    pub groups: IndexMap<u64, PolygonGroup>,
}

impl GeometryDocument {
    /// Read a geometry file with the default [`GeometryReaderOptions`].
    pub fn read<R: Read + Seek>(reader: R) -> Result<GeometryDocument> {
        Self::read_with_options(reader, GeometryReaderOptions::default())
    }

    pub fn read_with_options<R: Read + Seek>(
        reader: R,
        options: GeometryReaderOptions,
    ) -> Result<GeometryDocument> {
        read_geometry(&mut ByteCursor::new(reader)?, &options)
    }

    /// Format version declared by the header
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Polygon group by id
    pub fn get(&self, id: u64) -> Option<&PolygonGroup> {
        self.groups.get(&id)
    }

    /// Polygon groups in file order
    pub fn groups(&self) -> impl Iterator<Item = &PolygonGroup> {
        self.groups.values()
    }

    /// Number of polygon groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a complete SCPG file at the cursor position.
///
/// A group whose id repeats an earlier one replaces it, keeping the earlier position.
#[instrument(level = "debug", skip_all)]
pub fn read_geometry<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    options: &GeometryReaderOptions,
) -> Result<GeometryDocument> {
    let header: GeometryHeader = cursor.read_header("SCPG")?;
    debug!(
        version = header.version,
        nodes = header.node_count,
        reserved = header.reserved,
        "geometry header"
    );

    let mut groups = IndexMap::new();
    for _ in 0..header.node_count {
        let offset = cursor.tell()?;
        let node = read_archive(cursor)?;

        match node.get("##name").and_then(KAValue::as_str) {
            Some(POLYGON_GROUP) => {}
            name if options.skip_foreign_nodes => {
                trace!(offset, ?name, "skipping node");
                continue;
            }
            name => {
                return Err(Error::ForeignNode {
                    name: name.unwrap_or_default().to_string(),
                    offset,
                })
            }
        }

        let group = PolygonGroup::from_archive(&node, offset, options)?;
        groups.insert(group.id, group);
    }

    Ok(GeometryDocument { header, groups })
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::primitive::Primitives;
    use crate::read::{GeometryDocument, GeometryReaderOptions};
    use crate::vertex::VertexFlags;

    enum Value<'a> {
        U32(u32),
        Bytes(&'a [u8]),
        Str(&'a str),
    }

    fn node(pairs: &[(&str, Value)]) -> Vec<u8> {
        let mut out = b"KA".to_vec();
        out.extend(1u16.to_le_bytes());
        out.extend((pairs.len() as u32).to_le_bytes());
        for (key, value) in pairs {
            out.push(0x04);
            out.extend((key.len() as u32).to_le_bytes());
            out.extend(key.as_bytes());
            match value {
                Value::U32(v) => {
                    out.push(0x07);
                    out.extend(v.to_le_bytes());
                }
                Value::Bytes(v) => {
                    out.push(0x06);
                    out.extend((v.len() as u32).to_le_bytes());
                    out.extend(*v);
                }
                Value::Str(v) => {
                    out.push(0x04);
                    out.extend((v.len() as u32).to_le_bytes());
                    out.extend(v.as_bytes());
                }
            }
        }
        out
    }

    fn file(nodes: &[Vec<u8>]) -> Vec<u8> {
        let mut out = b"SCPG".to_vec();
        out.extend(1u32.to_le_bytes());
        out.extend((nodes.len() as u32).to_le_bytes());
        out.extend(0u32.to_le_bytes());
        for node in nodes {
            out.extend(node);
        }
        out
    }

    #[rustfmt::skip]
    const TRIANGLE_INDICES: [u8; 12] = [
        0x00, 0x00, 0x01, 0x00, 0x02, 0x00,
        0x02, 0x00, 0x01, 0x00, 0x00, 0x00,
    ];

    fn group(id: &[u8], packing: u32, vertices: &[u8], vertex_count: u32) -> Vec<u8> {
        indexed_group(id, packing, vertices, vertex_count, 0, &TRIANGLE_INDICES, 1)
    }

    /// A group declaring six indices in `index_format`, stored in `indices`
    fn indexed_group(
        id: &[u8],
        packing: u32,
        vertices: &[u8],
        vertex_count: u32,
        index_format: u32,
        indices: &[u8],
        primitive_type: u32,
    ) -> Vec<u8> {
        node(&[
            ("##name", Value::Str("PolygonGroup")),
            ("#id", Value::Bytes(id)),
            ("vertexFormat", Value::U32(VertexFlags::VERTEX.bits())),
            ("vertexCount", Value::U32(vertex_count)),
            ("packing", Value::U32(packing)),
            ("vertices", Value::Bytes(vertices)),
            ("indexFormat", Value::U32(index_format)),
            ("indexCount", Value::U32(6)),
            ("indices", Value::Bytes(indices)),
            ("rhi_primitiveType", Value::U32(primitive_type)),
            ("primitiveCount", Value::U32(2)),
        ])
    }

    fn positions(count: u8) -> Vec<u8> {
        (0..count)
            .flat_map(|i| [f32::from(i), 0.0, 1.0])
            .flat_map(f32::to_le_bytes)
            .collect()
    }

    #[traced_test]
    #[test]
    fn read_polygon_group() -> Result<()> {
        let input = file(&[group(&[0x2A, 0x00], 0, &positions(3), 3)]);
        let geometry = GeometryDocument::read(Cursor::new(input))?;

        assert_eq!(geometry.len(), 1);
        let group = geometry.get(42).unwrap();
        assert_eq!(group.positions(), [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [2.0, 0.0, 1.0]]);
        assert_eq!(group.indices, [0, 1, 2, 2, 1, 0]);
        assert_eq!(group.primitives, Primitives::Triangles(vec![[0, 1, 2], [2, 1, 0]]));
        assert_eq!(group.cube_texture_coord_count, None);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn vertex_blob_size_must_match_stride() {
        // Two records with a stride of 12 need 24 bytes
        let input = file(&[group(&[0x01], 0, &[0u8; 20], 2)]);
        let error = GeometryDocument::read(Cursor::new(input)).unwrap_err();

        assert!(matches!(
            error,
            Error::SizeMismatch {
                field: "vertices",
                expected: 24,
                actual: 20,
                offset: 16
            }
        ));
    }

    #[traced_test]
    #[test]
    fn packed_vertices_are_rejected() {
        let input = file(&[group(&[0x01], 1, &positions(3), 3)]);
        let error = GeometryDocument::read(Cursor::new(input)).unwrap_err();

        assert!(matches!(
            error,
            Error::UnsupportedPacking {
                packing: 1,
                offset: 16
            }
        ));
    }

    #[traced_test]
    #[test]
    fn packing_is_checked_before_blobs() {
        // Blobs are inconsistent, packing must still be reported first
        let input = file(&[group(&[0x01], 7, &[0u8; 5], 3)]);
        let error = GeometryDocument::read(Cursor::new(input)).unwrap_err();

        assert!(matches!(error, Error::UnsupportedPacking { packing: 7, .. }));
    }

    #[traced_test]
    #[test]
    fn unsupported_primitive_type() {
        let node = indexed_group(&[0x01], 0, &positions(3), 3, 0, &TRIANGLE_INDICES, 3);
        let error = GeometryDocument::read(Cursor::new(file(&[node]))).unwrap_err();

        assert!(matches!(
            error,
            Error::UnsupportedPrimitiveType {
                primitive_type: 3,
                offset: 16
            }
        ));
        assert_eq!(error.offset(), Some(16));
    }

    #[traced_test]
    #[test]
    fn unsupported_index_format() {
        let node = indexed_group(&[0x01], 0, &positions(3), 3, 2, &TRIANGLE_INDICES, 1);
        let error = GeometryDocument::read(Cursor::new(file(&[node]))).unwrap_err();

        assert!(matches!(
            error,
            Error::UnsupportedIndexFormat {
                format: 2,
                offset: 16
            }
        ));
    }

    #[traced_test]
    #[test]
    fn index_blob_shorter_than_declared() {
        // Six u16 indices need 12 bytes
        let node = indexed_group(&[0x01], 0, &positions(3), 3, 0, &TRIANGLE_INDICES[..10], 1);
        let error = GeometryDocument::read(Cursor::new(file(&[node]))).unwrap_err();

        assert!(matches!(
            error,
            Error::SizeMismatch {
                field: "indices",
                expected: 12,
                actual: 10,
                offset: 16
            }
        ));

        // The same blob read as u32 indices is short as well
        let node = indexed_group(&[0x01], 0, &positions(3), 3, 1, &TRIANGLE_INDICES, 1);
        let error = GeometryDocument::read(Cursor::new(file(&[node]))).unwrap_err();

        assert!(matches!(
            error,
            Error::SizeMismatch {
                field: "indices",
                expected: 24,
                actual: 12,
                offset: 16
            }
        ));
    }

    #[traced_test]
    #[test]
    fn foreign_nodes() -> Result<()> {
        let other = node(&[("##name", Value::Str("Material"))]);
        let input = file(&[other, group(&[0x05], 0, &positions(3), 3)]);

        let geometry = GeometryDocument::read(Cursor::new(input.clone()))?;
        assert_eq!(geometry.groups.keys().copied().collect::<Vec<_>>(), [5]);

        let options = GeometryReaderOptions::builder()
            .skip_foreign_nodes(false)
            .build();
        let error = GeometryDocument::read_with_options(Cursor::new(input), options).unwrap_err();
        assert!(matches!(error, Error::ForeignNode { offset: 16, .. }));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn missing_field() {
        let input = file(&[node(&[
            ("##name", Value::Str("PolygonGroup")),
            ("#id", Value::U32(1)),
        ])]);
        let error = GeometryDocument::read(Cursor::new(input)).unwrap_err();

        assert!(matches!(
            error,
            Error::MissingField {
                field: "vertexFormat",
                ..
            }
        ));
    }

    #[traced_test]
    #[test]
    fn bad_magic() {
        let mut input = file(&[]);
        input[0] = b'X';

        let error = GeometryDocument::read(Cursor::new(input)).unwrap_err();
        assert!(matches!(
            error,
            Error::Archive(dava_ka::Error::MagicMismatch {
                expected: "SCPG",
                offset: 0
            })
        ));
        assert_eq!(error.offset(), Some(0));
    }
}
