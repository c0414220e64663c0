//! Vertex layouts derived from a vertex format mask.

use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian};

#[cfg(feature = "serde")]
use serde::Serialize;

bitflags! {
    /// Vertex format mask stored in the `vertexFormat` field of a polygon group
    ///
    /// Bits with no known attribute are retained but do not take part in the layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct VertexFlags: u32 {
        const VERTEX = 1;
        const NORMAL = 1 << 1;
        const COLOR = 1 << 2;
        const TEXCOORD0 = 1 << 3;
        const TEXCOORD1 = 1 << 4;
        const TEXCOORD2 = 1 << 5;
        const TEXCOORD3 = 1 << 6;
        const TANGENT = 1 << 7;
        const BINORMAL = 1 << 8;
        const HARD_JOINTINDEX = 1 << 9;
        const PIVOT4 = 1 << 10;
        const FLEXIBILITY = 1 << 12;
        const ANGLE_SIN_COS = 1 << 13;
        const JOINTINDEX = 1 << 14;
        const JOINTWEIGHT = 1 << 15;
        const CUBETEXCOORD0 = 1 << 16;
        const CUBETEXCOORD1 = 1 << 17;
        const CUBETEXCOORD2 = 1 << 18;
        const CUBETEXCOORD3 = 1 << 19;
    }
}

/// One attribute of a vertex record
///
/// Variants are declared in the order they are laid out within a record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum VertexAttribute {
    Position,
    Normal,
    Color,
    TexCoord0,
    TexCoord1,
    TexCoord2,
    TexCoord3,
    Tangent,
    Binormal,
    HardJointIndex,
    CubeTexCoord0,
    CubeTexCoord1,
    CubeTexCoord2,
    CubeTexCoord3,
    Pivot4,
    Flexibility,
    AngleSinCos,
    JointIndex,
    JointWeight,
}

impl VertexAttribute {
    /// Every attribute, in layout order
    pub const ALL: [VertexAttribute; 19] = [
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::Color,
        VertexAttribute::TexCoord0,
        VertexAttribute::TexCoord1,
        VertexAttribute::TexCoord2,
        VertexAttribute::TexCoord3,
        VertexAttribute::Tangent,
        VertexAttribute::Binormal,
        VertexAttribute::HardJointIndex,
        VertexAttribute::CubeTexCoord0,
        VertexAttribute::CubeTexCoord1,
        VertexAttribute::CubeTexCoord2,
        VertexAttribute::CubeTexCoord3,
        VertexAttribute::Pivot4,
        VertexAttribute::Flexibility,
        VertexAttribute::AngleSinCos,
        VertexAttribute::JointIndex,
        VertexAttribute::JointWeight,
    ];

    /// The mask bit that enables this attribute
    pub fn flag(self) -> VertexFlags {
        match self {
            VertexAttribute::Position => VertexFlags::VERTEX,
            VertexAttribute::Normal => VertexFlags::NORMAL,
            VertexAttribute::Color => VertexFlags::COLOR,
            VertexAttribute::TexCoord0 => VertexFlags::TEXCOORD0,
            VertexAttribute::TexCoord1 => VertexFlags::TEXCOORD1,
            VertexAttribute::TexCoord2 => VertexFlags::TEXCOORD2,
            VertexAttribute::TexCoord3 => VertexFlags::TEXCOORD3,
            VertexAttribute::Tangent => VertexFlags::TANGENT,
            VertexAttribute::Binormal => VertexFlags::BINORMAL,
            VertexAttribute::HardJointIndex => VertexFlags::HARD_JOINTINDEX,
            VertexAttribute::CubeTexCoord0 => VertexFlags::CUBETEXCOORD0,
            VertexAttribute::CubeTexCoord1 => VertexFlags::CUBETEXCOORD1,
            VertexAttribute::CubeTexCoord2 => VertexFlags::CUBETEXCOORD2,
            VertexAttribute::CubeTexCoord3 => VertexFlags::CUBETEXCOORD3,
            VertexAttribute::Pivot4 => VertexFlags::PIVOT4,
            VertexAttribute::Flexibility => VertexFlags::FLEXIBILITY,
            VertexAttribute::AngleSinCos => VertexFlags::ANGLE_SIN_COS,
            VertexAttribute::JointIndex => VertexFlags::JOINTINDEX,
            VertexAttribute::JointWeight => VertexFlags::JOINTWEIGHT,
        }
    }

    /// Size of the attribute in bytes
    pub fn size(self) -> u32 {
        match self {
            VertexAttribute::Color
            | VertexAttribute::HardJointIndex
            | VertexAttribute::Flexibility => 4,
            VertexAttribute::TexCoord0
            | VertexAttribute::TexCoord1
            | VertexAttribute::TexCoord2
            | VertexAttribute::TexCoord3
            | VertexAttribute::AngleSinCos => 2 * 4,
            VertexAttribute::Position
            | VertexAttribute::Normal
            | VertexAttribute::Tangent
            | VertexAttribute::Binormal
            | VertexAttribute::CubeTexCoord0
            | VertexAttribute::CubeTexCoord1
            | VertexAttribute::CubeTexCoord2
            | VertexAttribute::CubeTexCoord3 => 3 * 4,
            VertexAttribute::Pivot4 | VertexAttribute::JointIndex | VertexAttribute::JointWeight => {
                4 * 4
            }
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Byte layout of one vertex record
///
/// Each present attribute is placed at the running offset of the attributes
/// before it; the final running total is the stride.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VertexFormat {
    flags: VertexFlags,
    offsets: [Option<u32>; 19],
    stride: u32,
}

impl VertexFormat {
    pub fn new(mask: u32) -> Self {
        let flags = VertexFlags::from_bits_retain(mask);

        let mut offsets = [None; 19];
        let mut stride = 0;
        for attribute in VertexAttribute::ALL {
            if flags.contains(attribute.flag()) {
                offsets[attribute.index()] = Some(stride);
                stride += attribute.size();
            }
        }

        VertexFormat {
            flags,
            offsets,
            stride,
        }
    }

    /// The mask this layout was built from, unknown bits included
    pub fn flags(&self) -> VertexFlags {
        self.flags
    }

    /// Size of one vertex record in bytes
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Offset of `attribute` within a record, `None` when it is absent
    pub fn offset(&self, attribute: VertexAttribute) -> Option<u32> {
        self.offsets[attribute.index()]
    }

    pub fn has(&self, attribute: VertexAttribute) -> bool {
        self.offset(attribute).is_some()
    }

    /// Present attributes in layout order
    pub fn attributes(&self) -> impl Iterator<Item = VertexAttribute> + '_ {
        VertexAttribute::ALL
            .into_iter()
            .filter(|attribute| self.has(*attribute))
    }

    // `blob` must hold a whole number of records
    fn column<T>(
        &self,
        blob: &[u8],
        attribute: VertexAttribute,
        decode: impl Fn(&[u8]) -> T,
    ) -> Option<Vec<T>> {
        let start = self.offset(attribute)? as usize;
        let end = start + attribute.size() as usize;

        Some(
            blob.chunks_exact(self.stride as usize)
                .map(|record| decode(&record[start..end]))
                .collect(),
        )
    }
}

fn floats<const N: usize>(bytes: &[u8]) -> [f32; N] {
    let mut values = [0f32; N];
    LittleEndian::read_f32_into(bytes, &mut values);
    values
}

/// Attribute arrays decoded from a vertex blob
///
/// Absent attributes are `None`. Positions are empty when the format has no
/// position attribute.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VertexData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    /// Packed RGBA
    pub colors: Option<Vec<u32>>,
    pub texcoords: [Option<Vec<[f32; 2]>>; 4],
    pub tangents: Option<Vec<[f32; 3]>>,
    pub binormals: Option<Vec<[f32; 3]>>,
    pub hard_joint_indices: Option<Vec<f32>>,
    pub cube_texcoords: [Option<Vec<[f32; 3]>>; 4],
    pub pivots: Option<Vec<[f32; 4]>>,
    pub flexibilities: Option<Vec<f32>>,
    pub angles_sin_cos: Option<Vec<[f32; 2]>>,
    pub joint_indices: Option<Vec<[f32; 4]>>,
    pub joint_weights: Option<Vec<[f32; 4]>>,
}

impl VertexData {
    /// Decode the attributes of every record in `blob`.
    ///
    /// `blob` must be an exact multiple of the stride of `format`. With
    /// `all_attributes` unset only positions are decoded.
    pub fn decode(format: &VertexFormat, blob: &[u8], all_attributes: bool) -> VertexData {
        if format.stride() == 0 {
            return VertexData::default();
        }

        let positions = format
            .column(blob, VertexAttribute::Position, floats::<3>)
            .unwrap_or_default();

        if !all_attributes {
            return VertexData {
                positions,
                ..Default::default()
            };
        }

        use VertexAttribute as A;
        VertexData {
            positions,
            normals: format.column(blob, A::Normal, floats::<3>),
            colors: format.column(blob, A::Color, LittleEndian::read_u32),
            texcoords: [A::TexCoord0, A::TexCoord1, A::TexCoord2, A::TexCoord3]
                .map(|attribute| format.column(blob, attribute, floats::<2>)),
            tangents: format.column(blob, A::Tangent, floats::<3>),
            binormals: format.column(blob, A::Binormal, floats::<3>),
            hard_joint_indices: format.column(blob, A::HardJointIndex, LittleEndian::read_f32),
            cube_texcoords: [
                A::CubeTexCoord0,
                A::CubeTexCoord1,
                A::CubeTexCoord2,
                A::CubeTexCoord3,
            ]
            .map(|attribute| format.column(blob, attribute, floats::<3>)),
            pivots: format.column(blob, A::Pivot4, floats::<4>),
            flexibilities: format.column(blob, A::Flexibility, LittleEndian::read_f32),
            angles_sin_cos: format.column(blob, A::AngleSinCos, floats::<2>),
            joint_indices: format.column(blob, A::JointIndex, floats::<4>),
            joint_weights: format.column(blob, A::JointWeight, floats::<4>),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::vertex::{VertexAttribute, VertexData, VertexFlags, VertexFormat};

    #[test]
    fn position_normal_color_layout() {
        let mask = VertexFlags::VERTEX | VertexFlags::NORMAL | VertexFlags::COLOR;
        let format = VertexFormat::new(mask.bits());

        assert_eq!(format.stride(), 28);
        assert_eq!(format.offset(VertexAttribute::Position), Some(0));
        assert_eq!(format.offset(VertexAttribute::Normal), Some(12));
        assert_eq!(format.offset(VertexAttribute::Color), Some(24));
        assert_eq!(format.offset(VertexAttribute::TexCoord0), None);
    }

    #[test]
    fn cube_texcoords_precede_pivot() {
        let mask = VertexFlags::VERTEX
            | VertexFlags::HARD_JOINTINDEX
            | VertexFlags::PIVOT4
            | VertexFlags::CUBETEXCOORD1
            | VertexFlags::JOINTWEIGHT;
        let format = VertexFormat::new(mask.bits());

        assert_eq!(
            format.attributes().collect::<Vec<_>>(),
            [
                VertexAttribute::Position,
                VertexAttribute::HardJointIndex,
                VertexAttribute::CubeTexCoord1,
                VertexAttribute::Pivot4,
                VertexAttribute::JointWeight,
            ]
        );
        assert_eq!(format.offset(VertexAttribute::HardJointIndex), Some(12));
        assert_eq!(format.offset(VertexAttribute::CubeTexCoord1), Some(16));
        assert_eq!(format.offset(VertexAttribute::Pivot4), Some(28));
        assert_eq!(format.offset(VertexAttribute::JointWeight), Some(44));
        assert_eq!(format.stride(), 60);
    }

    #[test]
    fn every_attribute_stride() {
        let format = VertexFormat::new(VertexFlags::all().bits());
        assert_eq!(format.stride(), 196);
    }

    #[test]
    fn unknown_bits_are_kept_but_ignored() {
        let format = VertexFormat::new(1 | 1 << 11 | 1 << 31);

        assert_eq!(format.stride(), 12);
        assert_eq!(format.flags().bits(), 1 | 1 << 11 | 1 << 31);
        assert_eq!(format.attributes().count(), 1);
    }

    #[test]
    fn decode_interleaved_records() {
        let mask = VertexFlags::VERTEX | VertexFlags::COLOR | VertexFlags::TEXCOORD0;
        let format = VertexFormat::new(mask.bits());
        assert_eq!(format.stride(), 24);

        let mut blob = Vec::new();
        for i in 0..2u8 {
            let base = f32::from(i);
            for value in [base, base + 0.5, -base] {
                blob.extend(value.to_le_bytes());
            }
            blob.extend([0xFF, 0x00, 0x00, i]);
            for value in [0.25, 0.75] {
                blob.extend(f32::to_le_bytes(value));
            }
        }

        let data = VertexData::decode(&format, &blob, true);
        assert_eq!(data.positions, [[0.0, 0.5, -0.0], [1.0, 1.5, -1.0]]);
        assert_eq!(data.colors, Some(vec![0x0000_00FF, 0x0100_00FF]));
        assert_eq!(data.texcoords[0], Some(vec![[0.25, 0.75]; 2]));
        assert_eq!(data.texcoords[1], None);
        assert_eq!(data.normals, None);

        let positions_only = VertexData::decode(&format, &blob, false);
        assert_eq!(positions_only.positions, data.positions);
        assert_eq!(positions_only.colors, None);
    }
}
