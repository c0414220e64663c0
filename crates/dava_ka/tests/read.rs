use std::io::{Cursor, Seek, SeekFrom};

use dava_ka::{error::Error, AABBox3, ArchiveVersion, KAValue, KeyedArchive};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

/// Minimal V1 encoder covering the value types exercised below
#[derive(Default)]
struct ArchiveBuilder {
    count: u32,
    body: Vec<u8>,
}

impl ArchiveBuilder {
    fn string(&mut self, tag: u8, value: &str) -> &mut Self {
        self.body.push(tag);
        self.body.extend((value.len() as u32).to_le_bytes());
        self.body.extend(value.as_bytes());
        self
    }

    fn key(&mut self, key: &str) -> &mut Self {
        self.count += 1;
        self.string(0x04, key)
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.body.push(0x07);
        self.body.extend(value.to_le_bytes());
        self
    }

    fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.body.push(0x06);
        self.body.extend((value.len() as u32).to_le_bytes());
        self.body.extend(value);
        self
    }

    fn floats(&mut self, tag: u8, values: &[f32]) -> &mut Self {
        self.body.push(tag);
        for value in values {
            self.body.extend(value.to_le_bytes());
        }
        self
    }

    fn archive(&mut self, nested: &[u8]) -> &mut Self {
        self.body.push(0x08);
        self.body.extend((nested.len() as u32).to_le_bytes());
        self.body.extend(nested);
        self
    }

    /// `levels` single element arrays wrapped around an empty one
    fn arrays(&mut self, levels: usize) -> &mut Self {
        for _ in 0..levels {
            self.body.push(0x1A);
            self.body.extend(1u32.to_le_bytes());
        }
        self.body.push(0x1A);
        self.body.extend(0u32.to_le_bytes());
        self
    }

    fn build(&self) -> Vec<u8> {
        let mut out = b"KA".to_vec();
        out.extend(1u16.to_le_bytes());
        out.extend(self.count.to_le_bytes());
        out.extend(&self.body);
        out
    }
}

fn polygon_group() -> Vec<u8> {
    let mut child = ArchiveBuilder::default();
    child.key("##name").string(0x04, "PolygonGroup");

    let mut root = ArchiveBuilder::default();
    root.key("#id").bytes(&[0x2A, 0x00, 0x00, 0x00]);
    root.key("vertexCount").u32(3);
    root.key("path").string(0x14, "~res:/3d/box.sc2");
    root.key("bbox")
        .floats(0x13, &[-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]);
    root.key("tint").floats(0x11, &[1.0, 0.5, 0.25, 1.0]);
    root.key("child").archive(&child.build());
    root.build()
}

#[traced_test]
#[test]
fn read_encoded_archive() -> Result<(), Error> {
    let archive = KeyedArchive::read(Cursor::new(polygon_group()))?;
    info!("decoded {} entries", archive.len());

    assert_eq!(archive.version(), ArchiveVersion::V1);
    assert_eq!(archive.len(), 6);
    assert_eq!(
        archive.get("#id").and_then(KAValue::as_bytes),
        Some(&[0x2A, 0x00, 0x00, 0x00][..])
    );
    assert_eq!(archive.get("vertexCount").and_then(KAValue::as_u32), Some(3));
    assert_eq!(
        archive.get("path"),
        Some(&KAValue::FilePath("~res:/3d/box.sc2".into()))
    );
    assert_eq!(
        archive.get("bbox"),
        Some(&KAValue::AABBox3(AABBox3 {
            min: [-1.0; 3],
            max: [1.0; 3],
        }))
    );
    assert_eq!(archive.get("tint"), Some(&KAValue::Color([1.0, 0.5, 0.25, 1.0])));

    let child = archive.get("child").and_then(KAValue::as_archive).unwrap();
    assert_eq!(child.get("##name").and_then(KAValue::as_str), Some("PolygonGroup"));

    let keys = archive
        .keys()
        .filter_map(KAValue::as_str)
        .collect::<Vec<_>>();
    assert_eq!(keys, ["#id", "vertexCount", "path", "bbox", "tint", "child"]);

    Ok(())
}

#[traced_test]
#[test]
fn read_archive_embedded_in_larger_stream() -> Result<(), Error> {
    let mut data = vec![0xEE; 16];
    data.extend(polygon_group());
    // Corrupt the tag of the first key so the error offset can be checked
    data[16 + 8] = 0x7F;

    let mut reader = Cursor::new(data);
    reader.seek(SeekFrom::Start(16))?;

    let error = KeyedArchive::read(&mut reader).unwrap_err();
    assert!(matches!(error, Error::UnknownTag { tag: 0x7F, offset: 24 }));
    assert_eq!(error.offset(), Some(24));

    Ok(())
}

#[traced_test]
#[test]
fn every_truncation_fails_cleanly() {
    let data = polygon_group();

    for len in 0..data.len() {
        let error = KeyedArchive::from_bytes(&data[..len]).unwrap_err();
        match error {
            Error::TruncatedInput { offset } => assert!(offset <= len as u64),
            Error::MagicMismatch { .. } if len < 2 => {}
            other => panic!("unexpected error for length {len}: {other:?}"),
        }
    }
}

#[traced_test]
#[test]
fn deeply_nested_arrays_are_rejected() {
    let mut root = ArchiveBuilder::default();
    root.key("deep").arrays(200_000);
    let data = root.build();

    // Header (8) and the "deep" key (9) come before the first array tag
    let error = KeyedArchive::from_bytes(&data).unwrap_err();
    assert!(matches!(
        error,
        Error::NestingTooDeep {
            limit: 256,
            offset: 1297
        }
    ));
}
