//! This library handles reading **SFV2** scene files used by the *DAVA* engine.
//!
//! # SFV2 Format Documentation
//!
//! Scene files (usually with the `.sc2` extension) describe a scene graph as a
//! list of keyed archive nodes, see [`dava_ka`]. The geometry they reference
//! lives in separate SCPG files.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "SFV2"                                            |
//! | 0x0004         | Version                | 4 bytes: Format version                                    |
//! | 0x0008         | Node Count             | 4 bytes: Declared node count                               |
//!
//! The sections after the header depend on the version. A section is simply
//! absent from files older than the version that introduced it.
//!
//! ### Version Tags (version 14 and later)
//!
//! One keyed archive.
//!
//! ### Descriptor (version 10 and later)
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Size                   | 4 bytes: Size of the descriptor including this field       |
//! | 0x0004         | File Type              | 4 bytes: 0 for a scene, 1 for a model                      |
//! | 0x0008         | Payload                | (Size - 8) bytes: Not interpreted                          |
//!
//! ### Data Nodes (version 2 and later)
//!
//! A 4 byte node count followed by that many keyed archives. Each archive
//! carries its own keyed archive version.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.sc2`
//! - **Endianness**: Little-endian for all multi-byte values
//!

pub mod error;
pub mod read;
pub mod types;

pub use read::SceneDocument;
pub use types::{Descriptor, DescriptorFileType, SceneHeader};
