//! Sequential little endian reader used by every decoder in the workspace.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use binrw::{meta::ReadEndian, BinRead};
use byteorder::{LittleEndian, ReadBytesExt};
use widestring::U16String;

use crate::error::{Error, Result};

/// A bounded, position aware reader over a byte source.
///
/// Every read is checked against the end of the source before any byte is
/// consumed, so a short source fails with [`Error::TruncatedInput`] and never
/// yields a partial value. Offsets reported by [`ByteCursor::tell`] and carried
/// by errors are absolute: a cursor created for a nested slice remembers where
/// that slice started in the outer source.
///
/// The cursor borrows nothing it does not own; pass `&mut File` to keep
/// ownership of a file handle with the caller.
#[derive(Debug)]
pub struct ByteCursor<R> {
    reader: R,
    base: u64,
    len: u64,
    depth: u32,
}

/// Deepest chain of arrays and nested archives a cursor will descend into
pub const MAX_NESTING: u32 = 256;

impl<'a> ByteCursor<Cursor<&'a [u8]>> {
    /// Create a cursor over an in-memory buffer.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        ByteCursor {
            len: data.len() as u64,
            reader: Cursor::new(data),
            base: 0,
            depth: 0,
        }
    }
}

impl ByteCursor<Cursor<Vec<u8>>> {
    /// Create a cursor over an owned slice that started at `base` in its parent source.
    pub fn nested(data: Vec<u8>, base: u64) -> Self {
        ByteCursor {
            len: data.len() as u64,
            reader: Cursor::new(data),
            base,
            depth: 0,
        }
    }

    /// Carry the nesting depth of the cursor this slice was read from.
    pub fn within<P>(mut self, parent: &ByteCursor<P>) -> Self {
        self.depth = parent.depth;
        self
    }
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Wrap a reader, reading from its current position up to its end.
    pub fn new(mut reader: R) -> Result<Self> {
        let start = reader.stream_position()?;
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        Ok(ByteCursor {
            reader,
            base: 0,
            len,
            depth: 0,
        })
    }

    /// Absolute offset of the next byte to be read.
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.base + self.reader.stream_position()?)
    }

    /// Move to an absolute offset previously returned by [`ByteCursor::tell`]
    /// or computed from a header declared length.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        let local = offset
            .checked_sub(self.base)
            .filter(|local| *local <= self.len)
            .ok_or(Error::TruncatedInput { offset })?;
        self.reader.seek(SeekFrom::Start(local))?;
        Ok(())
    }

    /// Number of bytes left before the end of the source.
    pub fn remaining(&mut self) -> Result<u64> {
        let pos = self.reader.stream_position()?;
        Ok(self.len.saturating_sub(pos))
    }

    /// Descend one level into a container value whose tag was read at `offset`.
    ///
    /// Fails with [`Error::NestingTooDeep`] once [`MAX_NESTING`] levels are open.
    pub fn enter(&mut self, offset: u64) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(Error::NestingTooDeep {
                limit: MAX_NESTING,
                offset,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Close the level opened by the matching [`ByteCursor::enter`].
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Unwrap and return the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn ensure(&mut self, width: u64) -> Result<()> {
        let pos = self.reader.stream_position()?;
        match pos.checked_add(width) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(Error::TruncatedInput {
                offset: self.base + pos,
            }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.reader.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.reader.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.reader.read_u16::<LittleEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.reader.read_i16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.reader.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.reader.read_i32::<LittleEndian>()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.reader.read_u64::<LittleEndian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        Ok(self.reader.read_i64::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.reader.read_f32::<LittleEndian>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.reader.read_f64::<LittleEndian>()?)
    }

    /// Read `N` consecutive f32 values.
    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        self.ensure(4 * N as u64)?;
        let mut values = [0f32; N];
        self.reader.read_f32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    /// Read exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
        self.ensure(len)?;
        let mut buffer = Vec::with_capacity(len as usize);
        self.reader.by_ref().take(len).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Read `len` bytes and decode them as UTF-8.
    pub fn read_string(&mut self, len: u64) -> Result<String> {
        let offset = self.tell()?;
        String::from_utf8(self.read_bytes(len)?)
            .map_err(|source| Error::InvalidString { offset, source })
    }

    /// Read `len` UTF-16 code units (`len * 2` bytes).
    pub fn read_wide_string(&mut self, len: u64) -> Result<U16String> {
        let bytes = len.checked_mul(2).ok_or(Error::TruncatedInput {
            offset: self.tell()?,
        })?;
        self.ensure(bytes)?;

        let mut units = vec![0u16; len as usize];
        self.reader.read_u16_into::<LittleEndian>(&mut units)?;
        Ok(U16String::from_vec(units))
    }

    /// Read a fixed `binrw` header whose first field is the magic `expected`.
    pub fn read_header<T>(&mut self, expected: &'static str) -> Result<T>
    where
        T: BinRead + ReadEndian,
        for<'a> T::Args<'a>: Default,
    {
        let offset = self.tell()?;
        T::read_args(self, Default::default())
            .map_err(|error| Error::from_header(error, expected, offset))
    }
}

impl<R: Read> Read for ByteCursor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R: Seek> Seek for ByteCursor<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}
