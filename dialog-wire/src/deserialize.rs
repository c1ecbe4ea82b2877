//! Decoding side of the codec: [`Cursor`], [`Deserializable`] and the
//! primitive impls.

use crate::serialize::{LONG_LEN_MARKER, padding};

// ─── Error ───────────────────────────────────────────────────────────────────

/// Errors that can occur during deserialization.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Ran out of bytes before the type was fully read.
    #[error("unexpected end of buffer")]
    UnexpectedEof,
    /// Decoded a constructor ID that doesn't match any known variant.
    #[error("unexpected constructor id: {id:#010x}")]
    UnexpectedConstructor { id: u32 },
    /// A closed enum carried a value outside its variant set.
    #[error("unknown {ty} value: {value}")]
    UnknownEnumValue { ty: &'static str, value: i32 },
    /// A string field did not hold valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    /// A complete value was read but bytes were left over.
    #[error("{remaining} trailing bytes after value")]
    TrailingBytes { remaining: usize },
}

/// Specialized `Result` for deserialization.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// A zero-copy cursor over an in-memory byte slice.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the start of `buf`.
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize { self.pos }

    /// Remaining bytes.
    pub fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        match self.buf.get(self.pos).copied() {
            Some(b) => { self.pos += 1; Ok(b) }
            None    => Err(Error::UnexpectedEof),
        }
    }

    /// Read exactly `out.len()` bytes.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        let end = self.pos + out.len();
        let src = self.buf.get(self.pos..end).ok_or(Error::UnexpectedEof)?;
        out.copy_from_slice(src);
        self.pos = end;
        Ok(())
    }
}

/// Shorthand used by the schema types.
pub type Buffer<'a, 'b> = &'a mut Cursor<'b>;

// ─── Deserializable ──────────────────────────────────────────────────────────

/// Deserialize a value from the binary wire format.
pub trait Deserializable: Sized {
    /// Read `Self` from `buf`, advancing its position.
    fn deserialize(buf: Buffer) -> Result<Self>;

    /// Decode a whole message. Unlike [`deserialize`](Self::deserialize),
    /// leftover bytes are an error.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::from_slice(bytes);
        let value = Self::deserialize(&mut cursor)?;
        match cursor.remaining() {
            0 => Ok(value),
            remaining => Err(Error::TrailingBytes { remaining }),
        }
    }
}

// ─── Primitives ───────────────────────────────────────────────────────────────

macro_rules! little_endian {
    ($($ty:ty),+) => {$(
        impl Deserializable for $ty {
            fn deserialize(buf: Buffer) -> Result<Self> {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                buf.read_exact(&mut raw)?;
                Ok(<$ty>::from_le_bytes(raw))
            }
        }
    )+};
}

little_endian!(i32, u32, i64);

impl Deserializable for bool {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            crate::BOOL_TRUE  => Ok(true),
            crate::BOOL_FALSE => Ok(false),
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}

// ─── Byte strings ─────────────────────────────────────────────────────────────

impl Deserializable for Vec<u8> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let (len, header_len) = match buf.read_byte()? {
            LONG_LEN_MARKER => {
                let mut raw = [0u8; 4];
                buf.read_exact(&mut raw[..3])?;
                (u32::from_le_bytes(raw) as usize, 4)
            }
            short => (short as usize, 1),
        };
        if len > buf.remaining() {
            return Err(Error::UnexpectedEof);
        }

        let mut data = vec![0u8; len];
        buf.read_exact(&mut data)?;
        let mut pad = [0u8; 3];
        buf.read_exact(&mut pad[..padding(header_len + len)])?;
        Ok(data)
    }
}

impl Deserializable for String {
    fn deserialize(buf: Buffer) -> Result<Self> {
        String::from_utf8(Vec::<u8>::deserialize(buf)?).map_err(|_| Error::InvalidUtf8)
    }
}

// ─── Containers ───────────────────────────────────────────────────────────────

impl<T: Deserializable> Deserializable for Vec<T> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            crate::VECTOR_ID => {}
            id => return Err(Error::UnexpectedConstructor { id }),
        }
        let count = i32::deserialize(buf)?;
        // Every item takes at least one byte; a larger count is a corrupt header.
        let count = usize::try_from(count)
            .ok()
            .filter(|&n| n <= buf.remaining())
            .ok_or(Error::UnexpectedEof)?;
        (0..count).map(|_| T::deserialize(buf)).collect()
    }
}

impl<T: Deserializable> Deserializable for Option<T> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match bool::deserialize(buf)? {
            true  => T::deserialize(buf).map(Some),
            false => Ok(None),
        }
    }
}
