//! Encoding side of the codec.
//!
//! Integers are little-endian. Byte strings carry a short or long length
//! header and are zero-padded so the next field starts on a 4-byte boundary.

/// A value with a binary wire form.
pub trait Serializable {
    /// Append the encoded form of `self` to `buf`.
    fn serialize(&self, buf: &mut impl Extend<u8>);

    /// Encode into a new buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.serialize(&mut out);
        out
    }
}

macro_rules! little_endian {
    ($($ty:ty),+) => {$(
        impl Serializable for $ty {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                buf.extend(self.to_le_bytes());
            }
        }
    )+};
}

little_endian!(i32, u32, i64);

/// Encoded as the `boolTrue` / `boolFalse` constructor ids.
impl Serializable for bool {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let id = if *self { crate::BOOL_TRUE } else { crate::BOOL_FALSE };
        id.serialize(buf);
    }
}

// ─── Byte strings ─────────────────────────────────────────────────────────────

/// Longest payload that fits the one-byte length header.
pub(crate) const SHORT_LEN_MAX: usize = 253;
/// Marker byte introducing a three-byte length.
pub(crate) const LONG_LEN_MARKER: u8 = 0xfe;
/// Longest byte string the three-byte length header can describe.
///
/// Callers must keep payloads within this bound; longer ones cannot be
/// encoded without losing the length.
pub const MAX_BYTES_LEN: usize = 0x00ff_ffff;

/// Zero bytes needed after `written` bytes to reach a word boundary.
pub(crate) fn padding(written: usize) -> usize {
    (4 - written % 4) % 4
}

impl Serializable for &[u8] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let len = self.len();
        let header_len = if len <= SHORT_LEN_MAX {
            buf.extend([len as u8]);
            1
        } else {
            debug_assert!(len <= MAX_BYTES_LEN, "byte string of {len} bytes exceeds the wire limit");
            let [a, b, c, _] = (len as u32).to_le_bytes();
            buf.extend([LONG_LEN_MARKER, a, b, c]);
            4
        };
        buf.extend(self.iter().copied());
        buf.extend(std::iter::repeat_n(0u8, padding(header_len + len)));
    }
}

impl Serializable for Vec<u8> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_slice().serialize(buf);
    }
}

impl Serializable for String {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_bytes().serialize(buf);
    }
}

// ─── Containers ───────────────────────────────────────────────────────────────

/// Vector header, item count, then the items back to back.
impl<T: Serializable> Serializable for Vec<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        crate::VECTOR_ID.serialize(buf);
        (self.len() as i32).serialize(buf);
        self.iter().for_each(|item| item.serialize(buf));
    }
}

/// Presence flag, then the value if there is one.
impl<T: Serializable> Serializable for Option<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.is_some().serialize(buf);
        if let Some(value) = self {
            value.serialize(buf);
        }
    }
}
