use bytes::Bytes;

/// An immutable view over cached bytes.
///
/// Cloning is cheap (reference counted) and every accessor is read-only, so
/// views handed to concurrent readers stay valid even after the entry they
/// came from is evicted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    data: Bytes,
}

impl ByteView {
    /// Builds a view by copying `bytes`, detaching it from whatever buffer
    /// the caller may reuse afterwards.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(bytes),
        }
    }

    /// Length of the viewed value in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only access to the underlying bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The value rendered as a string, with invalid UTF-8 replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Consumes the view, yielding the shared immutable buffer. Used by the
    /// transport to hand the bytes to a response body without copying.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl From<Vec<u8>> for ByteView {
    /// Takes ownership of `bytes`; no copy is needed because the buffer can
    /// no longer be reached mutably.
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(bytes),
        }
    }
}

impl From<&str> for ByteView {
    fn from(value: &str) -> Self {
        Self::copy_from(value.as_bytes())
    }
}
