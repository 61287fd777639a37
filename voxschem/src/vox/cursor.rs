use crate::vox::DecodeError;

/// Sequential reader of typed values from a byte buffer.
///
/// All multi-byte values in `.vox` data are little-endian.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Constructs a cursor over the entire contents of a file.
    ///
    /// Fails with [`DecodeError::ContentNotLoaded`] if there are no contents.
    pub fn for_file(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            Err(DecodeError::ContentNotLoaded)
        } else {
            Ok(Self::new(bytes))
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads `length` bytes without interpreting them.
    pub fn read_raw(&mut self, length: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if length > available {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed: length,
                available,
            });
        }
        let slice = &self.bytes[self.offset..][..length];
        self.offset += length;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.read_raw(N)?;
        let mut array = [0; N];
        array.copy_from_slice(slice);
        Ok(array)
    }

    #[cfg(test)]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_array()?;
        Ok(byte)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Reads an `i32` which is a count or length and therefore must not be negative.
    /// `on_negative` produces the error to report if it is.
    pub fn read_len(
        &mut self,
        on_negative: impl FnOnce() -> DecodeError,
    ) -> Result<usize, DecodeError> {
        let value = self.read_i32()?;
        usize::try_from(value).map_err(|_| on_negative())
    }
}
