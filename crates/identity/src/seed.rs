use crate::IdentityError;

/// Deterministic byte stream that repeats a seed cyclically.
///
/// Reads continue where the previous read stopped, so two readers built from
/// the same seed yield the same bytes for the same sequence of reads.
#[derive(Debug, Clone)]
pub struct SeedReader {
    seed: Vec<u8>,
    position: usize,
}

impl SeedReader {
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        Self {
            seed: seed.into(),
            position: 0,
        }
    }

    /// Fill `buf` with the next bytes of the stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, IdentityError> {
        if self.seed.is_empty() {
            return Err(IdentityError::InvalidSeed);
        }
        if buf.is_empty() {
            return Err(IdentityError::InvalidBuffer);
        }

        let seed = self.seed.iter().copied().cycle().skip(self.position);
        for (slot, byte) in buf.iter_mut().zip(seed) {
            *slot = byte;
        }
        self.position = (self.position + buf.len()) % self.seed.len();
        Ok(buf.len())
    }
}
