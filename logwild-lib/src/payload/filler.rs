use super::PayloadSource;

/// Deterministic payload of exactly the requested size,
/// made out of a single repeated (printable ASCII) filler byte.
#[derive(Debug, Clone, Copy)]
pub struct FillerPayload {
    byte: u8,
}

impl FillerPayload {
    /// Create a filler payload using the given byte.
    ///
    /// Non printable or non ASCII bytes fall back to `'x'`,
    /// so every produced payload is valid single-line UTF-8.
    pub fn new(byte: u8) -> Self {
        let byte = if byte.is_ascii_graphic() { byte } else { b'x' };
        Self { byte }
    }
}

impl Default for FillerPayload {
    fn default() -> Self {
        Self::new(b'x')
    }
}

impl PayloadSource for FillerPayload {
    fn produce(&self, size: usize) -> String {
        char::from(self.byte).to_string().repeat(size)
    }
}
