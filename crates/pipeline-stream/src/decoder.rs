/// Incremental line decoder for a chunked UTF-8 response body.
///
/// Bytes are buffered until a `\n` terminator arrives and only complete lines
/// are decoded, so a multi-byte character split across two chunks is decoded
/// once both halves are present. `\n` never occurs inside a UTF-8 multi-byte
/// sequence, which makes byte-level splitting safe.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every frame it completed, in order.
    ///
    /// Frames exclude their terminator; a single trailing `\r` is stripped.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        let scan_from = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        for idx in scan_from..self.pending.len() {
            if self.pending[idx] == b'\n' {
                frames.push(decode_frame(&self.pending[start..idx]));
                start = idx + 1;
            }
        }
        self.pending.drain(..start);
        frames
    }

    /// Ends the stream and flushes the unterminated tail, if any.
    ///
    /// A non-empty tail is returned as a final frame rather than dropped.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let tail = std::mem::take(&mut self.pending);
        Some(decode_frame(&tail))
    }

    /// Number of buffered bytes not yet terminated by `\n`.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_frame(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
