//! Chunk-boundary safe UTF-8 decoding.
//!
//! Network chunks may end in the middle of a multi-byte character. The tail
//! of such a chunk is held back and prepended to the next one.

/// Incremental UTF-8 decoder that carries incomplete sequences between calls.
#[derive(Debug, Default)]
pub(crate) struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    /// Decode `chunk` into `out`. Invalid sequences become U+FFFD; an
    /// incomplete trailing sequence is kept for the next call.
    pub(crate) fn decode_into(&mut self, chunk: &[u8], out: &mut String) {
        let joined: Vec<u8>;
        let mut input: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut carried = std::mem::take(&mut self.pending);
            carried.extend_from_slice(chunk);
            joined = carried;
            &joined
        };

        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&input[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &input[valid + len..];
                        }
                        None => {
                            self.pending = input[valid..].to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Flush a dangling partial sequence at end of input.
    pub(crate) fn finish_into(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    /// True while an incomplete sequence is held back.
    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
