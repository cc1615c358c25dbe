//! Line and byte cursor over a fully loaded file.
//!
//! Several formats interleave text header lines with raw binary payloads, so
//! readers walk the raw bytes and decode one line at a time.

use std::borrow::Cow;

pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Next line without its terminator (`\n` or `\r\n`). `None` at end of input.
    pub fn read_line(&mut self) -> Option<Cow<'a, str>> {
        if self.is_empty() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let (line, advance) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Some(String::from_utf8_lossy(line))
    }

    /// Exactly `n` raw bytes, or `None` when fewer remain.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        if end > self.data.len() {
            return None;
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Some(bytes)
    }

    /// Everything not consumed yet.
    pub fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos.min(self.data.len())..];
        self.pos = self.data.len();
        bytes
    }
}

pub(crate) fn f64_le(b: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&b[..8]);
    f64::from_le_bytes(buf)
}

pub(crate) fn f64_be(b: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&b[..8]);
    f64::from_be_bytes(buf)
}

pub(crate) fn f32_le(b: &[u8]) -> f32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&b[..4]);
    f32::from_le_bytes(buf)
}

pub(crate) fn i32_le(b: &[u8]) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&b[..4]);
    i32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_then_binary() {
        let mut bytes = b"Title: x\r\nBinary:\n".to_vec();
        bytes.extend_from_slice(&1.5f64.to_le_bytes());
        let mut cur = ByteCursor::new(&bytes);
        assert_eq!(cur.read_line().as_deref(), Some("Title: x"));
        assert_eq!(cur.read_line().as_deref(), Some("Binary:"));
        assert_eq!(f64_le(cur.take(8).unwrap()), 1.5);
        assert!(cur.take(1).is_none());
        assert!(cur.read_line().is_none());
    }
}
