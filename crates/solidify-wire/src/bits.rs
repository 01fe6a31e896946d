//! Packed boolean vectors: eight flags per byte, most significant bit first.
//!
//! The element count is never written; callers carry it out of band.

use std::io::{Read, Write};

use crate::error::WireResult;
use crate::reader::WireReader;
use crate::writer::WireWriter;

/// Bytes needed to hold `len` packed booleans.
pub const fn packed_len(len: usize) -> usize {
    len.div_ceil(8)
}

impl<W: Write> WireWriter<W> {
    pub fn write_bools(&mut self, values: &[bool]) -> WireResult<()> {
        let mut buf = Vec::with_capacity(packed_len(values.len()));
        let mut chunks = values.chunks_exact(8);
        for chunk in &mut chunks {
            let mut byte = 0u8;
            for (i, &flag) in chunk.iter().enumerate() {
                if flag {
                    byte |= 0x80 >> i;
                }
            }
            buf.push(byte);
        }
        let tail = chunks.remainder();
        if !tail.is_empty() {
            let mut byte = 0u8;
            for (i, &flag) in tail.iter().enumerate() {
                if flag {
                    byte |= 0x80 >> i;
                }
            }
            buf.push(byte);
        }
        self.write_bytes(&buf)
    }
}

impl<R: Read> WireReader<R> {
    /// Read `len` packed booleans. Unused low bits of the last byte are ignored.
    pub fn read_bools(&mut self, len: usize) -> WireResult<Vec<bool>> {
        let raw = self.read_bytes(packed_len(len))?;
        let mut out = Vec::with_capacity(len);
        for (index, byte) in raw.iter().enumerate() {
            let take = (len - index * 8).min(8);
            out.extend((0..take).map(|bit| byte & (0x80 >> bit) != 0));
        }
        Ok(out)
    }
}
