use std::io::Write;

use crate::error::WireResult;

/// Byte written for a `true` boolean. `false` is `0x00`.
pub const TRUE_BYTE: u8 = 0x80;
/// Byte written for a `false` boolean.
pub const FALSE_BYTE: u8 = 0x00;

/// Sequential little-endian writer over any [`Write`] sink.
///
/// Counts the bytes it emits so callers can report how much a value cost
/// without wrapping the sink themselves. Packed encodings live in
/// [`crate::packed`], [`crate::float`] and [`crate::bits`] as further
/// `impl` blocks on this type.
#[derive(Debug)]
pub struct WireWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> WireWriter<W> {
    /// Wrap a sink, starting the byte count at zero.
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes written through this writer.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> WireResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Write a run of raw bytes. An empty run writes nothing.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> WireResult<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> WireResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> WireResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u16(&mut self, value: u16) -> WireResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> WireResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> WireResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> WireResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> WireResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Raw IEEE-754 bits, payload preserved.
    pub fn write_f32(&mut self, value: f32) -> WireResult<()> {
        self.write_u32(value.to_bits())
    }

    /// Raw IEEE-754 bits, payload preserved.
    pub fn write_f64(&mut self, value: f64) -> WireResult<()> {
        self.write_bytes(&value.to_bits().to_le_bytes())
    }

    /// Single byte: `0x80` for `true`, `0x00` for `false`.
    pub fn write_bool(&mut self, value: bool) -> WireResult<()> {
        self.write_u8(if value { TRUE_BYTE } else { FALSE_BYTE })
    }

    /// UTF-16 code unit, two bytes.
    pub fn write_char(&mut self, value: u16) -> WireResult<()> {
        self.write_u16(value)
    }

    /// UTF-8 bytes of `value` with no length prefix.
    pub fn write_utf8(&mut self, value: &str) -> WireResult<()> {
        self.write_bytes(value.as_bytes())
    }

    pub fn write_i16s(&mut self, values: &[i16]) -> WireResult<()> {
        let mut buf = Vec::with_capacity(values.len() * 2);
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        self.write_bytes(&buf)
    }

    pub fn write_i32s(&mut self, values: &[i32]) -> WireResult<()> {
        let mut buf = Vec::with_capacity(values.len() * 4);
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        self.write_bytes(&buf)
    }

    pub fn write_i64s(&mut self, values: &[i64]) -> WireResult<()> {
        let mut buf = Vec::with_capacity(values.len() * 8);
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        self.write_bytes(&buf)
    }

    pub fn write_f32s(&mut self, values: &[f32]) -> WireResult<()> {
        let mut buf = Vec::with_capacity(values.len() * 4);
        for v in values {
            buf.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        self.write_bytes(&buf)
    }

    pub fn write_f64s(&mut self, values: &[f64]) -> WireResult<()> {
        let mut buf = Vec::with_capacity(values.len() * 8);
        for v in values {
            buf.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        self.write_bytes(&buf)
    }

    pub fn write_chars(&mut self, values: &[u16]) -> WireResult<()> {
        let mut buf = Vec::with_capacity(values.len() * 2);
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        self.write_bytes(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut WireWriter<Vec<u8>>)) -> Vec<u8> {
        let mut w = WireWriter::new(Vec::new());
        f(&mut w);
        w.into_inner()
    }

    #[test]
    fn scalars_are_little_endian() {
        assert_eq!(written(|w| w.write_i16(0x1234).unwrap()), vec![0x34, 0x12]);
        assert_eq!(
            written(|w| w.write_i32(0x0102_0304).unwrap()),
            vec![0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(
            written(|w| w.write_i64(-2).unwrap()),
            vec![0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(written(|w| w.write_char(0x00E9).unwrap()), vec![0xE9, 0x00]);
    }

    #[test]
    fn booleans_use_high_bit() {
        assert_eq!(written(|w| w.write_bool(true).unwrap()), vec![0x80]);
        assert_eq!(written(|w| w.write_bool(false).unwrap()), vec![0x00]);
    }

    #[test]
    fn floats_keep_raw_bits() {
        let nan = f32::from_bits(0x7FC0_1234);
        assert_eq!(
            written(|w| w.write_f32(nan).unwrap()),
            0x7FC0_1234u32.to_le_bytes().to_vec()
        );
        assert_eq!(
            written(|w| w.write_f64(-0.0).unwrap()),
            (-0.0f64).to_bits().to_le_bytes().to_vec()
        );
    }

    #[test]
    fn bulk_runs_match_single_writes() {
        let bulk = written(|w| w.write_i32s(&[1, -1, i32::MAX]).unwrap());
        let single = written(|w| {
            w.write_i32(1).unwrap();
            w.write_i32(-1).unwrap();
            w.write_i32(i32::MAX).unwrap();
        });
        assert_eq!(bulk, single);
    }

    #[test]
    fn position_counts_bytes() {
        let mut w = WireWriter::new(Vec::new());
        w.write_u8(1).unwrap();
        w.write_i64(7).unwrap();
        w.write_utf8("héllo").unwrap();
        assert_eq!(w.position(), 1 + 8 + 6);
        w.write_bytes(&[]).unwrap();
        assert_eq!(w.position(), 15);
    }
}
