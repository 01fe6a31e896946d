use std::io::Read;

/// Upper bound on the buffer reserved up front for a bulk read. Larger runs
/// grow as bytes actually arrive, so a forged length cannot force a huge
/// allocation before the stream runs dry.
const INITIAL_RUN_CAPACITY: usize = 64 * 1024;

use crate::error::{WireError, WireResult};
use crate::writer::{FALSE_BYTE, TRUE_BYTE};

/// Sequential little-endian reader over any [`Read`] source.
///
/// Running out of input mid-value is reported as
/// [`WireError::InvalidData`]; the stream is malformed, not broken.
#[derive(Debug)]
pub struct WireReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> WireReader<R> {
    /// Wrap a source, starting the byte count at zero.
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed through this reader.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `buf` completely from the source.
    pub fn read_into(&mut self, buf: &mut [u8]) -> WireResult<()> {
        self.inner.read_exact(buf).map_err(WireError::from_read)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Read exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> WireResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(INITIAL_RUN_CAPACITY));
        let got = (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        self.position += got as u64;
        if got < len {
            return Err(WireError::invalid("unexpected end of stream"));
        }
        Ok(buf)
    }

    fn read_run(&mut self, len: usize, width: usize) -> WireResult<Vec<u8>> {
        let bytes = len
            .checked_mul(width)
            .ok_or_else(|| WireError::invalid(format!("run of {len} elements overflows")))?;
        self.read_bytes(bytes)
    }

    pub fn read_u8(&mut self) -> WireResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> WireResult<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> WireResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> WireResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> WireResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> WireResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> WireResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> WireResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> WireResult<f64> {
        Ok(f64::from_bits(u64::from_le_bytes(self.read_array()?)))
    }

    /// Strict boolean: only `0x00` and `0x80` are accepted.
    pub fn read_bool(&mut self) -> WireResult<bool> {
        match self.read_u8()? {
            FALSE_BYTE => Ok(false),
            TRUE_BYTE => Ok(true),
            other => Err(WireError::invalid(format!("invalid boolean byte {other:#04x}"))),
        }
    }

    pub fn read_char(&mut self) -> WireResult<u16> {
        self.read_u16()
    }

    /// Read `len` bytes and validate them as UTF-8.
    pub fn read_utf8(&mut self, len: usize) -> WireResult<String> {
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| WireError::invalid(format!("invalid UTF-8: {e}")))
    }

    pub fn read_i16s(&mut self, len: usize) -> WireResult<Vec<i16>> {
        let raw = self.read_run(len, 2)?;
        Ok(raw
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect())
    }

    pub fn read_i32s(&mut self, len: usize) -> WireResult<Vec<i32>> {
        let raw = self.read_run(len, 4)?;
        Ok(raw
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    pub fn read_i64s(&mut self, len: usize) -> WireResult<Vec<i64>> {
        let raw = self.read_run(len, 8)?;
        Ok(raw
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect())
    }

    pub fn read_f32s(&mut self, len: usize) -> WireResult<Vec<f32>> {
        let raw = self.read_run(len, 4)?;
        Ok(raw
            .chunks_exact(4)
            .map(|c| f32::from_bits(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect())
    }

    pub fn read_f64s(&mut self, len: usize) -> WireResult<Vec<f64>> {
        let raw = self.read_run(len, 8)?;
        Ok(raw
            .chunks_exact(8)
            .map(|c| {
                f64::from_bits(u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            })
            .collect())
    }

    pub fn read_chars(&mut self, len: usize) -> WireResult<Vec<u16>> {
        let raw = self.read_run(len, 2)?;
        Ok(raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::WireWriter;

    fn reader(bytes: &[u8]) -> WireReader<&[u8]> {
        WireReader::new(bytes)
    }

    #[test]
    fn scalars_roundtrip() {
        let mut w = WireWriter::new(Vec::new());
        w.write_i8(-5).unwrap();
        w.write_i16(-300).unwrap();
        w.write_i32(i32::MIN).unwrap();
        w.write_i64(i64::MAX).unwrap();
        w.write_f32(1.5).unwrap();
        w.write_f64(-2.25).unwrap();
        w.write_char(0xD83D).unwrap();
        let bytes = w.into_inner();

        let mut r = reader(&bytes);
        assert_eq!(r.read_i8().unwrap(), -5);
        assert_eq!(r.read_i16().unwrap(), -300);
        assert_eq!(r.read_i32().unwrap(), i32::MIN);
        assert_eq!(r.read_i64().unwrap(), i64::MAX);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f64().unwrap(), -2.25);
        assert_eq!(r.read_char().unwrap(), 0xD83D);
        assert_eq!(r.position(), bytes.len() as u64);
    }

    #[test]
    fn bulk_runs_roundtrip() {
        let mut w = WireWriter::new(Vec::new());
        w.write_i16s(&[1, -2, 3]).unwrap();
        w.write_i64s(&[i64::MIN, 0]).unwrap();
        w.write_f64s(&[f64::INFINITY, -0.0]).unwrap();
        w.write_chars(&[0x41, 0xFFFF]).unwrap();
        let bytes = w.into_inner();

        let mut r = reader(&bytes);
        assert_eq!(r.read_i16s(3).unwrap(), vec![1, -2, 3]);
        assert_eq!(r.read_i64s(2).unwrap(), vec![i64::MIN, 0]);
        let doubles = r.read_f64s(2).unwrap();
        assert_eq!(doubles[0], f64::INFINITY);
        assert_eq!(doubles[1].to_bits(), (-0.0f64).to_bits());
        assert_eq!(r.read_chars(2).unwrap(), vec![0x41, 0xFFFF]);
    }

    #[test]
    fn strict_boolean() {
        assert!(reader(&[0x80]).read_bool().unwrap());
        assert!(!reader(&[0x00]).read_bool().unwrap());
        let err = reader(&[0x01]).read_bool().unwrap_err();
        assert!(matches!(err, WireError::InvalidData(_)));
    }

    #[test]
    fn truncated_input_is_invalid_data() {
        let err = reader(&[0x01, 0x02]).read_i32().unwrap_err();
        assert!(matches!(err, WireError::InvalidData(_)));
        let err = reader(&[]).read_u8().unwrap_err();
        assert!(matches!(err, WireError::InvalidData(_)));
    }

    #[test]
    fn utf8_validation() {
        assert_eq!(reader("héllo".as_bytes()).read_utf8(6).unwrap(), "héllo");
        let err = reader(&[0xC3, 0x28]).read_utf8(2).unwrap_err();
        assert!(matches!(err, WireError::InvalidData(_)));
    }

    #[test]
    fn oversized_run_fails_without_preallocating() {
        let err = reader(&[0u8; 16]).read_i64s(usize::MAX / 4).unwrap_err();
        assert!(matches!(err, WireError::InvalidData(_)));
        let err = reader(&[0u8; 16]).read_bytes(1 << 40).unwrap_err();
        assert!(matches!(err, WireError::InvalidData(_)));
    }

    #[test]
    fn zero_length_reads_consume_nothing() {
        let mut r = reader(&[0xAA]);
        assert!(r.read_bytes(0).unwrap().is_empty());
        assert!(r.read_i32s(0).unwrap().is_empty());
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u8().unwrap(), 0xAA);
    }
}
