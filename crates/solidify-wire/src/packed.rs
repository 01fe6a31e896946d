//! Packed (small-value-first) signed integers.
//!
//! Each width is emitted as one or two halves of the next-smaller primitive:
//!
//! ```text
//! packed i32, low/high are little-endian u16 words:
//!   0 <= v < 0x8000        low = v                          (2 bytes)
//!   -0x8000 <= v < 0       low = v as u16, high = 0          (4 bytes)
//!   v >= 0x8000            low = v | 0x8000, high = v >> 15  (4 bytes)
//! decode: low < 0x8000 -> low; high > 0 -> high << 15 | low & 0x7FFF;
//!         otherwise sign-extend low
//! ```
//!
//! Packed i16 does the same with bytes (split at bit 7) and packed i64 with
//! u32 words (split at bit 31). The range is asymmetric: everything up to
//! the type's maximum, but only down to the minimum of the low half.
//! Anything lower is a caller error ([`WireError::OutOfRange`]).

use std::io::{Read, Write};

use crate::error::{WireError, WireResult};
use crate::reader::WireReader;
use crate::writer::WireWriter;

/// Smallest value accepted by [`WireWriter::write_packed_i16`].
pub const PACKED_I16_MIN: i16 = -0x80;
/// Smallest value accepted by [`WireWriter::write_packed_i32`].
pub const PACKED_I32_MIN: i32 = -0x8000;
/// Smallest value accepted by [`WireWriter::write_packed_i64`].
pub const PACKED_I64_MIN: i64 = -0x8000_0000;

impl<W: Write> WireWriter<W> {
    pub fn write_packed_i16(&mut self, value: i16) -> WireResult<()> {
        if value < PACKED_I16_MIN {
            return Err(WireError::OutOfRange {
                value: value.into(),
                min: PACKED_I16_MIN.into(),
            });
        }
        if value < 0x80 {
            self.write_u8(value as u8)?;
            if value < 0 {
                self.write_u8(0)?;
            }
        } else {
            self.write_u8(value as u8 | 0x80)?;
            self.write_u8((value >> 7) as u8)?;
        }
        Ok(())
    }

    pub fn write_packed_i32(&mut self, value: i32) -> WireResult<()> {
        if value < PACKED_I32_MIN {
            return Err(WireError::OutOfRange {
                value: value.into(),
                min: PACKED_I32_MIN.into(),
            });
        }
        if value < 0x8000 {
            self.write_u16(value as u16)?;
            if value < 0 {
                self.write_u16(0)?;
            }
        } else {
            self.write_u16(value as u16 | 0x8000)?;
            self.write_u16((value >> 15) as u16)?;
        }
        Ok(())
    }

    pub fn write_packed_i64(&mut self, value: i64) -> WireResult<()> {
        if value < PACKED_I64_MIN {
            return Err(WireError::OutOfRange {
                value,
                min: PACKED_I64_MIN,
            });
        }
        if value < 0x8000_0000 {
            self.write_u32(value as u32)?;
            if value < 0 {
                self.write_u32(0)?;
            }
        } else {
            self.write_u32(value as u32 | 0x8000_0000)?;
            self.write_u32((value >> 31) as u32)?;
        }
        Ok(())
    }
}

impl<R: Read> WireReader<R> {
    pub fn read_packed_i16(&mut self) -> WireResult<i16> {
        let low = self.read_u8()?;
        if low < 0x80 {
            return Ok(low.into());
        }
        let high = self.read_u8()?;
        Ok(if high > 0 {
            i16::from(high) << 7 | i16::from(low & 0x7F)
        } else {
            (low as i8).into()
        })
    }

    pub fn read_packed_i32(&mut self) -> WireResult<i32> {
        let low = self.read_u16()?;
        if low < 0x8000 {
            return Ok(low.into());
        }
        let high = self.read_u16()?;
        Ok(if high > 0 {
            i32::from(high) << 15 | i32::from(low & 0x7FFF)
        } else {
            (low as i16).into()
        })
    }

    pub fn read_packed_i64(&mut self) -> WireResult<i64> {
        let low = self.read_u32()?;
        if low < 0x8000_0000 {
            return Ok(low.into());
        }
        let high = self.read_u32()?;
        Ok(if high > 0 {
            i64::from(high) << 31 | i64::from(low & 0x7FFF_FFFF)
        } else {
            (low as i32).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_i32(value: i32) -> Vec<u8> {
        let mut w = WireWriter::new(Vec::new());
        w.write_packed_i32(value).unwrap();
        w.into_inner()
    }

    fn decode_i32(bytes: &[u8]) -> i32 {
        let mut r = WireReader::new(bytes);
        let value = r.read_packed_i32().unwrap();
        assert_eq!(r.position(), bytes.len() as u64, "trailing bytes");
        value
    }

    #[test]
    fn packed_i32_layouts() {
        assert_eq!(encode_i32(0), vec![0x00, 0x00]);
        assert_eq!(encode_i32(0x7FFF), vec![0xFF, 0x7F]);
        assert_eq!(encode_i32(0x8000), vec![0x00, 0x80, 0x01, 0x00]);
        assert_eq!(encode_i32(-1), vec![0xFF, 0xFF, 0x00, 0x00]);
        assert_eq!(encode_i32(-0x8000), vec![0x00, 0x80, 0x00, 0x00]);
        assert_eq!(encode_i32(i32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn packed_i32_boundaries_roundtrip() {
        for value in [
            0,
            1,
            0x7FFE,
            0x7FFF,
            0x8000,
            0x8001,
            0xFFFF,
            0x1_0000,
            -1,
            -2,
            -0x7FFF,
            -0x8000,
            i32::MAX,
            i32::MAX - 1,
        ] {
            assert_eq!(decode_i32(&encode_i32(value)), value, "value {value:#x}");
        }
    }

    #[test]
    fn packed_i32_rejects_below_minimum() {
        let mut w = WireWriter::new(Vec::new());
        let err = w.write_packed_i32(-0x8001).unwrap_err();
        assert!(matches!(err, WireError::OutOfRange { value: -0x8001, min: -0x8000 }));
        let err = w.write_packed_i32(i32::MIN).unwrap_err();
        assert!(matches!(err, WireError::OutOfRange { .. }));
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn packed_i16_roundtrip_and_layout() {
        for (value, len) in [(0i16, 1usize), (0x7F, 1), (0x80, 2), (-1, 2), (-0x80, 2), (i16::MAX, 2)] {
            let mut w = WireWriter::new(Vec::new());
            w.write_packed_i16(value).unwrap();
            let bytes = w.into_inner();
            assert_eq!(bytes.len(), len, "value {value}");
            assert_eq!(WireReader::new(bytes.as_slice()).read_packed_i16().unwrap(), value);
        }
        let err = WireWriter::new(Vec::new()).write_packed_i16(-0x81).unwrap_err();
        assert!(matches!(err, WireError::OutOfRange { .. }));
    }

    #[test]
    fn packed_i64_roundtrip_and_layout() {
        for (value, len) in [
            (0i64, 4usize),
            (0x7FFF_FFFF, 4),
            (0x8000_0000, 8),
            (-1, 8),
            (-0x8000_0000, 8),
            (i64::MAX, 8),
            (i64::MAX - 1, 8),
        ] {
            let mut w = WireWriter::new(Vec::new());
            w.write_packed_i64(value).unwrap();
            let bytes = w.into_inner();
            assert_eq!(bytes.len(), len, "value {value}");
            assert_eq!(WireReader::new(bytes.as_slice()).read_packed_i64().unwrap(), value);
        }
        let err = WireWriter::new(Vec::new())
            .write_packed_i64(-0x8000_0001)
            .unwrap_err();
        assert!(matches!(err, WireError::OutOfRange { .. }));
    }

    #[test]
    fn truncated_continuation_is_invalid() {
        let err = WireReader::new(&[0x00u8, 0x80, 0x01][..])
            .read_packed_i32()
            .unwrap_err();
        assert!(matches!(err, WireError::InvalidData(_)));
    }
}
