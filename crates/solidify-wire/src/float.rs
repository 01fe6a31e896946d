//! Packed nullable floats.
//!
//! The leading 16-bit word carries the sign, the exponent and the top of the
//! mantissa. When the exponent is all ones the value is special and the
//! leading word is all that gets written:
//!
//! ```text
//!            f32      f64
//! null       0xFFC0   0xFFF8
//! +inf       0x7F80   0x7FF0
//! -inf       0xFF80   0xFFF0
//! NaN        0x7FC0   0x7FF8
//! ```
//!
//! Any other leading word with an all-ones exponent is rejected on read.
//! Finite values follow as one more u16 (f32) or a u16 and a u32 (f64),
//! so the raw bits are `L << 16 | T` and `L << 48 | M << 32 | T`.
//! Every NaN payload is written as the single canonical NaN.

use std::io::{Read, Write};

use crate::error::{WireError, WireResult};
use crate::reader::WireReader;
use crate::writer::WireWriter;

pub const F32_NULL: u16 = 0xFFC0;
pub const F32_POS_INFINITY: u16 = 0x7F80;
pub const F32_NEG_INFINITY: u16 = 0xFF80;
pub const F32_NAN: u16 = 0x7FC0;
const F32_EXPONENT_MASK: u16 = 0x7F80;

pub const F64_NULL: u16 = 0xFFF8;
pub const F64_POS_INFINITY: u16 = 0x7FF0;
pub const F64_NEG_INFINITY: u16 = 0xFFF0;
pub const F64_NAN: u16 = 0x7FF8;
const F64_EXPONENT_MASK: u16 = 0x7FF0;

impl<W: Write> WireWriter<W> {
    pub fn write_packed_f32(&mut self, value: f32) -> WireResult<()> {
        self.write_packed_f32_opt(Some(value))
    }

    pub fn write_packed_f32_opt(&mut self, value: Option<f32>) -> WireResult<()> {
        let Some(value) = value else {
            return self.write_u16(F32_NULL);
        };
        if value.is_nan() {
            self.write_u16(F32_NAN)
        } else if value == f32::INFINITY {
            self.write_u16(F32_POS_INFINITY)
        } else if value == f32::NEG_INFINITY {
            self.write_u16(F32_NEG_INFINITY)
        } else {
            let bits = value.to_bits();
            self.write_u16((bits >> 16) as u16)?;
            self.write_u16(bits as u16)
        }
    }

    pub fn write_packed_f64(&mut self, value: f64) -> WireResult<()> {
        self.write_packed_f64_opt(Some(value))
    }

    pub fn write_packed_f64_opt(&mut self, value: Option<f64>) -> WireResult<()> {
        let Some(value) = value else {
            return self.write_u16(F64_NULL);
        };
        if value.is_nan() {
            self.write_u16(F64_NAN)
        } else if value == f64::INFINITY {
            self.write_u16(F64_POS_INFINITY)
        } else if value == f64::NEG_INFINITY {
            self.write_u16(F64_NEG_INFINITY)
        } else {
            let bits = value.to_bits();
            self.write_u16((bits >> 48) as u16)?;
            self.write_u16((bits >> 32) as u16)?;
            self.write_u32(bits as u32)
        }
    }
}

impl<R: Read> WireReader<R> {
    /// Non-nullable variant: the null pattern is invalid here.
    pub fn read_packed_f32(&mut self) -> WireResult<f32> {
        self.read_packed_f32_opt()?
            .ok_or_else(|| WireError::invalid("null in non-nullable packed f32"))
    }

    pub fn read_packed_f32_opt(&mut self) -> WireResult<Option<f32>> {
        let leading = self.read_u16()?;
        match leading {
            F32_NULL => Ok(None),
            F32_POS_INFINITY => Ok(Some(f32::INFINITY)),
            F32_NEG_INFINITY => Ok(Some(f32::NEG_INFINITY)),
            F32_NAN => Ok(Some(f32::NAN)),
            _ if leading & F32_EXPONENT_MASK == F32_EXPONENT_MASK => Err(WireError::invalid(
                format!("reserved packed f32 pattern {leading:#06x}"),
            )),
            _ => {
                let trailing = self.read_u16()?;
                Ok(Some(f32::from_bits(u32::from(leading) << 16 | u32::from(trailing))))
            }
        }
    }

    /// Non-nullable variant: the null pattern is invalid here.
    pub fn read_packed_f64(&mut self) -> WireResult<f64> {
        self.read_packed_f64_opt()?
            .ok_or_else(|| WireError::invalid("null in non-nullable packed f64"))
    }

    pub fn read_packed_f64_opt(&mut self) -> WireResult<Option<f64>> {
        let leading = self.read_u16()?;
        match leading {
            F64_NULL => Ok(None),
            F64_POS_INFINITY => Ok(Some(f64::INFINITY)),
            F64_NEG_INFINITY => Ok(Some(f64::NEG_INFINITY)),
            F64_NAN => Ok(Some(f64::NAN)),
            _ if leading & F64_EXPONENT_MASK == F64_EXPONENT_MASK => Err(WireError::invalid(
                format!("reserved packed f64 pattern {leading:#06x}"),
            )),
            _ => {
                let middle = self.read_u16()?;
                let trailing = self.read_u32()?;
                let bits = u64::from(leading) << 48 | u64::from(middle) << 32 | u64::from(trailing);
                Ok(Some(f64::from_bits(bits)))
            }
        }
    }
}
