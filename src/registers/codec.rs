use super::schema::FieldDescriptor;
use super::{lookup, lookup_any};
use crate::error::{ChargerError, Result};

/// A physical value translated into register terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedField {
    pub address: u8,
    /// Field bits already shifted into position
    pub raw_bits: u16,
    /// Bits of the register owned by the field
    pub mask: u16,
}

/// Encode a writable field's physical value
///
/// No range check happens here; callers validate first.
pub fn encode(name: &str, physical: i64) -> Result<EncodedField> {
    let descriptor = lookup(name).ok_or_else(|| ChargerError::unknown_field(name))?;
    Ok(encode_with(descriptor, physical))
}

pub fn encode_with(descriptor: &FieldDescriptor, physical: i64) -> EncodedField {
    let mask = descriptor.mask();
    let raw = descriptor.transform.to_raw(physical);
    let raw_bits = ((raw as u16) << descriptor.bit_offset) & mask;
    EncodedField {
        address: descriptor.address,
        raw_bits,
        mask,
    }
}

/// Decode a field from the full byte or word it lives in
pub fn decode(name: &str, register_value: u16) -> Result<i64> {
    let descriptor = lookup_any(name).ok_or_else(|| ChargerError::unknown_field(name))?;
    Ok(decode_with(descriptor, register_value))
}

pub fn decode_with(descriptor: &FieldDescriptor, register_value: u16) -> i64 {
    descriptor
        .transform
        .to_physical(extract_raw(descriptor, register_value))
}

/// Pull the field's bits out of a register value, sign-extending if needed
pub fn extract_raw(descriptor: &FieldDescriptor, register_value: u16) -> i64 {
    let bits = (register_value & descriptor.mask()) >> descriptor.bit_offset;
    let raw = i64::from(bits);
    if descriptor.signed && bits & (1 << (descriptor.bit_width - 1)) != 0 {
        raw - (1i64 << descriptor.bit_width)
    } else {
        raw
    }
}
