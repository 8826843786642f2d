use serde::Serialize;

/// Width of the register a field lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegisterWidth {
    /// Single 8-bit register, written with a masked read-modify-write
    Byte,
    /// 16-bit register pair, most significant byte at the lower address
    Word,
}

impl RegisterWidth {
    pub fn bits(self) -> u32 {
        match self {
            RegisterWidth::Byte => 8,
            RegisterWidth::Word => 16,
        }
    }
}

/// What a successful write of the field means beyond the register itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Configuration value, remembered and replayed at boot
    Persistent,
    /// One-shot action bit, never remembered
    Transient,
    /// Resets the chip; forgets every remembered value
    FactoryReset,
}

/// Affine mapping between raw register bits and physical units
///
/// `physical = raw * mul / div + bias`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transform {
    pub mul: i64,
    pub div: i64,
    pub bias: i64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform::linear(1, 0);

    /// Integer step with an offset
    pub const fn linear(step: i64, bias: i64) -> Self {
        Self {
            mul: step,
            div: 1,
            bias,
        }
    }

    /// Fractional step `mul / div` with an offset
    pub const fn ratio(mul: i64, div: i64, bias: i64) -> Self {
        Self { mul, div, bias }
    }

    /// Physical to raw, truncating toward zero
    pub const fn to_raw(&self, physical: i64) -> i64 {
        (physical - self.bias) * self.div / self.mul
    }

    /// Raw to physical
    pub const fn to_physical(&self, raw: i64) -> i64 {
        raw * self.mul / self.div + self.bias
    }
}

/// Static description of one named field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub address: u8,
    pub width: RegisterWidth,
    pub bit_offset: u8,
    pub bit_width: u8,
    pub transform: Transform,
    /// Inclusive lower bound in physical units
    pub min: i64,
    /// Inclusive upper bound in physical units
    pub max: i64,
    pub kind: FieldKind,
    /// Raw bits are two's complement
    pub signed: bool,
}

impl FieldDescriptor {
    /// Single-bit switch in a byte register
    pub const fn flag(name: &'static str, address: u8, bit: u8) -> Self {
        Self::bits(name, address, bit, 1)
    }

    /// Enumerated selector occupying `bit_width` bits of a byte register
    pub const fn bits(name: &'static str, address: u8, bit_offset: u8, bit_width: u8) -> Self {
        Self {
            name,
            address,
            width: RegisterWidth::Byte,
            bit_offset,
            bit_width,
            transform: Transform::IDENTITY,
            min: 0,
            max: (1i64 << bit_width) - 1,
            kind: FieldKind::Persistent,
            signed: false,
        }
    }

    /// Scaled quantity inside a byte register
    pub const fn scaled(
        name: &'static str,
        address: u8,
        bit_offset: u8,
        bit_width: u8,
        transform: Transform,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            name,
            address,
            width: RegisterWidth::Byte,
            bit_offset,
            bit_width,
            transform,
            min,
            max,
            kind: FieldKind::Persistent,
            signed: false,
        }
    }

    /// Scaled quantity in the low `bit_width` bits of a word register
    pub const fn word(
        name: &'static str,
        address: u8,
        bit_width: u8,
        transform: Transform,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            name,
            address,
            width: RegisterWidth::Word,
            bit_offset: 0,
            bit_width,
            transform,
            min,
            max,
            kind: FieldKind::Persistent,
            signed: false,
        }
    }

    pub const fn transient(mut self) -> Self {
        self.kind = FieldKind::Transient;
        self
    }

    pub const fn factory_reset(mut self) -> Self {
        self.kind = FieldKind::FactoryReset;
        self
    }

    /// Narrow the accepted physical range
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub const fn signed(mut self) -> Self {
        self.signed = true;
        self.min = self.transform.to_physical(-(1i64 << (self.bit_width - 1)));
        self.max = self.transform.to_physical((1i64 << (self.bit_width - 1)) - 1);
        self
    }

    /// Mask of the field's bits, positioned inside the register
    pub fn mask(&self) -> u16 {
        let ones = ((1u32 << self.bit_width) - 1) as u16;
        ones << self.bit_offset
    }

    pub fn is_persistent(&self) -> bool {
        self.kind == FieldKind::Persistent
    }

    pub fn in_range(&self, physical: i64) -> bool {
        (self.min..=self.max).contains(&physical)
    }
}
