//! Register schema for the BQ25672 charger
//!
//! Every named field the control plane knows about is described once, in a
//! static table, by a [`FieldDescriptor`]. The codec turns physical values
//! (millivolts, milliamps, enumerated selectors) into the raw bits the chip
//! expects and back.
//!
//! Two tables exist: [`FIELDS`] holds the writable configuration fields and
//! [`STATUS_FIELDS`] holds read-only status, ADC and identification fields.
//! Only the former is visible to the writer.

mod codec;
mod schema;
mod table;

pub use codec::{EncodedField, decode, decode_with, encode, encode_with, extract_raw};
pub use schema::{FieldDescriptor, FieldKind, RegisterWidth, Transform};
pub use table::{FIELDS, STATUS_FIELDS};

/// Find a writable field by name
pub fn lookup(name: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|d| d.name == name)
}

/// Find any field by name, writable or read-only
pub fn lookup_any(name: &str) -> Option<&'static FieldDescriptor> {
    lookup(name).or_else(|| STATUS_FIELDS.iter().find(|d| d.name == name))
}

/// Iterate over every descriptor in both tables
pub fn all_fields() -> impl Iterator<Item = &'static FieldDescriptor> {
    FIELDS.iter().chain(STATUS_FIELDS.iter())
}
