//! Useful types used across multiple Kestrel modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed bit width governing modular arithmetic in the abstract domains.
///
/// All paths through the transformer currently run at `R64`, but the
/// domains are parametric over width so that shifts, rotates and masks
/// stay correct at narrower widths (e.g. the result of a sized memory
/// read).
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum DataWidth {
    R8,
    R16,
    R32,
    R64,
}

impl DataWidth {
    /// The number of bits at this width.
    pub fn bits(&self) -> u32 {
        match *self {
            DataWidth::R8 => 8,
            DataWidth::R16 => 16,
            DataWidth::R32 => 32,
            DataWidth::R64 => 64,
        }
    }

    /// An all-ones mask at this width, which is also the greatest
    /// representable value.
    pub fn mask(&self) -> u64 {
        match *self {
            DataWidth::R64 => u64::MAX,
            _ => (1u64 << self.bits()) - 1,
        }
    }

    /// Truncate a value into this width's modulus.
    pub fn truncate(&self, value: u64) -> u64 {
        value & self.mask()
    }
}

impl fmt::Display for DataWidth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

#[test]
fn mask() {
    assert_eq!(DataWidth::R8.mask(), 0xff);
    assert_eq!(DataWidth::R16.mask(), 0xffff);
    assert_eq!(DataWidth::R32.mask(), 0xffff_ffff);
    assert_eq!(DataWidth::R64.mask(), u64::MAX);
}

#[test]
fn truncate() {
    assert_eq!(DataWidth::R8.truncate(0x100), 0);
    assert_eq!(DataWidth::R8.truncate(0x1ff), 0xff);
    assert_eq!(DataWidth::R64.truncate(u64::MAX), u64::MAX);
}
