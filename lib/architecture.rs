//! Platform register and flag information for analysis.
//!
//! Kestrel does not hard-code any architecture. The disassembler
//! integration knows which names are registers and which are flags on the
//! platform under analysis, and hands that knowledge to the transformer
//! as a `RegisterFile`.

use crate::types::DataWidth;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// The valid register and flag names for a platform, and the platform's
/// natural word width.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RegisterFile {
    registers: FxHashSet<String>,
    flags: FxHashSet<String>,
    word_width: DataWidth,
}

impl RegisterFile {
    /// Create an empty `RegisterFile` with the given word width.
    pub fn new(word_width: DataWidth) -> RegisterFile {
        RegisterFile {
            registers: FxHashSet::default(),
            flags: FxHashSet::default(),
            word_width,
        }
    }

    /// Add the given register names to this `RegisterFile`.
    pub fn with_registers<S, I>(mut self, registers: I) -> RegisterFile
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.registers.extend(registers.into_iter().map(|r| r.into()));
        self
    }

    /// Add the given flag names to this `RegisterFile`.
    pub fn with_flags<S, I>(mut self, flags: I) -> RegisterFile
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.flags.extend(flags.into_iter().map(|f| f.into()));
        self
    }

    /// Add a single register name.
    pub fn add_register<S: Into<String>>(&mut self, name: S) {
        self.registers.insert(name.into());
    }

    /// Add a single flag name.
    pub fn add_flag<S: Into<String>>(&mut self, name: S) {
        self.flags.insert(name.into());
    }

    /// Is the given name a register on this platform?
    pub fn is_register(&self, name: &str) -> bool {
        self.registers.contains(name)
    }

    /// Is the given name a flag on this platform?
    pub fn is_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// The natural word width of this platform.
    pub fn word_width(&self) -> DataWidth {
        self.word_width
    }
}

#[test]
fn register_file() {
    let registers = RegisterFile::new(DataWidth::R64)
        .with_registers(vec!["rax", "rbx"])
        .with_flags(vec!["zf"]);
    assert!(registers.is_register("rax"));
    assert!(!registers.is_register("zf"));
    assert!(registers.is_flag("zf"));
    assert!(!registers.is_flag("rax"));
    assert_eq!(registers.word_width(), DataWidth::R64);
}
