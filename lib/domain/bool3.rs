//! Three-valued logic for conditional flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A boolean whose value may be undetermined.
///
/// `Maybe` means the analysis cannot rule out either concrete value. The
/// connectives follow Kleene's three-valued truth tables: a determined
/// operand short-circuits where it would short-circuit concretely
/// (`False` under `and`, `True` under `or`), and uncertainty propagates
/// everywhere else.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Bool3 {
    True,
    False,
    Maybe,
}

impl Bool3 {
    /// Logical negation.
    pub fn not(self) -> Bool3 {
        match self {
            Bool3::True => Bool3::False,
            Bool3::False => Bool3::True,
            Bool3::Maybe => Bool3::Maybe,
        }
    }

    /// Logical conjunction.
    pub fn and(self, other: Bool3) -> Bool3 {
        match (self, other) {
            (Bool3::False, _) | (_, Bool3::False) => Bool3::False,
            (Bool3::True, Bool3::True) => Bool3::True,
            _ => Bool3::Maybe,
        }
    }

    /// Logical disjunction.
    pub fn or(self, other: Bool3) -> Bool3 {
        match (self, other) {
            (Bool3::True, _) | (_, Bool3::True) => Bool3::True,
            (Bool3::False, Bool3::False) => Bool3::False,
            _ => Bool3::Maybe,
        }
    }

    /// Logical exclusive or. Any undetermined operand leaves the result
    /// undetermined.
    pub fn xor(self, other: Bool3) -> Bool3 {
        match (self, other) {
            (Bool3::Maybe, _) | (_, Bool3::Maybe) => Bool3::Maybe,
            (lhs, rhs) => {
                if lhs == rhs {
                    Bool3::False
                } else {
                    Bool3::True
                }
            }
        }
    }

    /// Join two `Bool3` in the lattice where `Maybe` sits above the two
    /// determined values.
    pub fn join(self, other: Bool3) -> Bool3 {
        if self == other {
            self
        } else {
            Bool3::Maybe
        }
    }
}

impl From<bool> for Bool3 {
    fn from(value: bool) -> Bool3 {
        if value {
            Bool3::True
        } else {
            Bool3::False
        }
    }
}

impl fmt::Display for Bool3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Bool3::True => write!(f, "true"),
            Bool3::False => write!(f, "false"),
            Bool3::Maybe => write!(f, "maybe"),
        }
    }
}
