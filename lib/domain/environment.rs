//! The abstract machine state at one program point.

use crate::domain::{Bool3, ValueSet};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mapping from register name to `ValueSet` and flag name to `Bool3`.
///
/// Environments are snapshots: the transformer clones its caller's
/// environment and mutates the clone, so an input environment is never
/// changed behind the caller's back. `join` is the merge a driver applies
/// where control-flow paths recombine, `widen` the accelerated variant
/// for loop back-edges.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AbstractEnvironment {
    registers: FxHashMap<String, ValueSet>,
    flags: FxHashMap<String, Bool3>,
}

impl AbstractEnvironment {
    /// Create an empty `AbstractEnvironment`.
    pub fn new() -> AbstractEnvironment {
        AbstractEnvironment::default()
    }

    /// The value set bound to the given register, if any.
    pub fn register(&self, name: &str) -> Option<&ValueSet> {
        self.registers.get(name)
    }

    /// Bind a register to a value set.
    pub fn set_register<S: Into<String>>(&mut self, name: S, value: ValueSet) {
        self.registers.insert(name.into(), value);
    }

    /// The value bound to the given flag, if any.
    pub fn flag(&self, name: &str) -> Option<Bool3> {
        self.flags.get(name).copied()
    }

    /// Bind a flag to a boolean value.
    pub fn set_flag<S: Into<String>>(&mut self, name: S, value: Bool3) {
        self.flags.insert(name.into(), value);
    }

    /// All register bindings.
    pub fn registers(&self) -> &FxHashMap<String, ValueSet> {
        &self.registers
    }

    /// All flag bindings.
    pub fn flags(&self) -> &FxHashMap<String, Bool3> {
        &self.flags
    }

    /// Join this environment with another, key-wise. A register or flag
    /// bound on only one side carries through unchanged: both
    /// environments are snapshots of the same register file, so an
    /// absent key means the other path never touched it.
    pub fn join(&self, other: &AbstractEnvironment) -> AbstractEnvironment {
        self.merge(other, ValueSet::join, Bool3::join)
    }

    /// Widen this environment with another, key-wise, with the same
    /// carry-through rule as `join`.
    pub fn widen(&self, other: &AbstractEnvironment) -> AbstractEnvironment {
        self.merge(other, ValueSet::widen, Bool3::join)
    }

    fn merge(
        &self,
        other: &AbstractEnvironment,
        value_op: fn(&ValueSet, &ValueSet) -> ValueSet,
        flag_op: fn(Bool3, Bool3) -> Bool3,
    ) -> AbstractEnvironment {
        let mut merged = self.clone();
        for (name, rhs) in &other.registers {
            let value = match merged.registers.get(name) {
                Some(lhs) => value_op(lhs, rhs),
                None => rhs.clone(),
            };
            merged.registers.insert(name.clone(), value);
        }
        for (name, rhs) in &other.flags {
            let value = match merged.flags.get(name) {
                Some(lhs) => flag_op(*lhs, *rhs),
                None => *rhs,
            };
            merged.flags.insert(name.clone(), value);
        }
        merged
    }
}

impl fmt::Display for AbstractEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut registers: Vec<&String> = self.registers.keys().collect();
        registers.sort();
        let mut flags: Vec<&String> = self.flags.keys().collect();
        flags.sort();
        write!(f, "[")?;
        let mut first = true;
        for name in registers {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, self.registers[name])?;
            first = false;
        }
        for name in flags {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, self.flags[name])?;
            first = false;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::AbstractEnvironment;
    use crate::domain::{Bool3, StridedInterval, ValueSet};
    use crate::types::DataWidth;

    const W: DataWidth = DataWidth::R64;

    fn global(value: u64) -> ValueSet {
        ValueSet::new_global(StridedInterval::singleton(value, W))
    }

    #[test]
    fn join_merges_shared_keys() {
        let mut lhs = AbstractEnvironment::new();
        lhs.set_register("rax", global(1));
        lhs.set_flag("zf", Bool3::True);
        let mut rhs = AbstractEnvironment::new();
        rhs.set_register("rax", global(5));
        rhs.set_flag("zf", Bool3::False);

        let joined = lhs.join(&rhs);
        assert_eq!(
            joined.register("rax").unwrap().global(),
            StridedInterval::strided(1, 4, 2, W)
        );
        assert_eq!(joined.flag("zf"), Some(Bool3::Maybe));
    }

    #[test]
    fn join_carries_one_sided_keys() {
        let mut lhs = AbstractEnvironment::new();
        lhs.set_register("rax", global(1));
        let mut rhs = AbstractEnvironment::new();
        rhs.set_register("rbx", global(2));
        rhs.set_flag("cf", Bool3::False);

        let joined = lhs.join(&rhs);
        assert_eq!(joined.register("rax"), Some(&global(1)));
        assert_eq!(joined.register("rbx"), Some(&global(2)));
        assert_eq!(joined.flag("cf"), Some(Bool3::False));
    }

    #[test]
    fn join_commutes() {
        let mut lhs = AbstractEnvironment::new();
        lhs.set_register("rax", global(1));
        lhs.set_register("rcx", global(7));
        lhs.set_flag("zf", Bool3::Maybe);
        let mut rhs = AbstractEnvironment::new();
        rhs.set_register("rax", global(5));
        rhs.set_flag("cf", Bool3::True);

        assert_eq!(lhs.join(&rhs), rhs.join(&lhs));
    }

    #[test]
    fn mutation_does_not_affect_parent() {
        let mut parent = AbstractEnvironment::new();
        parent.set_register("rax", global(1));
        let mut child = parent.clone();
        child.set_register("rax", global(2));
        assert_eq!(parent.register("rax"), Some(&global(1)));
    }

    #[test]
    fn widen_stabilizes() {
        let mut lhs = AbstractEnvironment::new();
        lhs.set_register("rax", global(1));
        let mut rhs = AbstractEnvironment::new();
        rhs.set_register(
            "rax",
            ValueSet::new_global(StridedInterval::interval(0, 100, W)),
        );

        let widened = lhs.widen(&rhs);
        assert_eq!(
            widened.register("rax").unwrap().global(),
            StridedInterval::top(W)
        );
        assert_eq!(widened.widen(&rhs), widened);
    }
}
