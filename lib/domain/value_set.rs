//! Region-tagged value sets.
//!
//! A `ValueSet` maps symbolic memory regions to strided intervals. The
//! reserved global region holds ordinary numeric and address values; any
//! other region is an opaque memory object the driver has named (e.g.
//! one per allocation site), so that pointer arithmetic confined to a
//! single object stays precise while arithmetic mixing unrelated regions
//! is recognized as unsound and widens to `⊤`.

use crate::domain::StridedInterval;
use crate::types::DataWidth;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An opaque, comparable token naming a memory region. Allocated by the
/// driver, never by this crate.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct RegionId(u64);

impl RegionId {
    pub fn new(id: u64) -> RegionId {
        RegionId(id)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// A symbolic memory region.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Region {
    Global,
    Object(RegionId),
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Region::Global => write!(f, "global"),
            Region::Object(id) => id.fmt(f),
        }
    }
}

/// A mapping from region to strided interval.
///
/// `Top` is the state where information has been destroyed (e.g. an
/// unmodeled memory read): every region, including regions this value
/// set has never seen, maps to `⊤`. A `Regions` map is non-empty and
/// width-uniform by construction.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ValueSet {
    Top(DataWidth),
    Regions(BTreeMap<Region, StridedInterval>),
}

impl ValueSet {
    /// Create a `ValueSet` binding the global region to the given
    /// interval.
    pub fn new_global(interval: StridedInterval) -> ValueSet {
        ValueSet::new_region(Region::Global, interval)
    }

    /// Create a `ValueSet` binding a single region to the given interval.
    pub fn new_region(region: Region, interval: StridedInterval) -> ValueSet {
        let mut regions = BTreeMap::new();
        regions.insert(region, interval);
        ValueSet::Regions(regions)
    }

    /// Create a `ValueSet` where every region maps to `⊤`.
    pub fn new_top(width: DataWidth) -> ValueSet {
        ValueSet::Top(width)
    }

    pub fn is_top(&self) -> bool {
        matches!(*self, ValueSet::Top(_))
    }

    /// The width of this `ValueSet`.
    pub fn width(&self) -> DataWidth {
        match *self {
            ValueSet::Top(width) => width,
            ValueSet::Regions(ref regions) => regions
                .values()
                .next()
                .expect("empty region map")
                .width(),
        }
    }

    /// The value of the global region. `⊥` when this value set binds
    /// only non-global regions.
    pub fn global(&self) -> StridedInterval {
        self.region(Region::Global)
    }

    /// The value of the given region.
    pub fn region(&self, region: Region) -> StridedInterval {
        match *self {
            ValueSet::Top(width) => StridedInterval::top(width),
            ValueSet::Regions(ref regions) => regions
                .get(&region)
                .cloned()
                .unwrap_or_else(|| StridedInterval::bottom(self.width())),
        }
    }

    /// The regions this value set binds, `None` for `Top`.
    pub fn regions(&self) -> Option<&BTreeMap<Region, StridedInterval>> {
        match *self {
            ValueSet::Top(_) => None,
            ValueSet::Regions(ref regions) => Some(regions),
        }
    }

    fn single(&self) -> Option<(Region, &StridedInterval)> {
        match *self {
            ValueSet::Top(_) => None,
            ValueSet::Regions(ref regions) => {
                if regions.len() == 1 {
                    regions.iter().next().map(|(r, si)| (*r, si))
                } else {
                    None
                }
            }
        }
    }

    fn top_result(&self, other: &ValueSet) -> ValueSet {
        ValueSet::Top(self.width().max(other.width()))
    }

    /// Apply an operation under which region tags survive: both operands
    /// must be single-region, and the regions must agree or one must be
    /// global. Anything else is unsound and widens to `⊤`.
    fn additive_binop<F>(&self, other: &ValueSet, op: F) -> ValueSet
    where
        F: Fn(&StridedInterval, &StridedInterval) -> StridedInterval,
    {
        let (lregion, lhs) = match self.single() {
            Some(single) => single,
            None => return self.top_result(other),
        };
        let (rregion, rhs) = match other.single() {
            Some(single) => single,
            None => return self.top_result(other),
        };
        let region = match (lregion, rregion) {
            (Region::Global, region) | (region, Region::Global) => region,
            (lregion, rregion) if lregion == rregion => lregion,
            _ => return self.top_result(other),
        };
        ValueSet::new_region(region, op(lhs, rhs))
    }

    /// Apply an operation which is only meaningful on plain numbers:
    /// both operands must be the global region alone.
    fn scalar_binop<F>(&self, other: &ValueSet, op: F) -> ValueSet
    where
        F: Fn(&StridedInterval, &StridedInterval) -> StridedInterval,
    {
        match (self.single(), other.single()) {
            (Some((Region::Global, lhs)), Some((Region::Global, rhs))) => {
                ValueSet::new_global(op(lhs, rhs))
            }
            _ => self.top_result(other),
        }
    }

    pub fn add(&self, other: &ValueSet) -> ValueSet {
        self.additive_binop(other, StridedInterval::add)
    }

    pub fn sub(&self, other: &ValueSet) -> ValueSet {
        self.additive_binop(other, StridedInterval::sub)
    }

    pub fn mul(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::mul)
    }

    pub fn div(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::div)
    }

    pub fn rem(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::rem)
    }

    pub fn and(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::and)
    }

    pub fn or(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::or)
    }

    pub fn xor(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::xor)
    }

    pub fn shl(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::shl)
    }

    pub fn shr(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::shr)
    }

    pub fn rol(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::rol)
    }

    pub fn ror(&self, other: &ValueSet) -> ValueSet {
        self.scalar_binop(other, StridedInterval::ror)
    }

    /// Join two `ValueSet` region-wise. A region bound on only one side
    /// carries through unchanged (its value on the other side is `⊥`).
    pub fn join(&self, other: &ValueSet) -> ValueSet {
        self.merge(other, StridedInterval::join)
    }

    /// Widen two `ValueSet` region-wise.
    pub fn widen(&self, other: &ValueSet) -> ValueSet {
        self.merge(other, StridedInterval::widen)
    }

    fn merge<F>(&self, other: &ValueSet, op: F) -> ValueSet
    where
        F: Fn(&StridedInterval, &StridedInterval) -> StridedInterval,
    {
        let (lhs, rhs) = match (self.regions(), other.regions()) {
            (Some(lhs), Some(rhs)) => (lhs, rhs),
            _ => return self.top_result(other),
        };
        let mut regions = lhs.clone();
        for (region, rvalue) in rhs {
            let merged = match regions.get(region) {
                Some(lvalue) => op(lvalue, rvalue),
                None => rvalue.clone(),
            };
            regions.insert(*region, merged);
        }
        ValueSet::Regions(regions)
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ValueSet::Top(width) => write!(f, "⊤:{}", width),
            ValueSet::Regions(ref regions) => {
                write!(f, "{{")?;
                for (i, (region, interval)) in regions.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", region, interval)?;
                }
                write!(f, "}}")
            }
        }
    }
}
