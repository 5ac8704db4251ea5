//! Abstract domains for value-set analysis.
//!
//! The domains stack as follows: a `StridedInterval` approximates a set of
//! fixed-width integers, a `ValueSet` tags strided intervals with the
//! memory region the values belong to, a `Bool3` approximates a boolean,
//! and an `AbstractEnvironment` maps register names to value sets and flag
//! names to `Bool3` at one program point.

mod bool3;
mod environment;
mod strided_interval;
mod value_set;

pub use self::bool3::Bool3;
pub use self::environment::AbstractEnvironment;
pub use self::strided_interval::StridedInterval;
pub use self::value_set::{Region, RegionId, ValueSet};
