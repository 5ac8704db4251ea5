//! An implementation of the strided-interval abstract domain.
//!
//! A strided interval represents the set
//! `{ base + k * stride mod 2^W : 0 <= k < count }` of `W`-bit integers,
//! together with the sentinels `⊤` (every representable value) and `⊥`
//! (no value). Arithmetic is total: an operation whose exact stride and
//! count cannot be computed soundly degrades to `⊤` rather than failing.
//!
//! Canonical form: `count == 0` is `⊥`, a singleton has `stride == 1`,
//! and intervals never wrap, i.e. `base + (count - 1) * stride` fits the
//! width. Constructions that would wrap widen to `⊤`.

use crate::types::DataWidth;
use serde::{Deserialize, Serialize};
use std::fmt;

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// A strided-interval lattice value.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StridedInterval {
    Top(DataWidth),
    Interval {
        base: u64,
        stride: u64,
        count: u64,
        width: DataWidth,
    },
    Bottom(DataWidth),
}

impl StridedInterval {
    /// Create a `StridedInterval` holding every value at the given width.
    pub fn top(width: DataWidth) -> StridedInterval {
        StridedInterval::Top(width)
    }

    /// Create an empty `StridedInterval` at the given width.
    pub fn bottom(width: DataWidth) -> StridedInterval {
        StridedInterval::Bottom(width)
    }

    /// Create a `StridedInterval` holding exactly one value.
    pub fn singleton(value: u64, width: DataWidth) -> StridedInterval {
        StridedInterval::Interval {
            base: width.truncate(value),
            stride: 1,
            count: 1,
            width,
        }
    }

    /// Create a stride-1 `StridedInterval` covering `low..=high`. A
    /// reversed pair cannot be represented and widens to `⊤`.
    pub fn interval(low: u64, high: u64, width: DataWidth) -> StridedInterval {
        let low = width.truncate(low);
        let high = width.truncate(high);
        if low > high {
            return StridedInterval::top(width);
        }
        StridedInterval::strided_wide(low, 1, (high - low) as u128 + 1, width)
    }

    /// Create a `StridedInterval` from base, stride and element count,
    /// normalizing into canonical form.
    pub fn strided(base: u64, stride: u64, count: u64, width: DataWidth) -> StridedInterval {
        StridedInterval::strided_wide(base, stride, count as u128, width)
    }

    fn strided_wide(base: u64, stride: u64, count: u128, width: DataWidth) -> StridedInterval {
        let base = width.truncate(base);
        if count == 0 {
            return StridedInterval::Bottom(width);
        }
        if count == 1 || stride == 0 {
            return StridedInterval::singleton(base, width);
        }
        if count > u64::MAX as u128 {
            return StridedInterval::Top(width);
        }
        let span = (count - 1) * stride as u128;
        if base as u128 + span > width.mask() as u128 {
            return StridedInterval::Top(width);
        }
        StridedInterval::Interval {
            base,
            stride,
            count: count as u64,
            width,
        }
    }

    /// The width of this `StridedInterval`.
    pub fn width(&self) -> DataWidth {
        match *self {
            StridedInterval::Top(width)
            | StridedInterval::Bottom(width)
            | StridedInterval::Interval { width, .. } => width,
        }
    }

    pub fn is_top(&self) -> bool {
        matches!(*self, StridedInterval::Top(_))
    }

    pub fn is_bottom(&self) -> bool {
        matches!(*self, StridedInterval::Bottom(_))
    }

    /// Is this the singleton set `{0}`?
    pub fn is_zero(&self) -> bool {
        self.as_singleton() == Some(0)
    }

    /// If this `StridedInterval` holds exactly one value, that value.
    pub fn as_singleton(&self) -> Option<u64> {
        match *self {
            StridedInterval::Interval { base, count: 1, .. } => Some(base),
            _ => None,
        }
    }

    /// The least value held, if any.
    pub fn lower(&self) -> Option<u64> {
        match *self {
            StridedInterval::Top(_) => Some(0),
            StridedInterval::Bottom(_) => None,
            StridedInterval::Interval { base, .. } => Some(base),
        }
    }

    /// The greatest value held, if any.
    pub fn upper(&self) -> Option<u64> {
        match *self {
            StridedInterval::Top(width) => Some(width.mask()),
            StridedInterval::Bottom(_) => None,
            StridedInterval::Interval {
                base,
                stride,
                count,
                ..
            } => Some(base + (count - 1) * stride),
        }
    }

    /// Does this `StridedInterval` contain the given concrete value?
    pub fn contains(&self, value: u64) -> bool {
        match *self {
            StridedInterval::Top(width) => value <= width.mask(),
            StridedInterval::Bottom(_) => false,
            StridedInterval::Interval {
                base,
                stride,
                count,
                ..
            } => {
                value >= base
                    && value <= base + (count - 1) * stride
                    && (value - base) % stride == 0
            }
        }
    }

    /// When the operand widths differ no common modulus exists; degrade
    /// to `⊤` at the wider width.
    fn mismatch(&self, other: &StridedInterval) -> Option<StridedInterval> {
        if self.width() == other.width() {
            None
        } else {
            Some(StridedInterval::top(self.width().max(other.width())))
        }
    }

    /// Join two `StridedInterval` into the least strided interval
    /// covering both.
    pub fn join(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        match (self, other) {
            (StridedInterval::Bottom(_), _) => other.clone(),
            (_, StridedInterval::Bottom(_)) => self.clone(),
            (StridedInterval::Top(_), _) | (_, StridedInterval::Top(_)) => {
                StridedInterval::top(width)
            }
            (
                &StridedInterval::Interval {
                    base: lbase,
                    stride: lstride,
                    count: lcount,
                    ..
                },
                &StridedInterval::Interval {
                    base: rbase,
                    stride: rstride,
                    count: rcount,
                    ..
                },
            ) => {
                let lstride = if lcount > 1 { lstride } else { 0 };
                let rstride = if rcount > 1 { rstride } else { 0 };
                let low = lbase.min(rbase);
                let high = self.upper().unwrap().max(other.upper().unwrap());
                let g = gcd(gcd(lstride, rstride), lbase.abs_diff(rbase));
                if g == 0 {
                    // Both singletons on the same base.
                    return StridedInterval::singleton(low, width);
                }
                StridedInterval::strided_wide(low, g, (high - low) as u128 / g as u128 + 1, width)
            }
        }
    }

    /// Apply the widening operator. The result is this interval when the
    /// other is already covered, and `⊤` as soon as any bound strays, so
    /// that a fixed point over growing intervals terminates quickly.
    pub fn widen(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        if self.join(other) == *self {
            self.clone()
        } else {
            StridedInterval::top(self.width())
        }
    }

    /// Modular addition.
    pub fn add(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || other.is_bottom() {
            return StridedInterval::bottom(width);
        }
        if self.is_top() || other.is_top() {
            return StridedInterval::top(width);
        }
        let (lbase, lstride, lcount) = self.fields();
        let (rbase, rstride, rcount) = other.fields();
        let base = width.truncate(lbase.wrapping_add(rbase));
        let span = (lcount - 1) as u128 * lstride as u128 + (rcount - 1) as u128 * rstride as u128;
        if span == 0 {
            return StridedInterval::singleton(base, width);
        }
        if base as u128 + span > width.mask() as u128 {
            // The sum straddles the modulus; a wrapped set has no
            // canonical non-wrapping form.
            return StridedInterval::top(width);
        }
        let g = gcd(
            if lcount > 1 { lstride } else { 0 },
            if rcount > 1 { rstride } else { 0 },
        );
        StridedInterval::strided_wide(base, g, span / g as u128 + 1, width)
    }

    /// Modular negation (two's complement).
    pub fn neg(&self) -> StridedInterval {
        match *self {
            StridedInterval::Top(width) => StridedInterval::top(width),
            StridedInterval::Bottom(width) => StridedInterval::bottom(width),
            StridedInterval::Interval {
                base,
                stride,
                count,
                width,
            } => {
                if count == 1 {
                    return StridedInterval::singleton(
                        width.truncate(base.wrapping_neg()),
                        width,
                    );
                }
                if base == 0 {
                    // Zero is its own negation; the rest negates without
                    // wrapping.
                    let rest = StridedInterval::strided(stride, stride, count - 1, width);
                    return rest.neg().join(&StridedInterval::singleton(0, width));
                }
                let high = base + (count - 1) * stride;
                StridedInterval::strided(
                    width.truncate(high.wrapping_neg()),
                    stride,
                    count,
                    width,
                )
            }
        }
    }

    /// Modular subtraction.
    pub fn sub(&self, other: &StridedInterval) -> StridedInterval {
        self.add(&other.neg())
    }

    /// Modular multiplication. Exact when either operand is a singleton
    /// and the products stay below the modulus; `⊤` otherwise.
    pub fn mul(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || other.is_bottom() {
            return StridedInterval::bottom(width);
        }
        if self.is_zero() || other.is_zero() {
            return StridedInterval::singleton(0, width);
        }
        if self.is_top() || other.is_top() {
            return StridedInterval::top(width);
        }
        if let (Some(lhs), Some(rhs)) = (self.as_singleton(), other.as_singleton()) {
            return StridedInterval::singleton(width.truncate(lhs.wrapping_mul(rhs)), width);
        }
        let (scale, interval) = match (self.as_singleton(), other.as_singleton()) {
            (Some(scale), None) => (scale, other),
            (None, Some(scale)) => (scale, self),
            _ => return StridedInterval::top(width),
        };
        let (base, stride, count) = interval.fields();
        let base = base as u128 * scale as u128;
        let stride = stride as u128 * scale as u128;
        let span = stride * (count - 1) as u128;
        if base + span > width.mask() as u128 || stride > u64::MAX as u128 {
            return StridedInterval::top(width);
        }
        StridedInterval::strided(base as u64, stride as u64, count, width)
    }

    /// Unsigned division. Exact only for singleton operands with a
    /// non-zero divisor.
    pub fn div(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || other.is_bottom() {
            return StridedInterval::bottom(width);
        }
        match (self.as_singleton(), other.as_singleton()) {
            (Some(lhs), Some(rhs)) if rhs != 0 => StridedInterval::singleton(lhs / rhs, width),
            _ => StridedInterval::top(width),
        }
    }

    /// Unsigned remainder. Exact only for singleton operands with a
    /// non-zero divisor.
    pub fn rem(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || other.is_bottom() {
            return StridedInterval::bottom(width);
        }
        match (self.as_singleton(), other.as_singleton()) {
            (Some(lhs), Some(rhs)) if rhs != 0 => StridedInterval::singleton(lhs % rhs, width),
            _ => StridedInterval::top(width),
        }
    }

    /// Bitwise and.
    pub fn and(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || other.is_bottom() {
            return StridedInterval::bottom(width);
        }
        if self.is_zero() || other.is_zero() {
            return StridedInterval::singleton(0, width);
        }
        match (self.as_singleton(), other.as_singleton()) {
            (Some(lhs), Some(rhs)) => StridedInterval::singleton(lhs & rhs, width),
            _ => StridedInterval::top(width),
        }
    }

    /// Bitwise or.
    pub fn or(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || other.is_bottom() {
            return StridedInterval::bottom(width);
        }
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        match (self.as_singleton(), other.as_singleton()) {
            (Some(lhs), Some(rhs)) => StridedInterval::singleton(lhs | rhs, width),
            _ => StridedInterval::top(width),
        }
    }

    /// Bitwise exclusive or.
    pub fn xor(&self, other: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(other) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || other.is_bottom() {
            return StridedInterval::bottom(width);
        }
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        match (self.as_singleton(), other.as_singleton()) {
            (Some(lhs), Some(rhs)) => StridedInterval::singleton(lhs ^ rhs, width),
            _ => StridedInterval::top(width),
        }
    }

    /// Modular left shift. A shift by the width or more yields zero.
    pub fn shl(&self, amount: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(amount) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || amount.is_bottom() {
            return StridedInterval::bottom(width);
        }
        let shift = match amount.as_singleton() {
            Some(shift) => shift,
            None => return StridedInterval::top(width),
        };
        if shift >= width.bits() as u64 {
            return StridedInterval::singleton(0, width);
        }
        if let Some(value) = self.as_singleton() {
            return StridedInterval::singleton(width.truncate(value << shift), width);
        }
        let (base, stride, count) = match *self {
            StridedInterval::Top(_) => return StridedInterval::top(width),
            _ => self.fields(),
        };
        let base = (base as u128) << shift;
        let stride = (stride as u128) << shift;
        let span = stride * (count - 1) as u128;
        if base + span > width.mask() as u128 {
            return StridedInterval::top(width);
        }
        StridedInterval::strided(base as u64, stride as u64, count, width)
    }

    /// Logical right shift. The result covers the shifted bounds at
    /// stride 1, since shifting generally destroys the stride.
    pub fn shr(&self, amount: &StridedInterval) -> StridedInterval {
        if let Some(top) = self.mismatch(amount) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || amount.is_bottom() {
            return StridedInterval::bottom(width);
        }
        let shift = match amount.as_singleton() {
            Some(shift) => shift,
            None => return StridedInterval::top(width),
        };
        if shift >= width.bits() as u64 {
            return StridedInterval::singleton(0, width);
        }
        match *self {
            StridedInterval::Top(_) => {
                StridedInterval::interval(0, width.mask() >> shift, width)
            }
            _ => StridedInterval::interval(
                self.lower().unwrap() >> shift,
                self.upper().unwrap() >> shift,
                width,
            ),
        }
    }

    /// Rotate left at the current width. Exact only for singletons.
    pub fn rol(&self, amount: &StridedInterval) -> StridedInterval {
        self.rotate(amount, false)
    }

    /// Rotate right at the current width. Exact only for singletons.
    pub fn ror(&self, amount: &StridedInterval) -> StridedInterval {
        self.rotate(amount, true)
    }

    fn rotate(&self, amount: &StridedInterval, right: bool) -> StridedInterval {
        if let Some(top) = self.mismatch(amount) {
            return top;
        }
        let width = self.width();
        if self.is_bottom() || amount.is_bottom() {
            return StridedInterval::bottom(width);
        }
        let bits = width.bits() as u64;
        match (self.as_singleton(), amount.as_singleton()) {
            (Some(value), Some(amount)) => {
                let amount = if right {
                    (bits - amount % bits) % bits
                } else {
                    amount % bits
                };
                if amount == 0 {
                    return StridedInterval::singleton(value, width);
                }
                let rotated =
                    width.truncate(value << amount) | (value >> (bits - amount));
                StridedInterval::singleton(rotated, width)
            }
            _ => StridedInterval::top(width),
        }
    }

    fn fields(&self) -> (u64, u64, u64) {
        match *self {
            StridedInterval::Interval {
                base,
                stride,
                count,
                ..
            } => (base, stride, count),
            _ => panic!("fields() on a sentinel strided interval"),
        }
    }
}

impl fmt::Display for StridedInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StridedInterval::Top(width) => write!(f, "⊤:{}", width),
            StridedInterval::Bottom(width) => write!(f, "⊥:{}", width),
            StridedInterval::Interval {
                base,
                stride,
                count,
                width,
            } => {
                if count == 1 {
                    write!(f, "0x{:x}:{}", base, width)
                } else {
                    write!(
                        f,
                        "{}[0x{:x},0x{:x}]:{}",
                        stride,
                        base,
                        base + (count - 1) * stride,
                        width
                    )
                }
            }
        }
    }
}
