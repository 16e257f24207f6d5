//! Rupee amounts for prices and order totals.

use serde::{Deserialize, Serialize};

/// An amount in Indian rupees, held as a whole number of paise.
///
/// Prices and discounts add up exactly and no rupee value ever passes
/// through a float. On the wire it is the bare paise count, so `₹12.34`
/// travels as `1234`. Displays as `₹12.34`, with a leading minus for
/// negative amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    paise: i64,
}

impl Money {
    pub const fn from_paise(paise: i64) -> Self {
        Self { paise }
    }

    /// `from_rupees(499)` is a ₹499.00 price tag.
    pub const fn from_rupees(rupees: i64) -> Self {
        Self {
            paise: rupees * 100,
        }
    }

    pub const fn zero() -> Self {
        Self { paise: 0 }
    }

    pub fn paise(&self) -> i64 {
        self.paise
    }

    /// Whole rupees, truncated toward zero: ₹12.34 gives 12.
    pub fn rupees(&self) -> i64 {
        self.paise / 100
    }

    /// The two digits after the rupee point, always non-negative: ₹12.34
    /// and -₹12.34 both give 34.
    pub fn paise_part(&self) -> i64 {
        self.paise.abs() % 100
    }

    pub fn is_positive(&self) -> bool {
        self.paise > 0
    }

    pub fn is_zero(&self) -> bool {
        self.paise == 0
    }

    /// A listing priced below zero is a catalogue error, never a discount.
    pub fn is_negative(&self) -> bool {
        self.paise < 0
    }

    /// Line total for `quantity` units at this unit price.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            paise: self.paise * i64::from(quantity),
        }
    }

    /// Coupon-style percentage; fractions of a paisa are dropped, so 10% of
    /// ₹9.99 is ₹0.99.
    pub fn percent_of(&self, percent: u32) -> Money {
        Money {
            paise: self.paise * i64::from(percent) / 100,
        }
    }

    /// Floors at ₹0.00, for totals a large discount would push below zero.
    pub fn clamp_non_negative(&self) -> Money {
        Money {
            paise: self.paise.max(0),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.paise < 0 {
            write!(f, "-₹{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "₹{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise + rhs.paise,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise - rhs.paise,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.paise += rhs.paise;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.paise -= rhs.paise;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
