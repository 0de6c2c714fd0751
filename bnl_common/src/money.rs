use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

//--------------------------------------      Money       ------------------------------------------------------------
/// A monetary amount in integer cents.
///
/// All order totals, line prices and wallet balances in the system are `Money`. Keeping amounts in integer cents means
/// fee arithmetic is exact and never subject to floating-point drift.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {value} is too large to convert to Money")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses amounts in the form `12.34`, `$12.34` or `12` (a bare integer is read as whole dollars).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('$');
        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s),
        };
        let (dollars, cents) = match s.split_once('.') {
            Some((d, c)) => {
                if c.len() != 2 || !c.chars().all(|ch| ch.is_ascii_digit()) {
                    return Err(MoneyConversionError(format!("Invalid cents in amount: {s}")));
                }
                (d, c.parse::<i64>().unwrap_or(0))
            },
            None => (s, 0),
        };
        let dollars = dollars.parse::<i64>().map_err(|e| MoneyConversionError(format!("Invalid amount {s}: {e}")))?;
        if dollars < 0 {
            return Err(MoneyConversionError(format!("Invalid amount: {s}")));
        }
        Ok(Self(sign * (dollars * 100 + cents)))
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// Deducts a platform fee given in basis points and returns `(net, fee)`.
    ///
    /// The net amount is `gross * (10_000 - fee_bps) / 10_000`, rounded down, so the platform keeps the remainder
    /// cent on inexact splits.
    pub fn less_fee(&self, fee_bps: i64) -> (Money, Money) {
        let bps = fee_bps.clamp(0, 10_000);
        let net = Money(self.0 * (10_000 - bps) / 10_000);
        (net, *self - net)
    }
}

#[cfg(test)]
mod test {
    use super::Money;

    #[test]
    fn display_as_dollars() {
        assert_eq!(Money::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
        assert_eq!(Money::default().to_string(), "$0.00");
    }

    #[test]
    fn parse_amounts() {
        assert_eq!("12.34".parse::<Money>().unwrap(), Money::from_cents(1234));
        assert_eq!("$100.00".parse::<Money>().unwrap(), Money::from_cents(10_000));
        assert_eq!("7".parse::<Money>().unwrap(), Money::from_dollars(7));
        assert!("12.5".parse::<Money>().is_err());
    }

    #[test]
    fn fee_split_is_exact_for_whole_percentages() {
        // $100.00 at 5% => $95.00 net, $5.00 fee
        let (net, fee) = Money::from_dollars(100).less_fee(500);
        assert_eq!(net, Money::from_cents(9500));
        assert_eq!(fee, Money::from_cents(500));
        // $20.00 at 5% => $19.00 net
        let (net, fee) = Money::from_dollars(20).less_fee(500);
        assert_eq!(net, Money::from_cents(1900));
        assert_eq!(fee, Money::from_cents(100));
    }

    #[test]
    fn fee_split_rounds_net_down() {
        // $0.99 at 5% => 94.05c, net floors to 94c and the fee keeps the remainder
        let (net, fee) = Money::from_cents(99).less_fee(500);
        assert_eq!(net, Money::from_cents(94));
        assert_eq!(fee, Money::from_cents(5));
        assert_eq!(net + fee, Money::from_cents(99));
    }

    #[test]
    fn zero_fee_and_full_fee() {
        let gross = Money::from_cents(12_345);
        assert_eq!(gross.less_fee(0), (gross, Money::default()));
        assert_eq!(gross.less_fee(10_000), (Money::default(), gross));
    }
}
