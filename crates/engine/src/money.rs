use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use crate::{Currency, EngineError};

/// Signed money amount represented as **integer minor units** (kopecks,
/// cents).
///
/// Every amount in the engine goes through this type, so grouping sums stay
/// exact: `1234.56 + 65.00` is `1299.56`, never `1299.5599999`.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.format(Currency::Rub), "12.34₽");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Amount rounded to whole major units, half away from zero.
    #[must_use]
    pub fn whole(self) -> i64 {
        div_round(i128::from(self.0), 100) as i64
    }

    /// `round(100 × self / total)`, or 0 when `total` is zero.
    #[must_use]
    pub fn percent_of(self, total: Money) -> i64 {
        if total.is_zero() {
            return 0;
        }
        div_round(i128::from(self.0) * 100, i128::from(total.0)) as i64
    }

    /// Splits the amount in `parts` equal shares, rounded to the minor unit.
    #[must_use]
    pub fn split(self, parts: usize) -> Money {
        if parts == 0 {
            return Money::ZERO;
        }
        Money(div_round(i128::from(self.0), parts as i128) as i64)
    }

    /// Renders the amount with 2 decimals followed by the currency symbol.
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        format!("{self}{}", currency.symbol())
    }

    /// Renders the amount rounded to whole units followed by the currency
    /// symbol.
    #[must_use]
    pub fn format_whole(self, currency: Currency) -> String {
        format!("{}{}", self.whole(), currency.symbol())
    }
}

/// Integer division rounding half away from zero.
///
/// `den` must not be zero.
pub(crate) fn div_round(num: i128, den: i128) -> i128 {
    let negative = (num < 0) != (den < 0);
    let (num, den) = (num.abs(), den.abs());
    let rounded = (2 * num + den) / (2 * den);
    if negative { -rounded } else { rounded }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    /// Saturates at the `i64` bounds instead of wrapping.
    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses `[+|-]units[(.|,)cents]` into minor units, at most 2 decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (units, cents) = digits.split_once(['.', ',']).unwrap_or((digits, ""));

        let numeric = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if units.is_empty() || !numeric(units) || !numeric(cents) {
            return Err(EngineError::Validation(format!("invalid amount: {s}")));
        }
        if cents.len() > 2 {
            return Err(EngineError::Validation(
                "amount has more than 2 decimals".to_string(),
            ));
        }

        let minor: i64 = format!("{units}{cents:0<2}")
            .parse()
            .map_err(|_| EngineError::Validation("amount too large".to_string()))?;
        Ok(Money(if negative { -minor } else { minor }))
    }
}
