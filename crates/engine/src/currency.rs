use serde::{Deserialize, Serialize};

/// Currency used to render amounts.
///
/// The engine stores every amount as an `i64` number of **minor units** (see
/// `Money`). Both supported currencies use 2 fraction digits, so `12.50 RUB`
/// ⇄ `1250`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Rub,
    Eur,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Eur => "EUR",
        }
    }

    /// Symbol appended to rendered amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Rub => "₽",
            Currency::Eur => "€",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

