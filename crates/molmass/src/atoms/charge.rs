use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;

use crate::Charge;

impl Charge {
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub const fn is_negative(self) -> bool {
        self.0.is_negative()
    }
}

impl From<Charge> for Decimal {
    fn from(value: Charge) -> Self {
        value.0.into()
    }
}

impl Display for Charge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}
