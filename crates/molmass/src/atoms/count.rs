use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    ops::Mul,
};

use rust_decimal::Decimal;

use crate::{AverageMass, Count, MonoisotopicMass};

impl Count {
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl From<Count> for Decimal {
    fn from(value: Count) -> Self {
        value.get().into()
    }
}

macro_rules! mass_mul_impls {
    // NOTE: `$mass_type` is a `tt` since it has to play the role of both a type (`ty`) and an expression (`expr`)
    ($($mass_type:tt),+ $(,)?) => {
        $(
            impl Mul<$mass_type> for Count {
                type Output = $mass_type;

                fn mul(self, rhs: $mass_type) -> Self::Output {
                    $mass_type(Decimal::from(self) * rhs.0)
                }
            }
        )+
    };
}

mass_mul_impls!(MonoisotopicMass, AverageMass);

impl Display for Count {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let count = self.get();
        if count > 1 {
            write!(f, "{count}")?;
        }
        Ok(())
    }
}

impl Default for Count {
    fn default() -> Self {
        Self(NonZeroU32::MIN)
    }
}
