use std::{
    fmt::{self, Display, Formatter},
    ops::Neg,
};

use crate::OffsetKind;

impl OffsetKind {
    /// Applies this offset's sign to `value`
    pub fn offset<T: Neg<Output = T>>(self, value: T) -> T {
        match self {
            Self::Add => value,
            Self::Remove => -value,
        }
    }
}

impl Display for OffsetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Add => "+",
                Self::Remove => "-",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{Charge, MonoisotopicMass};

    use super::*;

    #[test]
    fn offset_kind_display() {
        assert_eq!(OffsetKind::Add.to_string(), "+");
        assert_eq!(OffsetKind::Remove.to_string(), "-");
    }

    #[test]
    fn offset_values() {
        let mass = MonoisotopicMass::from(dec!(18.01056468403));
        assert_eq!(OffsetKind::Add.offset(mass), mass);
        assert_eq!(OffsetKind::Remove.offset(mass), -mass);
        assert_eq!(OffsetKind::Remove.offset(Charge::from(2)), Charge::from(-2));
    }
}
