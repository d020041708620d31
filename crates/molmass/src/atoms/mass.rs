use std::iter::Sum;

use crate::{AverageMass, MonoisotopicMass};

macro_rules! mass_sum_impls {
    ($($mass_type:ty),+ $(,)?) => {
        $(
            impl Sum for $mass_type {
                fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                    iter.fold(Self::default(), |acc, mass| acc + mass)
                }
            }
        )+
    };
}

mass_sum_impls!(MonoisotopicMass, AverageMass);
