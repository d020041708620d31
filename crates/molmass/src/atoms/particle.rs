use std::fmt::{self, Display, Formatter};

use crate::{AverageMass, Charge, Charged, Massive, MonoisotopicMass, Particle};

use super::{
    atomic_database::{AtomicDatabase, ParticleDescription},
    errors::AtomicLookupError,
};

impl<'a> Particle<'a> {
    pub fn new(db: &'a AtomicDatabase, symbol: impl AsRef<str>) -> Result<Self, AtomicLookupError> {
        let symbol = symbol.as_ref();
        let (symbol, ParticleDescription { name, mass, charge }) = db
            .particles
            .get_key_value(symbol)
            .ok_or_else(|| AtomicLookupError::particle(symbol))?;
        Ok(Self {
            symbol,
            name,
            mass,
            charge,
        })
    }

    pub const fn name(&self) -> &'a str {
        self.name
    }
}

impl Display for Particle<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Massive for Particle<'_> {
    fn monoisotopic_mass(&self) -> MonoisotopicMass {
        MonoisotopicMass(*self.mass)
    }

    fn average_mass(&self) -> AverageMass {
        AverageMass(*self.mass)
    }
}

impl Charged for Particle<'_> {
    fn charge(&self) -> Charge {
        *self.charge
    }
}
