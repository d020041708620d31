pub mod atomic_database;
mod charge;
pub mod chemical_composition;
mod count;
mod element;
pub mod errors;
mod mass;
mod mass_number;
mod offset_kind;
mod particle;
