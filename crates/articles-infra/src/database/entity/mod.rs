//! SeaORM entities of the authoritative store.

pub mod article;
