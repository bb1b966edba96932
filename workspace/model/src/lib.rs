//! Domain records and SeaORM entities for deposits and their project
//! accounting configuration.

pub mod accounting;
pub mod deposit;
pub mod entities;
