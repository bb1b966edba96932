pub mod accounting;
pub mod deposits;
pub mod health;
pub mod monthly;
pub mod projections;
pub mod projects;
