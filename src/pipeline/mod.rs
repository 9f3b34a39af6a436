pub mod effects;
pub mod garden;
pub mod store;
