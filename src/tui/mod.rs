pub mod cards;
pub mod grid;
pub mod input;
pub mod mode;
pub mod view;
