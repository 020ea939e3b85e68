pub mod questions;
pub mod turn;
