pub mod choice_repository;
pub mod poll_repository;

pub use choice_repository::*;
pub use poll_repository::*;
