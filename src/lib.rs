#[macro_use]
extern crate tracing;

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod polls;
pub mod startup;
pub mod templates;
pub mod views;
pub mod voting;
