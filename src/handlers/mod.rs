//! Request handlers

pub mod detect;
pub mod health;
pub mod model;
