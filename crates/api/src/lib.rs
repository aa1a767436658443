//! Domain model, persistence gateway contracts and application services for the
//! exercise-management platform.

pub mod collaborators;
mod error;
pub mod exercise;
pub mod page;
pub mod participation;
pub mod quiz;
pub mod result;
pub mod token;

pub use error::*;
