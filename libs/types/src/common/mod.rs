//! Common numeric building blocks shared by every pool component

pub mod errors;
pub mod fixed_point;
