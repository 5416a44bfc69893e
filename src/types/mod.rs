//! Type definitions for the prediction form

pub mod policy;

pub use policy::{Column, InputBounds, PolicyHolder, RangeViolation, Region, Sex, Smoker};
