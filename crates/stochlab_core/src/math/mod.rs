//! Precision-generic numerical helpers.

pub mod summation;
