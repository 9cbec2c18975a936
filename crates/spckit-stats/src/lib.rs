//! spckit-stats - Statistical primitives for spckit
//!
//! This crate provides the numeric building blocks shared by every
//! analysis engine:
//!
//! - **Descriptive statistics**: mean, sample/population standard
//!   deviation, moving-range mean, percentiles, correlation, line fits
//! - **Special functions**: normal CDF/inverse-CDF, F-distribution tail,
//!   studentized range distribution, behind a pluggable provider
//! - **Weibull fitting**: maximum-likelihood shape/scale estimation
//!
//! # Design Philosophy
//!
//! Every function here is pure and deterministic: the same input always
//! produces the same bits. Divisor conventions (n-1 for sample, n for
//! population) and interpolation rules live in one place so that control
//! limits, capability indices, and goodness-of-fit numbers stay mutually
//! consistent.
//!
//! Distribution functions go through the [`SpecialFunctions`] trait with
//! two interchangeable providers: a statrs-backed one (default) and a
//! dependency-free portable one. Both satisfy the same numeric contract.

pub mod descriptive;
pub mod special;
pub mod weibull;

pub use descriptive::*;
pub use special::*;
pub use weibull::*;
