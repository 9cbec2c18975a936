//! spckit-core - Statistical calculation and validation engine
//!
//! The calculation core behind the spckit analysis front ends:
//!
//! - **Validator**: cleans raw arrays (dropping non-finite values with an
//!   explicit count) and enforces per-analysis minimum sizes
//! - **Control chart**: individuals chart with moving-range limits and
//!   Western Electric run rules
//! - **Capability**: Cp/Cpk/Pp/Ppk/Cpm, sigma level, PPM defect estimates
//! - **ANOVA**: one-way decomposition with Tukey-Kramer post-hoc
//! - **Pareto**: vital-few ranking and Gini concentration
//! - **Probability plot**: quantile fits for normal, lognormal, Weibull
//!
//! Every engine is a pure function from validated input to a
//! serializable [`AnalysisResult`]; there is no shared state, no I/O,
//! and no interior mutability, so concurrent callers need no
//! coordination. Failures are typed [`AnalysisError`] values that
//! protocol front ends render as `{success: false, error: {...}}`.

pub mod analysis;
pub mod anova;
pub mod capability;
pub mod control;
pub mod error;
pub mod pareto;
pub mod probplot;
pub mod result;
pub mod types;
pub mod validate;

pub use analysis::{analyze, analyze_with, handle, AnalysisRequest, AnalysisResponse};
pub use error::{AnalysisError, ErrorKind, Result};
pub use result::{AnalysisKind, AnalysisResult, ChartPayload, Classification, Statistics};
pub use types::{CategoryTally, GroupedSeries, MeasurementSeries, SpecLimits};
