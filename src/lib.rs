//! Brandlift: Brand Lift Estimation Library
//!
//! Estimates the causal effect of ad exposure on consumer brand metrics
//! from randomized (Control vs. Exposed) survey responses: per-question
//! significance testing with FDR correction, and ATE estimation via AIPW,
//! T-learner, X-learner, and an optional Bayesian logistic model.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;
