//! Fundify ML Prediction API
//!
//! HTTP surface and configuration for the campaign success predictor.

pub mod api;
pub mod config;
