pub mod normalization;
pub mod matcher;
pub mod filter;
pub mod orchestrator;
