//! Core types for the `mkindex` orchestrator.
//!
//! Holds the run's positional values ([`args::IndexArgs`]), resolves the
//! orchestrator's home directory ([`home::Home`]), loads per-tree
//! settings from the JSON config file ([`tree::TreeConfig`]), reads pipeline
//! options ([`config::PipelineOptions`]), and turns them into the explicit
//! environment handed to every helper process ([`env::StepEnv`]).

pub mod args;
pub mod config;
pub mod env;
pub mod home;
pub mod tree;
