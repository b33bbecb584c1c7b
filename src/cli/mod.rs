//! CLI infrastructure for the tabular Q-learning trainer
//!
//! This module provides the command-line interface for training on the
//! reference environment and inspecting saved checkpoints.

pub mod commands;
pub mod output;
