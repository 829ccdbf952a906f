//! # Configuration Module
//!
//! This module provides the configuration structure for segmentation sessions.

pub mod config;
