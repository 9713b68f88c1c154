//! Common test utilities for synoptic.
//!
//! Synthetic GFS-like fields, scripted source loaders and float assertions.

#![allow(dead_code)]

pub mod assertions;
pub mod loaders;
pub mod test_data;
