// Copyright (c) 2016-2020 Fabian Schuiki

//! A grammar-driven compiler front end for a Pascal subset.

// Re-export everything from the common crate.
pub extern crate pasc_common as common;
pub use crate::common::*;

pub extern crate pasc_syntax as syntax;
