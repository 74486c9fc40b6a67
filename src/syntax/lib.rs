// Copyright (c) 2016-2020 Fabian Schuiki

//! The syntax of the Pascal subset: a scanner, a generic LL(1) parser engine,
//! and the grammar that builds the abstract syntax tree.

#[macro_use]
extern crate log;
extern crate pasc_common;

pub mod lexer;
pub mod ll;
pub mod pascal;
pub mod token;
