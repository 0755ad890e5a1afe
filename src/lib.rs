//! mkmk core library.
//!
//! This library reads C++ sources, follows their local `#include`
//! directives, and produces Makefile rules that compile every translation
//! unit and link every program defining `main` against exactly the objects it
//! needs.

pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod generator;
pub mod graph;
pub mod interner;
pub mod make_gen;
pub mod plan;
pub mod runner;
pub mod scanner;
