// Crate root library declaration and module exports.
pub mod calendar;
pub mod cli;
pub mod config;
pub mod context;
pub mod controller;
pub mod model;
pub mod report;
pub mod storage;
