// Timebox Notes library
// Exports all modules for testing and reuse

pub mod models;
pub mod schedule;
pub mod services;
pub mod ui_egui;
pub mod utils;
