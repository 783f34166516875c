// Service module exports

pub mod auth;
pub mod backend;
pub mod billing;
pub mod config;
pub mod database;
pub mod note;
pub mod subscription;
pub mod time_block;
