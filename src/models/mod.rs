// Module exports for models

pub mod note;
pub mod subscription;
pub mod time_block;
pub mod user;
