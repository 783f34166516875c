mod app;
mod views;

pub use app::{TimeboxApp, LOCAL_USER_ID};
