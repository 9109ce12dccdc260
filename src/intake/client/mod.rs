pub mod client;
pub mod listener;

pub use client::{Client, ClientHandle};
pub use listener::IntakeListener;
