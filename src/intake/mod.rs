pub mod client;
pub mod frame;

pub use client::{Client, ClientHandle, IntakeListener};
pub use frame::{ControlOp, Frame};
