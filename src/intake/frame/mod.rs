pub mod frame;
pub mod reader;

pub use frame::{ControlOp, Frame};
pub use reader::{FrameReader, FramedAsyncBufferedReader};
