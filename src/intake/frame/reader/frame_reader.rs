use crate::{error::FrameError, intake::frame::Frame};
use std::future::Future;
use std::pin::Pin;

pub enum ReadState {
    WaitingForLength,
    WaitingForFrame { expected_length: u32 },
}

pub trait FrameReader: Send + Sync {
    /// Reads the next frame. `Ok(None)` means the peer closed the stream between frames.
    fn read<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Frame>, FrameError>> + Send + 'a>>;
}
