use crate::{
    error::FrameError,
    intake::frame::{
        Frame,
        reader::{FrameReader, frame_reader::ReadState},
    },
};
use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

const FRAME_LENGTH_BYTES: usize = 4;
const MAX_FRAME_LENGTH: u32 = 64 * 1024;

/// Reads `[length][tag][payload]` frames from any async byte stream.
pub struct FramedAsyncBufferedReader<T>
where
    T: AsyncRead + Unpin + Sync + Send,
{
    reader: BufReader<T>,
}

impl<T: AsyncRead + Unpin + Sync + Send> FramedAsyncBufferedReader<T> {
    pub fn new(stream: T) -> Self {
        Self {
            reader: BufReader::new(stream),
        }
    }

    async fn read_frame_length(&mut self) -> Result<Option<u32>, FrameError> {
        // [length] is 4 bytes
        let mut length_buffer = [0u8; FRAME_LENGTH_BYTES];
        match self.reader.read_exact(&mut length_buffer).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(FrameError::Read(e)),
        }
        let length = u32::from_le_bytes(length_buffer);
        if length == 0 || length > MAX_FRAME_LENGTH {
            return Err(FrameError::InvalidFrameLength(
                MAX_FRAME_LENGTH as usize,
                length as usize,
            ));
        }
        Ok(Some(length))
    }

    async fn read_frame_data(&mut self, expected_length: u32) -> Result<Frame, FrameError> {
        let mut frame_buffer = vec![0u8; expected_length as usize];
        self.reader
            .read_exact(&mut frame_buffer)
            .await
            .map_err(FrameError::Read)?;
        Frame::try_from(frame_buffer.as_slice())
    }
}

impl<T: AsyncRead + Unpin + Sync + Send> FrameReader for FramedAsyncBufferedReader<T> {
    fn read<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Frame>, FrameError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = ReadState::WaitingForLength;
            loop {
                match &mut state {
                    ReadState::WaitingForLength => match self.read_frame_length().await? {
                        Some(expected_length) => {
                            state = ReadState::WaitingForFrame { expected_length };
                        }
                        None => return Ok(None),
                    },
                    ReadState::WaitingForFrame { expected_length } => {
                        return self.read_frame_data(*expected_length).await.map(Some);
                    }
                }
            }
        })
    }
}
