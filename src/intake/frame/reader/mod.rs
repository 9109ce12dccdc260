pub mod frame_reader;
pub mod framed_async_buffered_reader;

pub use frame_reader::FrameReader;
pub use framed_async_buffered_reader::FramedAsyncBufferedReader;
