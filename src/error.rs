use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pixel buffer has {actual} bytes, expected {expected} (width * height * 4)")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("image width and height must be non-zero")]
    ZeroDimension,

    #[error("out of memory allocating the working mask")]
    OutOfMemory,
}
