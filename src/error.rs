use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("unable to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("softbuffer error: {0}")]
    Softbuffer(#[from] softbuffer::SoftBufferError),

    #[error("invalid colour {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("invalid size {0:?}, expected WIDTHxHEIGHT")]
    InvalidSize(String),

    #[error("invalid refresh rate {0}, expected a positive number")]
    InvalidFps(f32),
}

pub type Result<T> = std::result::Result<T, Error>;
