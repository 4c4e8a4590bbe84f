use crate::error::PlaybackError;

#[cfg(feature = "native")]
mod cpal_backend;
#[cfg(feature = "native")]
pub use self::cpal_backend::CpalBackend;

/// An output device that pulls rendered blocks from the engine.
pub trait AudioBackend {
    fn start(&mut self) -> Result<(), PlaybackError>;
    fn stop(&mut self) -> Result<(), PlaybackError>;
}
