use thiserror::Error;

/// RecorderError is returned from recorder lifecycle operations. Per-period
/// conditions (a short read at shutdown, queue overflow) are contained in the
/// dispatcher and logged instead of surfacing here.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("invalid capture config: {0}")]
    Config(String),
    #[error("could not build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("could not start capture: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("could not stop capture: {0}")]
    Pause(#[from] cpal::PauseStreamError),
}
