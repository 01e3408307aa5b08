extern crate cpal;
extern crate serde;

pub mod errors;
pub mod params;
pub mod rdft;
pub mod recorder;
pub mod spectrum;

mod buffer;
mod source;

pub use errors::RecorderError;
pub use params::Params;
pub use recorder::{Recorder, SpectrumCallback};
pub use source::{Source, Stream};
pub use spectrum::{Pipeline, SpectrumSlot};
