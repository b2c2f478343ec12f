//! Frame and audio extraction through the external transcoder.
//!
//! - **Frames**: greyscale bitmaps at the profile's resolution, numbered
//!   from 1, at `30 / pulldown` frames per second.
//! - **Audio**: 16-bit PCM stereo waveform at 44.1 kHz.
//!
//! Both are thin invocation shapes around the transcoder; no pixels or
//! samples are touched here.

mod audio;
mod frames;
mod types;

pub use audio::{AudioExtractor, AUDIO_CHANNELS, AUDIO_CODEC, AUDIO_SAMPLE_RATE};
pub use frames::{count_frames, FrameExtractor};
pub use types::{ExtractedAudio, ExtractionError, ExtractionResult, FrameSet};
