//! Testing utilities for Rill crates

#![warn(missing_docs)]

mod output_capture;
mod process_capture;
mod recording_callable;
mod status_capture;

pub use output_capture::OutputCapture;
pub use process_capture::ProcessCapture;
pub use recording_callable::RecordingCallable;
pub use status_capture::StatusCapture;
