pub mod color;
pub mod frame;
pub mod source;

pub use frame::{Frame, RawFrame};
pub use source::{FrameSequence, FrameSource, ImageSequenceSource, RawFrameSequence};
