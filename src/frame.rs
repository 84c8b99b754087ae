use std::collections::VecDeque;

use image::RgbImage;

use crate::error::{Error, Result};

/// Number of raw frames stacked into one state.
pub const WINDOW: usize = 3;

/// Raw RGB observation as rendered by the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Builds a frame from row-major, interleaved RGB bytes.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = pixels.len();
        RgbImage::from_raw(width, height, pixels)
            .filter(|_| len == (width as usize) * (height as usize) * 3)
            .map(|image| Self { image })
            .ok_or(Error::FrameGeometry { width, height, len })
    }

    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, image::Rgb(rgb)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// Sliding window over the last [`WINDOW`] raw frames, oldest first.
///
/// Unlike the replay buffer this is always full: it starts with the reset
/// frame replicated and every push drops exactly one frame.
#[derive(Debug, Clone)]
pub struct FrameWindow {
    frames: VecDeque<Frame>,
}

impl FrameWindow {
    pub fn new(initial: Frame) -> Self {
        let mut frames = VecDeque::with_capacity(WINDOW);
        for _ in 1..WINDOW {
            frames.push_back(initial.clone());
        }
        frames.push_back(initial);
        Self { frames }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.pop_front();
        self.frames.push_back(frame);
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn newest(&self) -> &Frame {
        &self.frames[WINDOW - 1]
    }
}
