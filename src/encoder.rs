use candle_core::{Device, Tensor};

use crate::{
    config::EncoderConfig,
    error::Result,
    frame::{FrameWindow, WINDOW},
};

/// ITU-R 601-2 luma in 16-bit fixed point, rounded to nearest.
fn luma([r, g, b]: [u8; 3]) -> u8 {
    let weighted = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Turns the frame window into the `(3, H, W)` state tensor the estimators
/// consume: grayscale, HUD strip blacked out, intensities scaled to [0, 1],
/// oldest frame in channel 0.
#[derive(Debug, Clone)]
pub struct StateEncoder {
    config: EncoderConfig,
    device: Device,
}

impl StateEncoder {
    pub fn new(config: EncoderConfig, device: &Device) -> Self {
        Self {
            config,
            device: device.clone(),
        }
    }

    pub fn encode(&self, window: &FrameWindow) -> Result<Tensor> {
        let newest = window.newest();
        let (width, height) = (newest.width() as usize, newest.height() as usize);
        let mut data: Vec<f32> = Vec::with_capacity(WINDOW * width * height);

        for frame in window.frames() {
            for (_, y, pixel) in frame.image().enumerate_pixels() {
                if y >= self.config.hud_start_row {
                    data.push(0.0);
                } else {
                    data.push(f32::from(luma(pixel.0)) / 255.0);
                }
            }
        }

        Ok(Tensor::from_vec(data, (WINDOW, height, width), &self.device)?)
    }
}
