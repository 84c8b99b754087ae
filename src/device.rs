use candle_core::Device;
use once_cell::sync::Lazy;

/// Device shared by the encoder and both estimators.
pub static DEVICE: Lazy<Device> = Lazy::new(|| match Device::new_cuda(0) {
    Ok(device) => {
        tracing::info!("using CUDA device 0");
        device
    }
    Err(err) => {
        tracing::warn!(%err, "CUDA unavailable, falling back to CPU");
        Device::Cpu
    }
});
