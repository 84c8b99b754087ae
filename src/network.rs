use candle_core::{DType, Device, Tensor};
use candle_nn::{
    AdamW, Conv2d, Conv2dConfig, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap,
    conv2d, linear, loss,
};

use crate::{
    error::{Error, Result},
    estimator::{Parameters, ValueEstimator},
    frame::WINDOW,
};

/// Side length of the square frames the network is laid out for.
pub const FRAME_SIZE: usize = 96;

const CONV1_FILTERS: usize = 6;
const CONV1_KERNEL: usize = 7;
const CONV1_STRIDE: usize = 3;
const CONV2_FILTERS: usize = 12;
const CONV2_KERNEL: usize = 4;
const POOL: usize = 2;
const HIDDEN: usize = 216;

const fn conv_out(size: usize, kernel: usize, stride: usize) -> usize {
    (size - kernel) / stride + 1
}

/// Width of the flattened feature map feeding the dense layers.
pub const fn flattened_features(frame_size: usize) -> usize {
    let side = conv_out(frame_size, CONV1_KERNEL, CONV1_STRIDE) / POOL;
    let side = conv_out(side, CONV2_KERNEL, 1) / POOL;
    CONV2_FILTERS * side * side
}

/// Convolutional Q-network over a stack of three 96x96 grayscale frames.
pub struct ConvQNetwork {
    conv1: Conv2d,
    conv2: Conv2d,
    hidden: Linear,
    head: Linear,
    var_map: VarMap,
    optimiser: AdamW,
}

impl ConvQNetwork {
    pub fn new(action_count: usize, learning_rate: f64, device: &Device) -> Result<Self> {
        let vm = VarMap::new();
        let vb = VarBuilder::from_varmap(&vm, DType::F32, device);

        let conv1 = conv2d(
            WINDOW,
            CONV1_FILTERS,
            CONV1_KERNEL,
            Conv2dConfig {
                stride: CONV1_STRIDE,
                ..Default::default()
            },
            vb.pp("conv1"),
        )?;
        let conv2 = conv2d(
            CONV1_FILTERS,
            CONV2_FILTERS,
            CONV2_KERNEL,
            Conv2dConfig::default(),
            vb.pp("conv2"),
        )?;
        let hidden = linear(flattened_features(FRAME_SIZE), HIDDEN, vb.pp("hidden"))?;
        let head = linear(HIDDEN, action_count, vb.pp("head"))?;

        let optimiser = AdamW::new(
            vm.all_vars(),
            ParamsAdamW {
                lr: learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        Ok(Self {
            conv1,
            conv2,
            hidden,
            head,
            var_map: vm,
            optimiser,
        })
    }

    fn forward(&self, states: &Tensor) -> candle_core::Result<Tensor> {
        let x = self.conv1.forward(states)?.relu()?.max_pool2d(POOL)?;
        let x = self.conv2.forward(&x)?.relu()?.max_pool2d(POOL)?;
        let x = x.flatten_from(1)?;
        let x = self.hidden.forward(&x)?.relu()?;
        self.head.forward(&x)
    }
}

impl ValueEstimator for ConvQNetwork {
    fn predict(&self, states: &Tensor) -> Result<Tensor> {
        Ok(self.forward(states)?.detach())
    }

    fn fit(&mut self, states: &Tensor, targets: &Tensor) -> Result<()> {
        let predictions = self.forward(states)?;
        let loss = loss::mse(&predictions, targets)?;
        self.optimiser.backward_step(&loss)?;
        Ok(())
    }

    fn parameters(&self) -> Result<Parameters> {
        let vars = self.var_map.data().lock().map_err(|_| Error::LockPoisoned)?;
        let mut tensors = std::collections::HashMap::with_capacity(vars.len());
        for (name, var) in vars.iter() {
            tensors.insert(name.clone(), var.as_tensor().copy()?.detach());
        }
        Ok(Parameters::new(tensors))
    }

    fn set_parameters(&mut self, parameters: &Parameters) -> Result<()> {
        let vars = self.var_map.data().lock().map_err(|_| Error::LockPoisoned)?;
        for (name, var) in vars.iter() {
            var.set(parameters.require(name)?)?;
        }
        Ok(())
    }
}
