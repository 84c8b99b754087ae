use pyo3::{
    prelude::*,
    types::{PyBytes, PyDict},
};

use crate::{
    action::Controls,
    environment::{Environment, StepOutcome},
    error::Result,
    frame::Frame,
};

const ENV_ID: &str = "CarRacing-v2";

/// gymnasium's `CarRacing-v2`, driven through an embedded interpreter.
pub struct CarRacing {
    env: PyObject,
}

impl CarRacing {
    /// `render_mode` is `"human"` for a window, `"rgb_array"` otherwise.
    pub fn new(render_mode: &str) -> Result<Self> {
        Python::with_gil(|py| {
            let gymnasium = py.import_bound("gymnasium")?;
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("render_mode", render_mode)?;
            let env = gymnasium.call_method("make", (ENV_ID,), Some(&kwargs))?;
            tracing::info!(env = ENV_ID, render_mode, "simulator created");
            Ok(Self { env: env.unbind() })
        })
    }

    pub fn close(&self) -> Result<()> {
        Python::with_gil(|py| {
            self.env.bind(py).call_method0("close")?;
            Ok(())
        })
    }
}

fn to_frame(observation: &Bound<'_, PyAny>) -> Result<Frame> {
    let (height, width, _channels): (u32, u32, u32) = observation.getattr("shape")?.extract()?;
    let raw = observation.call_method0("tobytes")?;
    let bytes = raw.downcast::<PyBytes>().map_err(PyErr::from)?;
    Frame::from_rgb(width, height, bytes.as_bytes().to_vec())
}

impl Environment for CarRacing {
    fn reset(&mut self) -> Result<Frame> {
        Python::with_gil(|py| {
            let result = self.env.bind(py).call_method0("reset")?;
            to_frame(&result.get_item(0)?)
        })
    }

    fn step(&mut self, controls: Controls) -> Result<StepOutcome> {
        Python::with_gil(|py| {
            let action = (controls.steering, controls.gas, controls.brake);
            let result = self.env.bind(py).call_method1("step", (action,))?;

            let frame = to_frame(&result.get_item(0)?)?;
            let reward: f32 = result.get_item(1)?.extract()?;
            let terminated: bool = result.get_item(2)?.extract()?;
            let truncated: bool = result.get_item(3)?.extract()?;

            Ok(StepOutcome {
                frame,
                reward,
                terminal: terminated || truncated,
            })
        })
    }
}
