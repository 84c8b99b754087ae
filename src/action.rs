/// Continuous control triple sent to the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub steering: f32,
    pub gas: f32,
    pub brake: f32,
}

impl Controls {
    pub const fn new(steering: f32, gas: f32, brake: f32) -> Self {
        Self {
            steering,
            gas,
            brake,
        }
    }
}

/// Fixed, enumerable list of discrete controls the agent chooses from.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpace {
    actions: Vec<Controls>,
}

impl ActionSpace {
    /// Cartesian product of the three control axes, steering-major.
    pub fn product(steering: &[f32], gas: &[f32], brake: &[f32]) -> Self {
        let mut actions = Vec::with_capacity(steering.len() * gas.len() * brake.len());
        for &s in steering {
            for &g in gas {
                for &b in brake {
                    actions.push(Controls::new(s, g, b));
                }
            }
        }
        Self { actions }
    }

    pub fn car_racing() -> Self {
        Self::product(&[-1.0, 0.0, 1.0], &[0.0, 1.0], &[0.0, 0.2])
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Controls> {
        self.actions.get(index).copied()
    }
}
