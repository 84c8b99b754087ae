use std::collections::VecDeque;

use candle_core::Tensor;
use rand::{Rng, seq::index};

/// One decision step: the state seen, the action index taken, what followed.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: Tensor,
    pub action: usize,
    pub next_state: Tensor,
    pub reward: f32,
    pub terminal: bool,
}

/// Bounded FIFO of transitions, oldest first.
#[derive(Debug)]
pub struct ReplayBuffer {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() >= self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// `amount` distinct transitions drawn uniformly, or `None` when the
    /// buffer holds fewer than that.
    pub fn sample<R: Rng + ?Sized>(&self, amount: usize, rng: &mut R) -> Option<Vec<&Transition>> {
        if amount > self.transitions.len() {
            return None;
        }
        let batch = index::sample(rng, self.transitions.len(), amount)
            .into_iter()
            .map(|i| &self.transitions[i])
            .collect();
        Some(batch)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn transition(id: usize) -> Transition {
        let state = Tensor::new(&[id as f32], &Device::Cpu).unwrap();
        Transition {
            state: state.clone(),
            action: id,
            next_state: state,
            reward: id as f32,
            terminal: false,
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut buffer = ReplayBuffer::new(3);
        for id in 0..7 {
            buffer.push(transition(id));
        }
        assert_eq!(buffer.len(), 3);
        let ids: Vec<usize> = buffer.iter().map(|t| t.action).collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }

    #[test]
    fn sample_returns_distinct_members() {
        let mut buffer = ReplayBuffer::new(10);
        for id in 0..10 {
            buffer.push(transition(id));
        }
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let batch = buffer.sample(6, &mut rng).unwrap();
            let ids: HashSet<usize> = batch.iter().map(|t| t.action).collect();
            assert_eq!(ids.len(), 6);
            assert!(ids.iter().all(|id| *id < 10));
        }
    }

    #[test]
    fn sample_larger_than_contents_is_refused() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.push(transition(0));
        buffer.push(transition(1));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(buffer.sample(3, &mut rng).is_none());
        assert_eq!(buffer.sample(2, &mut rng).unwrap().len(), 2);
    }
}
