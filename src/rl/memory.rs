//! Experience replay memory
//!
//! A bounded FIFO of transitions. Once full, every new transition evicts the
//! oldest one. Training batches are drawn uniformly without replacement.

use rand::{Rng, seq::index};
use std::collections::VecDeque;

use super::observation::Observation;
use crate::game::Action;

/// One step of experience
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation before the action
    pub state: Observation,
    /// Action taken
    pub action: Action,
    /// Reward received
    pub reward: f32,
    /// Observation after the action
    pub next_state: Observation,
    /// Whether the action ended the episode
    pub terminal: bool,
}

impl Transition {
    pub fn new(
        state: Observation,
        action: Action,
        reward: f32,
        next_state: Observation,
        terminal: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            terminal,
        }
    }
}

/// Bounded replay memory
///
/// # Example
///
/// ```rust
/// use snake_qlearning::game::Action;
/// use snake_qlearning::rl::{ReplayMemory, Transition};
///
/// let mut memory = ReplayMemory::new(2);
/// for reward in [1.0, 2.0, 3.0] {
///     memory.push(Transition::new([0; 11], Action::Straight, reward, [0; 11], false));
/// }
///
/// assert_eq!(memory.len(), 2);
/// assert_eq!(memory.iter().next().unwrap().reward, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Create an empty memory holding at most `capacity` transitions
    pub fn new(capacity: usize) -> Self {
        Self {
            // Grow on demand; the default capacity is large
            transitions: VecDeque::new(),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }

        if self.transitions.len() >= self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draw a training batch
    ///
    /// Returns every stored transition (oldest first) when at most
    /// `batch_size` are stored, otherwise exactly `batch_size` distinct
    /// transitions chosen uniformly at random.
    pub fn sample<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        let n = self.transitions.len();

        if n <= batch_size {
            return self.transitions.iter().collect();
        }

        index::sample(rng, n, batch_size)
            .into_iter()
            .map(|i| &self.transitions[i])
            .collect()
    }

    /// Iterate over stored transitions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    /// Get the number of stored transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the memory is empty
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Maximum number of stored transitions
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
