use burn::tensor::{Tensor, TensorData, backend::Backend};

use crate::game::{Action, Direction, GameState};

/// Number of features in an observation
pub const OBSERVATION_SIZE: usize = 11;

/// Binary feature vector describing the snake's surroundings
///
/// Layout:
/// - 0: danger straight ahead
/// - 1: danger after a right turn
/// - 2: danger after a left turn
/// - 3..=6: heading one-hot (left, right, up, down)
/// - 7: food left of head
/// - 8: food right of head
/// - 9: food above head
/// - 10: food below head
pub type Observation = [u8; OBSERVATION_SIZE];

/// Encode a game snapshot into an observation
pub fn create_observation(state: &GameState) -> Observation {
    let head = state.snake.head();
    let direction = state.direction;
    let food = state.food;

    let danger = |action: Action| {
        let probe = head.moved_in_direction(direction.turn(action), state.block_size);
        state.is_collision(probe)
    };

    [
        danger(Action::Straight),
        danger(Action::TurnRight),
        danger(Action::TurnLeft),
        direction == Direction::Left,
        direction == Direction::Right,
        direction == Direction::Up,
        direction == Direction::Down,
        food.x < head.x,
        food.x > head.x,
        food.y < head.y,
        food.y > head.y,
    ]
    .map(u8::from)
}

/// Stack observations into a `[batch, OBSERVATION_SIZE]` float tensor
pub fn observation_batch<'a, B: Backend>(
    observations: impl IntoIterator<Item = &'a Observation>,
    device: &B::Device,
) -> Tensor<B, 2> {
    let data: Vec<f32> = observations
        .into_iter()
        .flat_map(|obs| obs.iter().map(|&feature| f32::from(feature)))
        .collect();
    let batch = data.len() / OBSERVATION_SIZE;

    Tensor::<B, 2>::from_data(TensorData::new(data, [batch, OBSERVATION_SIZE]), device)
}
