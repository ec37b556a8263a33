use super::{
    action::{Action, Direction},
    config::GameConfig,
    error::GameError,
    state::{GameState, Position, Snake},
};
use rand::{Rng, seq::SliceRandom};
use tracing::trace;

/// Random draws attempted before falling back to scanning for free cells
const MAX_PLACEMENT_ATTEMPTS: usize = 1_000;

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalCause {
    /// Snake left the grid
    Wall,
    /// Snake ran into its own body
    SelfCollision,
    /// Snake wandered too long without eating
    Stalled,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the episode has terminated
    pub terminal: bool,
    /// Score after the step
    pub score: u32,
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Why the episode ended, if it did
    pub cause: Option<TerminalCause>,
}

impl StepOutcome {
    /// The `(reward, terminal, score)` triple
    pub fn triple(&self) -> (f32, bool, u32) {
        (self.reward, self.terminal, self.score)
    }
}

/// Deterministic grid-world simulator
///
/// All randomness (food placement) is drawn from the generator passed in by
/// the caller, so a seeded generator reproduces a run exactly.
#[derive(Debug, Clone)]
pub struct Environment {
    config: GameConfig,
    state: GameState,
}

impl Environment {
    /// Create a new environment and start the first episode
    pub fn new<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        config.validate().map_err(GameError::InvalidConfig)?;
        let state = initial_state(&config, config.initial_speed, rng)?;
        Ok(Self { config, state })
    }

    /// Start a new episode
    ///
    /// Speed carries over from the previous episode.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.state = initial_state(&self.config, self.state.speed, rng)?;
        Ok(())
    }

    /// Advance the game by one move
    pub fn step<R: Rng>(&mut self, action: Action, rng: &mut R) -> Result<StepOutcome, GameError> {
        if !self.state.is_alive {
            return Err(GameError::EpisodeOver);
        }

        let state = &mut self.state;
        state.frame_iteration += 1;

        state.direction = state.direction.turn(action);
        let new_head = state
            .snake
            .head()
            .moved_in_direction(state.direction, state.block_size);
        state.snake.push_head(new_head);

        if let Some(cause) = self.terminal_cause(new_head) {
            trace!(?cause, score = self.state.score, "episode terminated");
            self.state.is_alive = false;
            return Ok(StepOutcome {
                reward: self.config.death_penalty,
                terminal: true,
                score: self.state.score,
                ate_food: false,
                cause: Some(cause),
            });
        }

        let state = &mut self.state;
        let ate_food = new_head == state.food;
        let reward = if ate_food {
            state.score += 1;
            state.speed += self.config.speed_increase * state.speed;
            state.food = place_food(&state.snake, &self.config, rng)?;
            trace!(score = state.score, food = ?state.food, "food eaten");
            self.config.food_reward
        } else {
            state.snake.pop_tail();
            0.0
        };

        Ok(StepOutcome {
            reward,
            terminal: false,
            score: state.score,
            ate_food,
            cause: None,
        })
    }

    /// Advance the game with a one-hot `[straight, right, left]` action
    pub fn step_one_hot<R: Rng>(
        &mut self,
        encoded: &[f32],
        rng: &mut R,
    ) -> Result<StepOutcome, GameError> {
        let action = Action::try_from_one_hot(encoded)?;
        self.step(action, rng)
    }

    /// Whether a hypothetical head position would collide
    pub fn is_collision(&self, pos: Position) -> bool {
        self.state.is_collision(pos)
    }

    /// Read-only view of the current snapshot
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Check the freshly inserted head for episode-ending conditions
    fn terminal_cause(&self, head: Position) -> Option<TerminalCause> {
        let state = &self.state;

        if !state.is_in_bounds(head) {
            return Some(TerminalCause::Wall);
        }

        if state.snake.collides_with_body(head) {
            return Some(TerminalCause::SelfCollision);
        }

        let limit = self.config.stall_factor as usize * state.snake.len();
        if state.frame_iteration as usize > limit {
            return Some(TerminalCause::Stalled);
        }

        None
    }
}

/// Fresh snapshot: a straight snake at the centre heading right
fn initial_state<R: Rng>(
    config: &GameConfig,
    speed: f32,
    rng: &mut R,
) -> Result<GameState, GameError> {
    let head = Position::new(
        (config.columns() / 2) * config.block_size,
        (config.rows() / 2) * config.block_size,
    );
    let snake = Snake::new(
        head,
        Direction::Right,
        config.initial_length,
        config.block_size,
    );
    let food = place_food(&snake, config, rng)?;

    let mut state = GameState::new(
        snake,
        Direction::Right,
        food,
        config.width,
        config.height,
        config.block_size,
    );
    state.speed = speed;
    Ok(state)
}

/// Pick a uniformly random free cell
///
/// Rejection sampling first; if that keeps hitting the snake, choose among
/// the remaining free cells directly so the search always terminates.
fn place_food<R: Rng>(
    snake: &Snake,
    config: &GameConfig,
    rng: &mut R,
) -> Result<Position, GameError> {
    let columns = config.columns();
    let rows = config.rows();
    let block = config.block_size;

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = Position::new(
            rng.gen_range(0..columns) * block,
            rng.gen_range(0..rows) * block,
        );
        if !snake.occupies(pos) {
            return Ok(pos);
        }
    }

    let free: Vec<Position> = (0..rows)
        .flat_map(|row| (0..columns).map(move |col| Position::new(col * block, row * block)))
        .filter(|pos| !snake.occupies(*pos))
        .collect();

    free.choose(rng).copied().ok_or(GameError::GridFull {
        cells: (columns * rows) as usize,
    })
}
