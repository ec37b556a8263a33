use serde::{Deserialize, Serialize};

/// Configuration for the game
///
/// Grid dimensions are in pixels; every position on the grid is a multiple of
/// `block_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the playing field
    pub width: i32,
    /// Height of the playing field
    pub height: i32,
    /// Side length of one grid cell
    pub block_size: i32,
    /// Initial pacing in ticks per second (only consumed by interactive frontends)
    pub initial_speed: f32,
    /// Relative speed increase applied every time food is eaten
    pub speed_increase: f32,
    /// Initial length of the snake
    pub initial_length: usize,
    /// An episode is cut off once the frame counter exceeds `stall_factor * snake length`
    pub stall_factor: u32,

    // Rewards (for RL)
    /// Reward for eating food
    pub food_reward: f32,
    /// Penalty for dying or stalling
    pub death_penalty: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            block_size: 20,
            initial_speed: 12.0,
            speed_increase: 0.05,
            initial_length: 3,
            stall_factor: 100,
            food_reward: 10.0,
            death_penalty: -10.0,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom field size
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Create a configuration from a size expressed in cells
    pub fn with_cells(columns: i32, rows: i32, block_size: i32) -> Self {
        Self {
            width: columns * block_size,
            height: rows * block_size,
            block_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing (10x10 cells)
    pub fn small() -> Self {
        Self::with_cells(10, 10, 20)
    }

    /// Number of cell columns
    pub fn columns(&self) -> i32 {
        self.width / self.block_size
    }

    /// Number of cell rows
    pub fn rows(&self) -> i32 {
        self.height / self.block_size
    }

    /// Validate configuration parameters
    ///
    /// Returns the first invalid field as an error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.block_size <= 0 {
            return Err(format!(
                "block_size must be positive, got {}",
                self.block_size
            ));
        }

        if self.width <= 0 || self.width % self.block_size != 0 {
            return Err(format!(
                "width must be a positive multiple of block_size ({}), got {}",
                self.block_size, self.width
            ));
        }

        if self.height <= 0 || self.height % self.block_size != 0 {
            return Err(format!(
                "height must be a positive multiple of block_size ({}), got {}",
                self.block_size, self.height
            ));
        }

        if self.initial_length == 0 {
            return Err("initial_length must be at least 1".to_string());
        }

        // The snake spawns heading right from the centre column
        if (self.columns() / 2) < self.initial_length as i32 - 1 {
            return Err(format!(
                "grid of {} columns is too narrow for a snake of length {}",
                self.columns(),
                self.initial_length
            ));
        }

        if self.initial_speed <= 0.0 {
            return Err(format!(
                "initial_speed must be positive, got {}",
                self.initial_speed
            ));
        }

        if self.speed_increase < 0.0 {
            return Err(format!(
                "speed_increase must be non-negative, got {}",
                self.speed_increase
            ));
        }

        if self.stall_factor == 0 {
            return Err("stall_factor must be at least 1".to_string());
        }

        Ok(())
    }
}
