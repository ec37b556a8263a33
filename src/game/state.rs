use super::action::Direction;

/// A position on the game grid, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one block in a direction
    pub fn moved_in_direction(&self, direction: Direction, block_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * block_size, dy * block_size)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
}

impl Snake {
    /// Create a straight snake trailing behind `head`, opposite to `direction`
    pub fn new(head: Position, direction: Direction, length: usize, block_size: i32) -> Self {
        let mut body = vec![head];

        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx * block_size, -dy * block_size);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Check if position is occupied by any segment, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Prepend a new head
    pub fn push_head(&mut self, head: Position) {
        self.body.insert(0, head);
    }

    /// Drop the last segment
    pub fn pop_tail(&mut self) -> Option<Position> {
        self.body.pop()
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body holds no segments
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Complete game snapshot
///
/// Mutated only by [`Environment`](super::Environment); readers (encoder,
/// renderer) only borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub direction: Direction,
    pub food: Position,
    pub width: i32,
    pub height: i32,
    pub block_size: i32,
    pub score: u32,
    /// Pacing hint for interactive frontends, in ticks per second
    pub speed: f32,
    /// Steps taken since the last reset
    pub frame_iteration: u32,
    pub is_alive: bool,
}

impl GameState {
    /// Create a new game state
    pub fn new(
        snake: Snake,
        direction: Direction,
        food: Position,
        width: i32,
        height: i32,
        block_size: i32,
    ) -> Self {
        Self {
            snake,
            direction,
            food,
            width,
            height,
            block_size,
            score: 0,
            speed: 0.0,
            frame_iteration: 0,
            is_alive: true,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x <= self.width - self.block_size
            && pos.y >= 0
            && pos.y <= self.height - self.block_size
    }

    /// Whether moving the head to `pos` would end the episode
    ///
    /// True if `pos` is outside the grid or on the body (head excluded).
    pub fn is_collision(&self, pos: Position) -> bool {
        !self.is_in_bounds(pos) || self.snake.collides_with_body(pos)
    }

    /// Number of cell columns
    pub fn columns(&self) -> i32 {
        self.width / self.block_size
    }

    /// Number of cell rows
    pub fn rows(&self) -> i32 {
        self.height / self.block_size
    }
}
