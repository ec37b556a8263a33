use super::error::GameError;

/// Compass direction the snake is heading
///
/// Screen coordinates: x grows to the right, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Directions in clockwise order, starting from `Right`
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    fn clockwise_index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Next direction in the clockwise cycle
    pub fn clockwise(self) -> Self {
        Self::CLOCKWISE[(self.clockwise_index() + 1) % Self::CLOCKWISE.len()]
    }

    /// Previous direction in the clockwise cycle
    pub fn counter_clockwise(self) -> Self {
        let len = Self::CLOCKWISE.len();
        Self::CLOCKWISE[(self.clockwise_index() + len - 1) % len]
    }

    /// Unit step (dx, dy) in cells for this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Absolute direction reached by applying a relative action
    pub fn turn(self, action: Action) -> Self {
        match action {
            Action::Straight => self,
            Action::TurnRight => self.clockwise(),
            Action::TurnLeft => self.counter_clockwise(),
        }
    }
}

/// Steering action relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Straight,
    TurnRight,
    TurnLeft,
}

impl Action {
    /// Number of discrete actions
    pub const COUNT: usize = 3;

    /// All actions in one-hot index order
    pub const ALL: [Action; Action::COUNT] = [Action::Straight, Action::TurnRight, Action::TurnLeft];

    /// Index of this action in the one-hot encoding
    pub fn index(self) -> usize {
        match self {
            Action::Straight => 0,
            Action::TurnRight => 1,
            Action::TurnLeft => 2,
        }
    }

    /// Action for a one-hot index, `None` if out of range
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// One-hot encoding `[straight, right, left]`
    pub fn one_hot(self) -> [f32; Action::COUNT] {
        let mut encoded = [0.0; Action::COUNT];
        encoded[self.index()] = 1.0;
        encoded
    }

    /// Decode a one-hot vector
    ///
    /// Fails unless the slice has exactly three elements of which exactly one
    /// is non-zero.
    pub fn try_from_one_hot(encoded: &[f32]) -> Result<Self, GameError> {
        if encoded.len() != Action::COUNT {
            return Err(GameError::InvalidAction(format!(
                "expected {} elements, got {}",
                Action::COUNT,
                encoded.len()
            )));
        }

        let mut active = encoded
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0.0)
            .map(|(idx, _)| idx);

        match (active.next(), active.next()) {
            (Some(idx), None) => Ok(Self::ALL[idx]),
            (None, _) => Err(GameError::InvalidAction(
                "no active element".to_string(),
            )),
            (Some(_), Some(_)) => Err(GameError::InvalidAction(
                "more than one active element".to_string(),
            )),
        }
    }

    /// Relative action that steers from `current` towards the absolute `target`
    ///
    /// A reversal request cannot be expressed as a single turn and maps to
    /// `Straight`.
    pub fn towards(current: Direction, target: Direction) -> Self {
        if target == current.clockwise() {
            Action::TurnRight
        } else if target == current.counter_clockwise() {
            Action::TurnLeft
        } else {
            Action::Straight
        }
    }
}
