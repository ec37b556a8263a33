//! Training progress tracking for the Q-learning loop
//!
//! Keeps lifetime totals (games, record, mean score) alongside rolling windows
//! of recent scores, game lengths and long-memory losses.

use std::collections::VecDeque;

/// Training statistics tracker
///
/// # Example
///
/// ```rust
/// use snake_qlearning::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// assert!(stats.record_game(3, 120));
/// assert!(!stats.record_game(1, 40));
/// stats.record_loss(4.5);
///
/// assert_eq!(stats.record(), 3);
/// assert!((stats.mean_score() - 2.0).abs() < 1e-6);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Recent final scores
    recent_scores: VecDeque<u32>,

    /// Recent game lengths in steps
    recent_lengths: VecDeque<usize>,

    /// Recent long-memory losses
    recent_losses: VecDeque<f32>,

    /// Games completed
    total_games: usize,

    /// Environment steps taken
    total_steps: usize,

    /// Sum of every final score
    total_score: u64,

    /// Best final score
    record: u32,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping `window_size` recent values per window
    pub fn new(window_size: usize) -> Self {
        Self {
            recent_scores: VecDeque::with_capacity(window_size),
            recent_lengths: VecDeque::with_capacity(window_size),
            recent_losses: VecDeque::with_capacity(window_size),
            total_games: 0,
            total_steps: 0,
            total_score: 0,
            record: 0,
            window_size,
        }
    }

    /// Record a finished game
    ///
    /// Returns `true` when `score` beats the previous record.
    pub fn record_game(&mut self, score: u32, length: usize) -> bool {
        Self::push_deque(&mut self.recent_scores, score, self.window_size);
        Self::push_deque(&mut self.recent_lengths, length, self.window_size);
        self.total_games += 1;
        self.total_steps += length;
        self.total_score += u64::from(score);

        let new_record = score > self.record;
        if new_record {
            self.record = score;
        }
        new_record
    }

    /// Carry over the best score of an earlier run
    pub fn set_record(&mut self, record: u32) {
        self.record = record;
    }

    /// Record the loss of a long-memory update
    pub fn record_loss(&mut self, loss: f32) {
        Self::push_deque(&mut self.recent_losses, loss, self.window_size);
    }

    /// Mean final score over every game, 0.0 before the first game
    pub fn mean_score(&self) -> f32 {
        if self.total_games == 0 {
            0.0
        } else {
            self.total_score as f32 / self.total_games as f32
        }
    }

    /// Mean final score over the rolling window
    pub fn recent_mean_score(&self) -> f32 {
        Self::mean(self.recent_scores.iter().map(|&s| s as f32))
    }

    /// Mean game length over the rolling window
    pub fn recent_mean_length(&self) -> f32 {
        Self::mean(self.recent_lengths.iter().map(|&l| l as f32))
    }

    /// Mean long-memory loss over the rolling window
    pub fn recent_mean_loss(&self) -> f32 {
        Self::mean(self.recent_losses.iter().copied())
    }

    pub fn record(&self) -> u32 {
        self.record
    }

    pub fn total_games(&self) -> usize {
        self.total_games
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Games: {} | Steps: {} | Record: {} | Mean: {:.2} | Recent: {:.2} | Len: {:.1} | Loss: {:.4}",
            self.total_games,
            self.total_steps,
            self.record,
            self.mean_score(),
            self.recent_mean_score(),
            self.recent_mean_length(),
            self.recent_mean_loss(),
        )
    }

    fn mean(values: impl ExactSizeIterator<Item = f32>) -> f32 {
        let len = values.len();
        if len == 0 {
            0.0
        } else {
            values.sum::<f32>() / len as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}
