pub mod daily_stat;
pub mod due;
pub mod progress;
pub mod rating;
pub mod review_state;
pub mod scheduler;
pub mod stats;

pub use daily_stat::DailyStat;
pub use progress::Progress;
pub use rating::Rating;
pub use review_state::ReviewState;
pub use stats::ProgressStats;
