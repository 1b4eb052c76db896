//! Recall quality reported by the user after seeing an item.

use crate::error::ProgressError;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Maps the 1-4 grade buttons of a drill screen onto a rating.
    pub fn from_grade(n: u8) -> Result<Rating, ProgressError> {
        match n {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            _ => Err(ProgressError::InvalidRating(n.to_string())),
        }
    }

    /// Everything except Again counts as a correct answer.
    pub fn is_correct(self) -> bool {
        !matches!(self, Rating::Again)
    }
}

impl FromStr for Rating {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(ProgressError::InvalidRating(s.to_string())),
        }
    }
}
