//! Navigation and view switching utilities.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Steps,
    ContentReviews,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Steps => "Steps",
            View::ContentReviews => "Content Review",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::Steps, View::ContentReviews]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_previous_wrap() {
        assert_eq!(View::Steps.next(), View::ContentReviews);
        assert_eq!(View::ContentReviews.next(), View::Steps);
        assert_eq!(View::Steps.previous(), View::ContentReviews);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(View::from_index(1), Some(View::ContentReviews));
        assert_eq!(View::from_index(2), None);
    }
}
