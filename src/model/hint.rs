use std::fmt::Display;

use super::Puzzle;

/// A revealed piece of the target word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    FirstLetter(char),
    /// `position` is zero-based.
    LetterAt { position: usize, letter: char },
    LastLetter(char),
}

impl Hint {
    /// Hints unlocked after `count` purchases: first letter, then the puzzle's hint position,
    /// then the last letter.
    pub fn revealed(puzzle: &Puzzle, count: u8) -> Vec<Hint> {
        let mut hints = Vec::new();
        if count >= 1 {
            if let Some(letter) = puzzle.word.first() {
                hints.push(Hint::FirstLetter(*letter));
            }
        }
        if count >= 2 {
            if let Some(letter) = puzzle.letter_at(puzzle.hint_index) {
                hints.push(Hint::LetterAt {
                    position: puzzle.hint_index,
                    letter,
                });
            }
        }
        if count >= 3 {
            if let Some(letter) = puzzle.word.last() {
                hints.push(Hint::LastLetter(*letter));
            }
        }
        hints
    }
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hint::FirstLetter(letter) => write!(f, "first letter is {}", letter),
            Hint::LetterAt { position, letter } => {
                write!(f, "letter at position {} is {}", position + 1, letter)
            }
            Hint::LastLetter(letter) => write!(f, "last letter is {}", letter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn test_hints_reveal_progressively() {
        let puzzle = Puzzle::new(0, "GARDEN", "NEDRAG".chars().collect(), 3, SystemTime::UNIX_EPOCH);

        assert!(Hint::revealed(&puzzle, 0).is_empty());
        assert_eq!(Hint::revealed(&puzzle, 1), vec![Hint::FirstLetter('G')]);
        assert_eq!(
            Hint::revealed(&puzzle, 3),
            vec![
                Hint::FirstLetter('G'),
                Hint::LetterAt {
                    position: 3,
                    letter: 'D'
                },
                Hint::LastLetter('N'),
            ]
        );
    }

    #[test]
    fn test_display_uses_one_based_positions() {
        let hint = Hint::LetterAt {
            position: 0,
            letter: 'Q',
        };
        assert_eq!(hint.to_string(), "letter at position 1 is Q");
    }
}
