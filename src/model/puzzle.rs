use std::time::{Duration, SystemTime};

use itertools::Itertools;
use uuid::Uuid;

/// Word handed out when a level has no word list.
pub const PLACEHOLDER_WORD: &str = "ERROR";

/// One jumbled word in play.
///
/// The letters of `shuffled` and `guess` together are always a permutation of `word`.
#[readonly::make]
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub playthrough_id: Uuid,
    pub level: usize,
    pub word: Vec<char>,
    /// Letters still available to pick, in display order.
    pub shuffled: Vec<char>,
    /// Letters picked so far, in pick order.
    pub guess: Vec<char>,
    pub started_at: SystemTime,
    /// Position revealed by the second hint.
    pub hint_index: usize,
}

impl Puzzle {
    pub fn new(
        level: usize,
        word: &str,
        shuffled: Vec<char>,
        hint_index: usize,
        started_at: SystemTime,
    ) -> Self {
        let word: Vec<char> = word.chars().collect();
        debug_assert_eq!(
            word.iter().sorted().collect_vec(),
            shuffled.iter().sorted().collect_vec(),
            "shuffled letters must be a permutation of the word"
        );
        Self {
            playthrough_id: Uuid::new_v4(),
            level,
            word,
            shuffled,
            guess: Vec::new(),
            started_at,
            hint_index,
        }
    }

    pub fn word_string(&self) -> String {
        self.word.iter().collect()
    }

    pub fn guess_string(&self) -> String {
        self.guess.iter().collect()
    }

    pub fn word_len(&self) -> usize {
        self.word.len()
    }

    pub fn is_placeholder(&self) -> bool {
        self.word_string() == PLACEHOLDER_WORD
    }

    /// Moves the letter at `index` of the pool onto the end of the guess.
    pub fn pick(&mut self, index: usize) -> Option<char> {
        if index >= self.shuffled.len() {
            return None;
        }
        let letter = self.shuffled.remove(index);
        self.guess.push(letter);
        Some(letter)
    }

    /// Picks the first pooled letter equal to `letter`, ignoring case.
    pub fn pick_letter(&mut self, letter: char) -> Option<char> {
        let index = self
            .shuffled
            .iter()
            .position(|candidate| candidate.to_lowercase().eq(letter.to_lowercase()))?;
        self.pick(index)
    }

    /// Returns the last picked letter to the end of the pool.
    pub fn undo(&mut self) -> Option<char> {
        let letter = self.guess.pop()?;
        self.shuffled.push(letter);
        Some(letter)
    }

    pub fn is_complete(&self) -> bool {
        self.guess.len() >= self.word.len()
    }

    pub fn is_solved(&self) -> bool {
        self.guess == self.word
    }

    pub fn elapsed(&self, now: SystemTime) -> Duration {
        now.duration_since(self.started_at).unwrap_or_default()
    }

    pub fn letter_at(&self, index: usize) -> Option<char> {
        self.word.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puzzle() -> Puzzle {
        Puzzle::new(0, "SPOON", "NOOPS".chars().collect(), 2, SystemTime::UNIX_EPOCH)
    }

    fn letters_in_play(puzzle: &Puzzle) -> String {
        puzzle
            .shuffled
            .iter()
            .chain(puzzle.guess.iter())
            .sorted()
            .collect()
    }

    #[test]
    fn test_pick_and_undo_keep_letters_in_play() {
        let mut puzzle = puzzle();

        assert_eq!(puzzle.pick(4), Some('S'));
        assert_eq!(puzzle.pick_letter('p'), Some('P'));
        assert_eq!(puzzle.guess_string(), "SP");
        assert_eq!(letters_in_play(&puzzle), "NOOPS".chars().sorted().collect::<String>());

        assert_eq!(puzzle.undo(), Some('P'));
        assert_eq!(puzzle.shuffled, vec!['N', 'O', 'O', 'P']);
        assert_eq!(puzzle.guess, vec!['S']);
    }

    #[test]
    fn test_invalid_picks_change_nothing() {
        let mut puzzle = puzzle();

        assert_eq!(puzzle.pick(5), None);
        assert_eq!(puzzle.pick_letter('z'), None);
        assert_eq!(puzzle.undo(), None);
        assert_eq!(puzzle.shuffled.len(), 5);
        assert!(puzzle.guess.is_empty());
    }

    #[test]
    fn test_complete_and_solved() {
        let mut puzzle = puzzle();
        for letter in "SPONO".chars() {
            puzzle.pick_letter(letter);
        }
        assert!(puzzle.is_complete());
        assert!(!puzzle.is_solved());

        for _ in 0..2 {
            puzzle.undo();
        }
        puzzle.pick_letter('O');
        puzzle.pick_letter('N');
        assert!(puzzle.is_solved());
        assert!(puzzle.shuffled.is_empty());
    }

    #[test]
    fn test_placeholder_detection() {
        let puzzle = Puzzle::new(9, PLACEHOLDER_WORD, "RORER".chars().collect(), 1, SystemTime::UNIX_EPOCH);
        assert!(puzzle.is_placeholder());
        assert_eq!(puzzle.letter_at(1), Some('R'));
        assert_eq!(puzzle.letter_at(5), None);
    }
}
