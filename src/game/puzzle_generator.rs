use std::time::SystemTime;

use itertools::Itertools;
use log::{trace, warn};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::model::{Puzzle, WordLevels, PLACEHOLDER_WORD};

/// Most letters a jumble may leave in their original position.
pub const MAX_FIXED_LETTERS: usize = 2;

// Some words (repeated letters) can't satisfy both rules, so resampling has to stop somewhere.
const MAX_SHUFFLE_ATTEMPTS: usize = 1000;

/// Picks a random word for `level`, or the placeholder when the level has none.
pub fn pick_word<R: Rng + ?Sized>(word_levels: &WordLevels, level: usize, rng: &mut R) -> String {
    match word_levels.words_for(level).choose(rng) {
        Some(word) => word.clone(),
        None => {
            warn!(target: "puzzle_generator", "No words for level {}; using placeholder", level);
            PLACEHOLDER_WORD.to_string()
        }
    }
}

/// Number of positions where `shuffled` still has the original letter.
pub fn fixed_letter_count(word: &[char], shuffled: &[char]) -> usize {
    word.iter()
        .zip(shuffled)
        .filter(|(original, letter)| original == letter)
        .count()
}

fn is_jumbled(word: &[char], shuffled: &[char]) -> bool {
    shuffled != word && fixed_letter_count(word, shuffled) <= MAX_FIXED_LETTERS
}

/// Shuffles the letters of `word` until the result differs from the word and keeps at most
/// [`MAX_FIXED_LETTERS`] letters in place.
///
/// When no such ordering turns up the least revealing candidate seen is returned.
pub fn shuffle_word<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Vec<char> {
    let letters: Vec<char> = word.chars().collect();
    if letters.iter().all_equal() {
        return letters;
    }

    let mut best: Option<(bool, usize, Vec<char>)> = None;
    for _ in 0..MAX_SHUFFLE_ATTEMPTS {
        let mut candidate = letters.clone();
        candidate.shuffle(rng);
        if is_jumbled(&letters, &candidate) {
            return candidate;
        }

        let score = (candidate == letters, fixed_letter_count(&letters, &candidate));
        if best
            .as_ref()
            .map_or(true, |(same, fixed, _)| score < (*same, *fixed))
        {
            best = Some((score.0, score.1, candidate));
        }
    }

    warn!(
        target: "puzzle_generator",
        "Could not jumble {:?} within {} attempts", word, MAX_SHUFFLE_ATTEMPTS
    );
    best.map(|(_, _, candidate)| candidate).unwrap_or(letters)
}

/// Position revealed by the second hint: a random interior letter for words longer than
/// three letters, otherwise the second letter.
pub fn hint_position<R: Rng + ?Sized>(word_length: usize, rng: &mut R) -> usize {
    if word_length > 3 {
        rng.random_range(1..word_length - 1)
    } else {
        1
    }
}

/// Builds a fresh puzzle for `level`.
pub fn generate_puzzle<R: Rng + ?Sized>(
    word_levels: &WordLevels,
    level: usize,
    started_at: SystemTime,
    rng: &mut R,
) -> Puzzle {
    let word = pick_word(word_levels, level, rng);
    let shuffled = shuffle_word(&word, rng);
    let hint_index = hint_position(shuffled.len(), rng);
    trace!(
        target: "puzzle_generator",
        "Level {}: {} jumbled as {}", level, word, shuffled.iter().join("")
    );
    Puzzle::new(level, &word, shuffled, hint_index, started_at)
}
