use chrono::{DateTime, Local};
use std::fmt::Write;

use crate::game::stats_manager::StatsManager;
use crate::helpers::format_duration;

const SHOWN_SCORES: usize = 10;

pub struct StatsView;

impl StatsView {
    fn format_date(stats_time: std::time::SystemTime) -> String {
        let local: DateTime<Local> = stats_time.into();
        local.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn render(stats_manager: &StatsManager) -> String {
        let mut output = String::new();
        let global = stats_manager.get_global_stats();

        let _ = writeln!(output, "Puzzles solved: {}", global.total_puzzles_solved);
        let _ = writeln!(
            output,
            "Time played:    {}",
            format_duration(global.total_time_played)
        );
        let _ = writeln!(output, "Hints used:     {}", global.total_hints_used);

        let scores = stats_manager.get_high_scores(SHOWN_SCORES);
        if scores.is_empty() {
            output.push_str("No puzzles solved yet.");
            return output;
        }

        let _ = writeln!(
            output,
            "\n{:<5} {:<8} {:<6} {:<6} {:<7} Date",
            "Rank", "Time", "Level", "Hints", "Letters"
        );
        for (i, score) in scores.iter().enumerate() {
            let _ = writeln!(
                output,
                "{:<5} {:<8} {:<6} {:<6} {:<7} {}",
                i + 1,
                format_duration(score.completion_time),
                score.level.saturating_add(1),
                score.hints_used,
                score.word_length,
                Self::format_date(score.solved_at)
            );
        }
        output.truncate(output.trim_end().len());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameStats;
    use crate::tests::TempDataDir;
    use std::time::{Duration, SystemTime};
    use test_context::test_context;
    use uuid::Uuid;

    #[test_context(TempDataDir)]
    #[test]
    fn test_empty_stats(ctx: &mut TempDataDir) {
        let output = StatsView::render(&StatsManager::new(&ctx.path));
        assert!(output.contains("Puzzles solved: 0"));
        assert!(output.ends_with("No puzzles solved yet."));
    }

    #[test_context(TempDataDir)]
    #[test]
    fn test_scores_are_ranked(ctx: &mut TempDataDir) {
        let mut manager = StatsManager::new(&ctx.path);
        for (seconds, level) in [(95, 3), (14, 0)] {
            manager
                .record_game(&GameStats {
                    completion_time: Duration::from_secs(seconds),
                    hints_used: 1,
                    level,
                    word_length: 6,
                    solved_at: SystemTime::now(),
                    playthrough_id: Uuid::new_v4(),
                })
                .unwrap();
        }

        let output = StatsView::render(&manager);
        let rows: Vec<&str> = output.lines().skip_while(|l| !l.starts_with("Rank")).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("1     00:14    1"));
        assert!(rows[2].starts_with("2     01:35    4"));
        assert!(output.contains("Time played:    01:49"));
    }
}
