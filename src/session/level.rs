/// Minimum mixed-mode score (out of 25) to clear a level.
pub const PASS_SCORE: u32 = 18;
/// Soft cap on the level counter; no auto-progression past it.
pub const MAX_LEVEL: u32 = 50;

/// What a completed mixed-mode session leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    /// Passed below the cap: start a fresh pool at this level.
    Advance(u32),
    /// Passed at the cap: stay completed, flagged as max level.
    MaxLevelReached,
    /// Below the pass score: no automatic action; retry keeps the level.
    Failed,
}

pub fn evaluate(score: u32, level: u32) -> LevelOutcome {
    if score < PASS_SCORE {
        LevelOutcome::Failed
    } else if level >= MAX_LEVEL {
        LevelOutcome::MaxLevelReached
    } else {
        LevelOutcome::Advance(level + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_pass_score_advances() {
        assert_eq!(evaluate(PASS_SCORE, 1), LevelOutcome::Advance(2));
        assert_eq!(evaluate(25, 49), LevelOutcome::Advance(50));
    }

    #[test]
    fn below_pass_score_fails_regardless_of_level() {
        assert_eq!(evaluate(PASS_SCORE - 1, 1), LevelOutcome::Failed);
        assert_eq!(evaluate(0, 50), LevelOutcome::Failed);
    }

    #[test]
    fn max_level_pass_does_not_advance() {
        assert_eq!(evaluate(25, MAX_LEVEL), LevelOutcome::MaxLevelReached);
    }
}
