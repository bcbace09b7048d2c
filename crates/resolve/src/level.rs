use serde::Serialize;

/// Level, bracket progress and a display label for an XP total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelInfo {
    pub level: u32,
    pub progress: f64,
    pub label: String,
}

/// Step function from XP to level over an ascending `minXp` table.
///
/// `thresholds[i]` is the minimum XP of level `i + 1`. The table is checked for
/// ordering by [`ResolverConfig::validate`](crate::ResolverConfig::validate);
/// an empty table behaves as a single level.
#[derive(Debug, Clone, Copy)]
pub struct LevelCalculator<'a> {
    thresholds: &'a [u64],
}

impl<'a> LevelCalculator<'a> {
    pub fn new(thresholds: &'a [u64]) -> Self {
        Self { thresholds }
    }

    pub fn max_level(&self) -> u32 {
        self.thresholds.len().max(1) as u32
    }

    /// Greatest level whose threshold is at or below `xp`, never below 1.
    pub fn level_for(&self, xp: u64) -> u32 {
        let reached = self.thresholds.iter().take_while(|&&min| min <= xp).count();
        reached.max(1) as u32
    }

    pub fn level_info(&self, xp: u64) -> LevelInfo {
        let level = self.level_for(xp);
        if level >= self.max_level() {
            return LevelInfo {
                level,
                progress: 1.0,
                label: format!("Max level reached ({xp} XP)"),
            };
        }

        let idx = (level - 1) as usize;
        let floor = self.thresholds[idx];
        let next = self.thresholds[idx + 1];
        let width = next.saturating_sub(floor);
        if width == 0 {
            return LevelInfo {
                level,
                progress: 1.0,
                label: format!("0 / 0 XP to level {}", level + 1),
            };
        }

        let gained = xp.saturating_sub(floor);
        let progress = (gained as f64 / width as f64).clamp(0.0, 1.0);
        LevelInfo {
            level,
            progress,
            label: format!("{gained} / {width} XP to level {}", level + 1),
        }
    }
}
