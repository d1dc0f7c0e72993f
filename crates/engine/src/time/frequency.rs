use std::collections::VecDeque;

pub const FREQUENCY_HISTORY_LEN: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrequencyStats {
    pub last_hz: f32,
    pub avg_hz: f32,
    pub max_hz: f32,
    pub samples: usize,
}

/// Rolling window of the last `FREQUENCY_HISTORY_LEN` frequency samples.
/// Sum and peak are kept current as samples enter and leave.
#[derive(Debug, Default)]
pub(crate) struct FrequencyHistory {
    window: VecDeque<f32>,
    sum_hz: f32,
    peak_hz: f32,
}

impl FrequencyHistory {
    pub(crate) fn push(&mut self, value_hz: f32) {
        let evicted = if self.window.len() == FREQUENCY_HISTORY_LEN {
            self.window.pop_front()
        } else {
            None
        };
        self.window.push_back(value_hz);
        self.sum_hz += value_hz - evicted.unwrap_or(0.0);

        match evicted {
            // The peak left the window; rescan what remains.
            Some(old) if old >= self.peak_hz && value_hz < old => {
                self.peak_hz = self.window.iter().copied().fold(value_hz, f32::max);
            }
            _ if self.window.len() == 1 => self.peak_hz = value_hz,
            _ => self.peak_hz = self.peak_hz.max(value_hz),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.window.len()
    }

    /// Samples oldest first.
    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.window.iter().copied()
    }

    pub(crate) fn stats(&self) -> FrequencyStats {
        let Some(&last_hz) = self.window.back() else {
            return FrequencyStats::default();
        };
        FrequencyStats {
            last_hz,
            avg_hz: self.sum_hz / self.window.len() as f32,
            max_hz: self.peak_hz,
            samples: self.window.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_zeroed() {
        let history = FrequencyHistory::default();
        assert_eq!(history.stats(), FrequencyStats::default());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn partial_window_average_uses_sample_count() {
        let mut history = FrequencyHistory::default();
        history.push(58.0);
        history.push(60.0);
        history.push(62.0);
        let stats = history.stats();

        assert_eq!(stats.last_hz, 62.0);
        assert!((stats.avg_hz - 60.0).abs() < 0.0001);
        assert_eq!(stats.max_hz, 62.0);
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn full_window_drops_oldest_sample() {
        let mut history = FrequencyHistory::default();
        history.push(1000.0);
        for _ in 1..FREQUENCY_HISTORY_LEN {
            history.push(60.0);
        }
        history.push(30.0);
        let stats = history.stats();

        assert_eq!(history.len(), FREQUENCY_HISTORY_LEN);
        assert_eq!(stats.max_hz, 60.0);
        assert_eq!(history.iter().next(), Some(60.0));
        assert_eq!(history.iter().last(), Some(30.0));
        let expected_avg = ((FREQUENCY_HISTORY_LEN as f32 - 1.0) * 60.0 + 30.0)
            / FREQUENCY_HISTORY_LEN as f32;
        assert!((stats.avg_hz - expected_avg).abs() < 0.01);
    }

    #[test]
    fn peak_tracks_samples_entering_and_leaving() {
        let mut history = FrequencyHistory::default();
        history.push(50.0);
        history.push(75.0);
        for _ in 2..FREQUENCY_HISTORY_LEN {
            history.push(40.0);
        }
        assert_eq!(history.stats().max_hz, 75.0);

        history.push(45.0);
        assert_eq!(history.stats().max_hz, 75.0);
        history.push(45.0);
        assert_eq!(history.stats().max_hz, 45.0);
        history.push(90.0);
        assert_eq!(history.stats().max_hz, 90.0);
    }
}
