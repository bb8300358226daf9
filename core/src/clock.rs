use std::time::Duration;

/// Session-owned elapsed-time counter. Time only accumulates while running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionTimer {
    running: bool,
    elapsed: Duration,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Safe to call any number of times.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(dt);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }
}

/// `m:ss`, minutes unbounded.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_only_while_running() {
        let mut timer = SessionTimer::new();
        timer.advance(Duration::from_secs(5));
        assert_eq!(timer.elapsed_seconds(), 0);
        timer.start();
        timer.advance(Duration::from_millis(1500));
        timer.advance(Duration::from_millis(600));
        assert_eq!(timer.elapsed_seconds(), 2);
        timer.stop();
        timer.stop();
        timer.advance(Duration::from_secs(60));
        assert_eq!(timer.elapsed_seconds(), 2);
        assert!(!timer.is_running());
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(75), "1:15");
        assert_eq!(format_elapsed(3605), "60:05");
    }
}
