//! Counters and timers for a run.

use derive_more::Display;
use serde::Serialize;
use std::ops::AddAssign;
use std::time::{Duration, Instant};
use time::UtcDateTime;
use time::format_description::well_known::Rfc3339;

/// How many collections or items were seen and what happened to them.
///
/// `total` counts everything enumerated, so `processed + skipped + failed`
/// only reaches it once a walk completes.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Serialize)]
#[display("{processed} processed, {skipped} skipped, {failed} failed, {total} total")]
pub struct Tally {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}
impl AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Statistics of one library walk, also exposed to report templates as `stats`.
#[derive(Clone, Debug, Serialize)]
pub struct LibraryStats {
    pub library: String,
    pub collections: Tally,
    pub items: Tally,
    /// Human readable wall time, e.g. `1.52s`.
    pub elapsed: String,
    /// RFC 3339 timestamp of when the walk started.
    pub started: String,
    #[serde(skip)]
    timer: Instant,
    #[serde(skip)]
    duration: Duration,
}
impl LibraryStats {
    pub fn start(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            collections: Tally::default(),
            items: Tally::default(),
            elapsed: String::new(),
            started: timestamp(),
            timer: Instant::now(),
            duration: Duration::ZERO,
        }
    }

    /// Stop the clock. Calling it again measures from the same start.
    pub fn finish(&mut self) {
        self.duration = self.timer.elapsed();
        self.elapsed = format_duration(self.duration);
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Statistics of a whole run: every library walked, and the totals.
#[derive(Debug)]
pub struct Stats {
    timer: Instant,
    libraries: Vec<LibraryStats>,
}
impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
impl Stats {
    pub fn new() -> Self {
        Self { timer: Instant::now(), libraries: Vec::new() }
    }

    pub fn push(&mut self, library: LibraryStats) {
        self.libraries.push(library);
    }

    pub fn libraries(&self) -> &[LibraryStats] {
        &self.libraries
    }

    /// Collection and item tallies summed over every library.
    pub fn totals(&self) -> (Tally, Tally) {
        self.libraries.iter().fold((Tally::default(), Tally::default()), |(mut c, mut i), library| {
            c += library.collections;
            i += library.items;
            (c, i)
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Log the final summary.
    pub fn log_summary(&self) {
        let (collections, items) = self.totals();
        tracing::info!(
            elapsed = %format_duration(self.elapsed()),
            libraries = self.libraries.len(),
            "Overall statistics"
        );
        tracing::info!("  Collections: {collections}");
        tracing::info!("  Items: {items}");
        for library in &self.libraries {
            tracing::info!(elapsed = %library.elapsed, "Statistics for library '{}'", library.library);
            tracing::info!("  Collections: {}", library.collections);
            tracing::info!("  Items: {}", library.items);
        }
    }
}

fn timestamp() -> String {
    UtcDateTime::now().format(&Rfc3339).unwrap_or_default()
}

fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    match seconds {
        0..60 => format!("{:.2}s", duration.as_secs_f64()),
        60..3600 => format!("{}m {:02}s", seconds / 60, seconds % 60),
        _ => format!("{}h {:02}m {:02}s", seconds / 3600, seconds / 60 % 60, seconds % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_millis(1520), "1.52s")]
    #[case(Duration::from_secs(61), "1m 01s")]
    #[case(Duration::from_secs(3723), "1h 02m 03s")]
    fn test_format_duration(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(duration), expected);
    }

    #[test]
    fn test_totals() {
        let mut stats = Stats::new();
        for (processed, skipped) in [(3, 1), (2, 0)] {
            let mut library = LibraryStats::start("Movies");
            library.collections = Tally { total: processed + skipped, processed, skipped, failed: 0 };
            library.items.total = 10;
            library.finish();
            stats.push(library);
        }
        let (collections, items) = stats.totals();
        assert_eq!(collections, Tally { total: 6, processed: 5, skipped: 1, failed: 0 });
        assert_eq!(items.total, 20);
        assert_eq!(collections.to_string(), "5 processed, 1 skipped, 0 failed, 6 total");
    }

    #[test]
    fn test_library_stats_serialize() {
        let mut library = LibraryStats::start("Movies");
        library.finish();
        let json = serde_json::to_value(&library).unwrap();
        assert_eq!(json["library"], "Movies");
        assert!(json["elapsed"].as_str().unwrap().ends_with('s'));
        assert!(json.get("timer").is_none());
        assert!(json["started"].as_str().unwrap().contains('T'));
    }
}
