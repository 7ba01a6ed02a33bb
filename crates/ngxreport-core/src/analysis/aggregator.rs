use super::{ReportRow, UrlStats, median, perc, round3};
use crate::log::{LineError, LogRecord};
use std::collections::HashMap;

/// Folds parsed log lines into per-url statistics and file-wide totals
#[derive(Debug, Default)]
pub struct Aggregator {
    urls: HashMap<String, UrlStats>,
    total_lines: usize,
    error_count: usize,
    total_count: usize,
    total_time: f64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one parser result, successful or not
    pub fn observe(&mut self, parsed: Result<LogRecord, LineError>) {
        match parsed {
            Ok(record) => self.push(record),
            Err(e) => self.push_error(&e),
        }
    }

    pub fn push(&mut self, record: LogRecord) {
        self.total_lines += 1;
        self.total_count += 1;
        self.total_time += record.request_time;
        self.urls
            .entry(record.url)
            .or_default()
            .add(record.request_time);
    }

    pub fn push_error(&mut self, error: &LineError) {
        tracing::trace!("Unparseable line: {}", error);
        self.total_lines += 1;
        self.error_count += 1;
    }

    /// Lines seen, including malformed ones
    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Successfully parsed requests
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn url_count(&self) -> usize {
        self.urls.len()
    }

    pub fn stats(&self, url: &str) -> Option<&UrlStats> {
        self.urls.get(url)
    }

    /// Percentage of lines that failed to parse
    pub fn error_rate(&self) -> f64 {
        perc(self.total_lines as f64, self.error_count as f64)
    }

    /// Finalize into report rows, slowest total time first, at most `limit`
    pub fn into_rows(self, limit: usize) -> Vec<ReportRow> {
        let total_count = self.total_count as f64;
        let total_time = self.total_time;

        let mut rows: Vec<ReportRow> = self
            .urls
            .into_iter()
            .map(|(url, stats)| ReportRow {
                count: stats.count,
                time_sum: round3(stats.time_sum),
                time_avg: round3(stats.time_avg()),
                time_max: round3(stats.time_max),
                time_med: round3(median(&stats.time_values)),
                count_perc: perc(total_count, stats.count as f64),
                time_perc: perc(total_time, stats.time_sum),
                url,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.time_sum
                .total_cmp(&a.time_sum)
                .then_with(|| a.url.cmp(&b.url))
        });
        rows.truncate(limit);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, request_time: f64) -> LogRecord {
        LogRecord {
            url: url.to_string(),
            request_time,
        }
    }

    #[test]
    fn test_single_url_two_requests() {
        let mut aggregator = Aggregator::new();
        aggregator.push(record("/a", 0.5));
        aggregator.push(record("/a", 0.3));

        let rows = aggregator.into_rows(10);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.url, "/a");
        assert_eq!(row.count, 2);
        assert_eq!(row.time_sum, 0.8);
        assert_eq!(row.time_avg, 0.4);
        assert_eq!(row.time_max, 0.5);
        assert_eq!(row.time_med, 0.4);
        assert_eq!(row.count_perc, 100.0);
        assert_eq!(row.time_perc, 100.0);
    }

    #[test]
    fn test_rows_sorted_by_time_sum_and_truncated() {
        let mut aggregator = Aggregator::new();
        aggregator.push(record("/fast", 0.1));
        aggregator.push(record("/slow", 2.0));
        aggregator.push(record("/medium", 0.5));
        aggregator.push(record("/medium", 0.5));

        let rows = aggregator.into_rows(2);
        let urls: Vec<&str> = rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["/slow", "/medium"]);
    }

    #[test]
    fn test_percentages() {
        let mut aggregator = Aggregator::new();
        aggregator.push(record("/a", 1.0));
        aggregator.push(record("/b", 1.0));
        aggregator.push(record("/b", 2.0));

        let rows = aggregator.into_rows(10);
        let b = rows.iter().find(|r| r.url == "/b").unwrap();
        let a = rows.iter().find(|r| r.url == "/a").unwrap();

        assert_eq!(b.count_perc, 66.667);
        assert_eq!(b.time_perc, 75.0);
        assert_eq!(a.count_perc, 33.333);
        assert_eq!(a.time_perc, 25.0);
    }

    #[test]
    fn test_errors_count_towards_lines_only() {
        let mut aggregator = Aggregator::new();
        aggregator.observe(Ok(record("/a", 0.2)));
        aggregator.observe(Err(LineError::MissingTime));
        aggregator.observe(Err(LineError::TooFewFields(2)));
        aggregator.observe(Ok(record("/a", 0.4)));

        assert_eq!(aggregator.total_lines(), 4);
        assert_eq!(aggregator.error_count(), 2);
        assert_eq!(aggregator.total_count(), 2);
        assert_eq!(aggregator.error_rate(), 50.0);
        assert_eq!(aggregator.url_count(), 1);

        let rows = aggregator.into_rows(10);
        assert_eq!(rows[0].count_perc, 100.0);
    }

    #[test]
    fn test_order_independent() {
        let times = [0.7, 0.1, 0.4, 0.9, 0.2];

        let mut forward = Aggregator::new();
        times.iter().for_each(|t| forward.push(record("/x", *t)));

        let mut backward = Aggregator::new();
        times.iter().rev().for_each(|t| backward.push(record("/x", *t)));

        assert_eq!(forward.into_rows(1), backward.into_rows(1));
    }

    #[test]
    fn test_empty_aggregator() {
        let aggregator = Aggregator::new();
        assert_eq!(aggregator.error_rate(), 0.0);
        assert!(aggregator.into_rows(10).is_empty());
    }
}
