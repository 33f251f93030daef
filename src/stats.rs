use serde::Serialize;

/// Running tally of checks and error categories for a session.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StatisticsCollector {
    /// Categories in first-seen order, with their counts.
    categories: Vec<(String, usize)>,
    total_checks: usize,
    total_errors: usize,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_check(&mut self) {
        self.total_checks += 1;
    }

    pub fn record_error(&mut self, category: &str) {
        match self.categories.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => self.categories.push((category.to_string(), 1)),
        }
        self.total_errors += 1;
    }

    /// The `n` most frequent categories, ties in first-seen order.
    pub fn top_errors(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .categories
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    pub fn total_checks(&self) -> usize {
        self.total_checks
    }

    pub fn total_errors(&self) -> usize {
        self.total_errors
    }

    pub fn average_errors_per_check(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.total_errors as f64 / self.total_checks as f64
        }
    }
}
