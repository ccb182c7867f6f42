//! Change detection between a freshly scraped extract and the stored
//! baseline. Both sides are reduced to sorted content keys with the
//! volatile `scraped_at` stripped, so a re-scrape at a different moment
//! compares equal unless the schedule itself changed.

/// Types that reduce to a stable, trimmed content key for comparison.
/// The key must exclude volatile fields.
pub trait ContentKeyed {
    fn content_key(&self) -> Vec<String>;
}

/// Canonical comparable form of an extract: every record's content key,
/// sorted. Shared by the game and standings gates.
pub fn normalize<T: ContentKeyed>(records: &[T]) -> Vec<Vec<String>> {
    let mut keys: Vec<Vec<String>> = records.iter().map(|r| r.content_key()).collect();
    keys.sort();
    keys
}

/// True when the candidate extract genuinely differs from the baseline.
pub fn changed<T: ContentKeyed>(baseline: &[T], candidate: &[T]) -> bool {
    normalize(baseline) != normalize(candidate)
}
