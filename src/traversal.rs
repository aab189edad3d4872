//! Visitor and selection strategies over stored records.

/// Side-effecting scan over records.
///
/// Implemented for every `FnMut(&T)`, so plain closures work wherever a
/// visitor is expected.
pub trait RecordVisitor<T> {
    fn visit(&mut self, record: &T);
}

impl<T, F> RecordVisitor<T> for F
where
    F: FnMut(&T),
{
    fn visit(&mut self, record: &T) {
        self(record)
    }
}

/// Scores a record for best-of selection. Higher is better.
///
/// Implemented for every `Fn(&T) -> f64`.
pub trait ScoreStrategy<T> {
    fn score(&self, record: &T) -> f64;
}

impl<T, F> ScoreStrategy<T> for F
where
    F: Fn(&T) -> f64,
{
    fn score(&self, record: &T) -> f64 {
        self(record)
    }
}

/// Pick the item with the strictly greatest score.
///
/// The first candidate is the baseline, so a population of negative scores
/// still has a winner. Ties keep the earlier item. A NaN score never beats a
/// candidate, and a NaN baseline loses to the first comparable score.
pub fn best_of<'a, T, S, I>(items: I, strategy: &S) -> Option<&'a T>
where
    T: 'a,
    S: ScoreStrategy<T> + ?Sized,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<(&'a T, f64)> = None;

    for item in items {
        let score = strategy.score(item);
        match best {
            None => best = Some((item, score)),
            Some((_, best_score)) => {
                if score > best_score || (best_score.is_nan() && !score.is_nan()) {
                    best = Some((item, score));
                }
            }
        }
    }

    best.map(|(item, _)| item)
}
