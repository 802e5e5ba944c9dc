//! Query - filter, ordering and limit for a collection scan.

use std::cmp::Ordering;
use std::fmt;

use crate::document::Stored;

type Filter<D> = Box<dyn Fn(&D) -> bool + Send + Sync>;
type Comparator<D> = Box<dyn Fn(&Stored<D>, &Stored<D>) -> Ordering + Send + Sync>;

/// A query over one collection.
///
/// Results without an explicit ordering come back in creation order. With an
/// ordering, creation order still breaks ties because the sort is stable.
///
/// ```
/// use highscore::store::Query;
/// use highscore::ScoreRecord;
///
/// let query = Query::<ScoreRecord>::new()
///     .filter(|r| r.rank >= 8)
///     .order_by(|a, b| a.data.rank.cmp(&b.data.rank))
///     .limit(5);
///
/// let mut record = ScoreRecord::new("u1", "alice");
/// record.rank = 9;
/// assert!(query.matches(&record));
/// ```
pub struct Query<D> {
    filter: Option<Filter<D>>,
    order: Option<Comparator<D>>,
    limit: Option<usize>,
}

impl<D> Default for Query<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Query<D> {
    /// A query matching every readable document.
    pub fn new() -> Self {
        Self {
            filter: None,
            order: None,
            limit: None,
        }
    }

    /// Keep only documents matching the predicate. Replaces any earlier filter.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&D) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Order results with the comparator. Replaces any earlier ordering.
    pub fn order_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&Stored<D>, &Stored<D>) -> Ordering + Send + Sync + 'static,
    {
        self.order = Some(Box::new(compare));
        self
    }

    /// Return at most `n` documents.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn matches(&self, doc: &D) -> bool {
        self.filter.as_ref().map_or(true, |f| f(doc))
    }

    /// Order and truncate an already filtered result set.
    pub fn finish(&self, mut results: Vec<Stored<D>>) -> Vec<Stored<D>> {
        results.sort_by_key(|stored| stored.created);
        if let Some(compare) = &self.order {
            results.sort_by(|a, b| compare(a, b));
        }
        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        results
    }
}

impl<D> fmt::Debug for Query<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filtered", &self.filter.is_some())
            .field("ordered", &self.order.is_some())
            .field("limit", &self.limit)
            .finish()
    }
}
