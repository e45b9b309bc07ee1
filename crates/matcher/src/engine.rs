use std::fmt;
use std::sync::Arc;

use crate::metrics::{MatchMetrics, MatchOperation, MetricsSpan};
use crate::report::MatchableReport;
use crate::scoring::{date_proximity, location_similarity, text_similarity};
use crate::types::{
    Breakdown, Component, MatchConfig, MatchError, MatchResult, MatchScore, MatchWeights,
    PairResult,
};


/// Stateless scorer and ranker for lost/found report pairs.
///
/// A `Matcher` only holds its validated configuration and an optional metrics
/// observer, so a single instance can be shared behind an `Arc` and called from
/// any number of requests concurrently.
#[derive(Clone, Default)]
pub struct Matcher {
    config: MatchConfig,
    metrics: Option<Arc<dyn MatchMetrics>>,
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl Matcher {
    /// Construct a matcher from an explicit configuration.
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            config,
            metrics: None,
        })
    }

    /// Attach a metrics observer.
    pub fn with_metrics(mut self, metrics: Arc<dyn MatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Default inclusive threshold for [`match_against_pool`](Self::match_against_pool)
    /// and [`match_all_pairs`](Self::match_all_pairs).
    pub fn min_score(&self) -> u8 {
        self.config.min_score
    }

    /// Score one lost/found pair.
    ///
    /// Categories are compared before any other field is read; a mismatch
    /// short-circuits to a zero score with an empty breakdown.
    pub fn match_score<L, F>(&self, lost: &L, found: &F) -> MatchScore
    where
        L: MatchableReport + ?Sized,
        F: MatchableReport + ?Sized,
    {
        if lost.category() != found.category() {
            return MatchScore::zero();
        }

        let w: &MatchWeights = &self.config.weights;
        let components = [
            (Component::Category, 1.0, w.category),
            (
                Component::Location,
                location_similarity(lost.location(), found.location()),
                w.location,
            ),
            (
                Component::Date,
                date_proximity(
                    lost.event_date(),
                    found.event_date(),
                    self.config.date_threshold_days,
                ),
                w.date,
            ),
            (
                Component::Title,
                text_similarity(lost.title(), found.title()),
                w.title,
            ),
            (
                Component::Description,
                text_similarity(lost.description(), found.description()),
                w.description,
            ),
        ];

        let mut fraction = 0.0;
        let mut breakdown = Breakdown::new();
        for (component, similarity, weight) in components {
            let contribution = similarity * weight;
            fraction += contribution;
            breakdown.insert(component, to_points(contribution));
        }

        MatchScore {
            score: to_points(fraction),
            breakdown,
        }
    }

    /// Rank `pool` against `subject`, keeping scores at or above `min_score`.
    ///
    /// The pool is expected to be pre-filtered to the opposite kind and to
    /// active reports. Equal scores keep their pool order.
    pub fn match_against_pool<'p, S, C>(
        &self,
        subject: &S,
        pool: &'p [C],
        min_score: u8,
    ) -> Vec<MatchResult<'p, C>>
    where
        S: MatchableReport + ?Sized,
        C: MatchableReport,
    {
        let span = MetricsSpan::start(self.metrics.as_ref(), MatchOperation::Pool);

        let mut results: Vec<MatchResult<'p, C>> = pool
            .iter()
            .filter_map(|candidate| {
                let MatchScore { score, breakdown } = self.match_score(subject, candidate);
                (score >= min_score).then_some(MatchResult {
                    counterpart: candidate,
                    score,
                    breakdown,
                })
            })
            .collect();
        results.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!(
            pool = pool.len(),
            hits = results.len(),
            min_score,
            "pool match complete"
        );
        if let Some(span) = span {
            span.finish(pool.len(), results.len());
        }

        results
    }

    /// Score every lost × found pair, unfiltered, in row-major order.
    pub fn score_all_pairs<'a, L, F>(
        &self,
        lost_pool: &'a [L],
        found_pool: &'a [F],
    ) -> Vec<PairResult<'a, L, F>>
    where
        L: MatchableReport,
        F: MatchableReport,
    {
        let mut pairs = Vec::with_capacity(lost_pool.len() * found_pool.len());
        for lost in lost_pool {
            for found in found_pool {
                let MatchScore { score, breakdown } = self.match_score(lost, found);
                pairs.push(PairResult {
                    lost,
                    found,
                    score,
                    breakdown,
                });
            }
        }
        pairs
    }

    /// Cross-product match, filtered by `min_score` and ranked by score.
    ///
    /// Costs `lost_pool.len() * found_pool.len()` comparisons; bounding the
    /// pools is the caller's job.
    pub fn match_all_pairs<'a, L, F>(
        &self,
        lost_pool: &'a [L],
        found_pool: &'a [F],
        min_score: u8,
    ) -> Vec<PairResult<'a, L, F>>
    where
        L: MatchableReport,
        F: MatchableReport,
    {
        let span = MetricsSpan::start(self.metrics.as_ref(), MatchOperation::AllPairs);

        let all = self.score_all_pairs(lost_pool, found_pool);
        let comparisons = all.len();
        let mut results: Vec<_> = all
            .into_iter()
            .filter(|pair| pair.score >= min_score)
            .collect();
        results.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!(
            lost = lost_pool.len(),
            found = found_pool.len(),
            comparisons,
            hits = results.len(),
            min_score,
            "all-pairs match complete"
        );
        if let Some(span) = span {
            span.finish(comparisons, results.len());
        }

        results
    }
}

/// Convert a weighted fraction to integer points on the 0–100 scale.
fn to_points(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Score one lost/found pair with the default weights.
pub fn match_score<L, F>(lost: &L, found: &F) -> MatchScore
where
    L: MatchableReport + ?Sized,
    F: MatchableReport + ?Sized,
{
    Matcher::default().match_score(lost, found)
}

/// Rank `pool` against `subject` with the default weights.
pub fn match_against_pool<'p, S, C>(
    subject: &S,
    pool: &'p [C],
    min_score: u8,
) -> Vec<MatchResult<'p, C>>
where
    S: MatchableReport + ?Sized,
    C: MatchableReport,
{
    Matcher::default().match_against_pool(subject, pool, min_score)
}

/// Cross-product match with the default weights.
pub fn match_all_pairs<'a, L, F>(
    lost_pool: &'a [L],
    found_pool: &'a [F],
    min_score: u8,
) -> Vec<PairResult<'a, L, F>>
where
    L: MatchableReport,
    F: MatchableReport,
{
    Matcher::default().match_all_pairs(lost_pool, found_pool, min_score)
}
