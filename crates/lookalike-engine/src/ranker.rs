//! Adaptive band ranking.
//!
//! Plain top-k by distance tends to return several near-identical crops of
//! the same source image. The ranker instead walks down the similarity axis in
//! narrow bands and keeps one representative per band, so the result set spans
//! the candidate distribution.
//!
//! The first band is fixed at `[0.90, 0.98)`. Below it, windows of width
//! [`BAND_STEP`] are examined starting from `min(0.90, best similarity)`. An
//! empty window slides the upper bound down by one step; a hit moves it to
//! `hit - BAND_SHRINK`, tightening around the region just found. The walk
//! stops after [`MAX_RESULTS`] picks or once a window would reach below
//! [`SIMILARITY_FLOOR`].

use lookalike_core::types::{DistanceResult, RankedResult};

/// Inclusive lower bound of the first band.
pub const FIRST_BAND_MIN: f64 = 0.90;

/// Exclusive upper bound of the first band (`1 - 0.02`).
pub const FIRST_BAND_MAX: f64 = 0.98;

/// Width of every window below the first band.
pub const BAND_STEP: f64 = 0.01;

/// Gap left below a hit before the next window starts.
pub const BAND_SHRINK: f64 = 0.015;

/// Windows never extend below this similarity.
pub const SIMILARITY_FLOOR: f64 = 0.65;

/// Maximum number of ranked results.
pub const MAX_RESULTS: usize = 5;

/// Selects a diversified, band-ordered subset of `candidates`.
///
/// Candidates are ranked by ascending distance first; input that is already
/// sorted, as returned by
/// [`SimilarityEngine::find_all_candidates`](crate::SimilarityEngine::find_all_candidates),
/// is left in place. Results come back in selection order: the first band
/// (if it had a hit) followed by lower bands in decreasing similarity.
pub fn rank(candidates: &[DistanceResult]) -> Vec<RankedResult> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let ranked: Vec<RankedResult> = sorted.into_iter().map(RankedResult::from).collect();
    let mut results = Vec::with_capacity(MAX_RESULTS);

    let (pick, examined) = best_in_band(&ranked, FIRST_BAND_MIN, FIRST_BAND_MAX);
    results.extend(pick);
    let mut cursor = examined;

    let mut upper = FIRST_BAND_MIN.min(ranked[0].similarity);
    while results.len() < MAX_RESULTS && upper - BAND_STEP > SIMILARITY_FLOOR {
        let lower = upper - BAND_STEP;
        let (pick, examined) = best_in_band(&ranked[cursor..], lower, upper);
        cursor += examined;

        match pick {
            Some(hit) => {
                upper = hit.similarity - BAND_SHRINK;
                results.push(hit);
            }
            None => upper = lower,
        }
    }

    results
}

/// Returns the most similar entry in `[lower, upper)` (first on ties) and the
/// number of entries that fell in the band.
///
/// `ranked` is sorted by descending similarity, so the scan stops at the first
/// entry below `lower`.
fn best_in_band(ranked: &[RankedResult], lower: f64, upper: f64) -> (Option<RankedResult>, usize) {
    let mut best: Option<RankedResult> = None;
    let mut examined = 0;

    for candidate in ranked
        .iter()
        .take_while(|c| c.similarity >= lower)
        .filter(|c| c.similarity < upper)
    {
        examined += 1;
        if best.is_none_or(|b| candidate.similarity > b.similarity) {
            best = Some(*candidate);
        }
    }

    (best, examined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(similarities: &[f64]) -> Vec<DistanceResult> {
        similarities
            .iter()
            .enumerate()
            .map(|(i, s)| DistanceResult::new(i as i64 + 1, 1.0 - s))
            .collect()
    }

    fn ids(results: &[RankedResult]) -> Vec<i64> {
        results.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_single_candidate_in_first_band() {
        let results = rank(&[DistanceResult::new(1, 0.03)]);
        assert_eq!(ids(&results), vec![1]);
        assert!((results[0].similarity - 0.97).abs() < 1e-9);
    }

    #[test]
    fn test_one_pick_per_band() {
        let results = rank(&candidates(&[0.95, 0.80, 0.80, 0.70]));

        assert_eq!(ids(&results), vec![1, 2, 4]);
        assert!(results.len() <= 4);
        assert!(results[0].similarity >= FIRST_BAND_MIN);
        assert!(results.windows(2).all(|w| w[0].similarity > w[1].similarity));
    }

    #[test]
    fn test_empty_candidates() {
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_first_band_keeps_only_the_best() {
        let results = rank(&candidates(&[0.97, 0.96, 0.93, 0.91]));
        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_best_candidate_below_first_band_bounds_first_window() {
        let results = rank(&candidates(&[0.855, 0.85, 0.83, 0.80]));

        // Windows are half-open, so 0.855 only caps the first one.
        assert_eq!(ids(&results), vec![2, 3, 4]);
    }

    #[test]
    fn test_unsorted_input_is_ranked_by_distance() {
        let mut shuffled = candidates(&[0.95, 0.80, 0.80, 0.70]);
        shuffled.reverse();

        let results = rank(&shuffled);
        assert_eq!(ids(&results), vec![1, 3, 4]);
    }

    #[test]
    fn test_never_below_floor_and_capped() {
        let dense: Vec<f64> = (0..200).map(|i| 0.979 - i as f64 * 0.002).collect();
        let results = rank(&candidates(&dense));

        assert_eq!(results.len(), MAX_RESULTS);
        assert!(results.iter().all(|r| r.similarity >= SIMILARITY_FLOOR));

        let low = rank(&candidates(&[0.66, 0.60, 0.40]));
        assert!(low.iter().all(|r| r.similarity >= SIMILARITY_FLOOR));
    }

    #[test]
    fn test_band_scan_counts_only_band_members() {
        let ranked: Vec<RankedResult> = candidates(&[0.90, 0.84, 0.82, 0.79, 0.60])
            .into_iter()
            .map(RankedResult::from)
            .collect();

        let (pick, examined) = best_in_band(&ranked, 0.80, 0.85);
        assert_eq!(pick.map(|p| p.id), Some(2));
        assert_eq!(examined, 2);

        let (pick, examined) = best_in_band(&ranked[3..], 0.80, 0.85);
        assert!(pick.is_none());
        assert_eq!(examined, 0);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let input = candidates(&[0.97, 0.91, 0.88, 0.87, 0.86, 0.82, 0.79, 0.74, 0.70, 0.66]);
        assert_eq!(rank(&input), rank(&input));
    }
}
