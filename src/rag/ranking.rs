use std::cmp::Ordering;

use super::store::DocumentSection;

/// A section paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSection {
    pub section: DocumentSection,
    pub score: f64,
    /// Position of the section in the store's response.
    pub retrieval_index: usize,
}

/// Cosine similarity of two vectors.
///
/// Empty, zero-magnitude, mismatched or non-finite inputs score `0.0`
/// instead of failing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a * norm_b);
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Scores every section against the query and sorts by descending score.
/// The sort is stable: equal scores keep their retrieval order.
pub fn rank_sections(query: &[f32], sections: Vec<DocumentSection>) -> Vec<RankedSection> {
    let mut ranked: Vec<RankedSection> = sections
        .into_iter()
        .enumerate()
        .map(|(retrieval_index, section)| RankedSection {
            score: cosine_similarity(query, &section.embedding),
            section,
            retrieval_index,
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .score
            .partial_cmp(&left.score)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}
