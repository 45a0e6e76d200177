//! Cosine similarity and max-marginal-relevance selection.

/// Cosine similarity between two vectors.
/// Returns 0.0 for mismatched, empty or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut mag_a, mut mag_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Selects up to `k` candidate indices balancing relevance and redundancy.
///
/// Each step picks the candidate maximizing
/// `lambda * sim(query, c) - (1 - lambda) * max(sim(c, selected))`.
/// `lambda = 1.0` is pure relevance ranking, `lambda = 0.0` pure diversity.
/// Ties keep the earlier candidate, so the result is deterministic.
pub fn max_marginal_relevance(
    query: &[f32],
    candidates: &[&[f32]],
    k: usize,
    lambda: f64,
) -> Vec<usize> {
    let k = k.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }
    let lambda = lambda.clamp(0.0, 1.0);

    let relevance: Vec<f64> = candidates
        .iter()
        .map(|c| cosine_similarity(query, c))
        .collect();

    let mut selected: Vec<usize> = Vec::with_capacity(k);
    // Highest similarity to anything already selected, per candidate.
    let mut redundancy = vec![f64::NEG_INFINITY; candidates.len()];

    while selected.len() < k {
        let mut best: Option<(usize, f64)> = None;
        for (idx, rel) in relevance.iter().enumerate() {
            if selected.contains(&idx) {
                continue;
            }
            let penalty = if selected.is_empty() { 0.0 } else { redundancy[idx] };
            let score = lambda * rel - (1.0 - lambda) * penalty;
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        let Some((chosen, _)) = best else { break };
        selected.push(chosen);

        for (idx, candidate) in candidates.iter().enumerate() {
            let sim = cosine_similarity(candidates[chosen], candidate);
            if sim > redundancy[idx] {
                redundancy[idx] = sim;
            }
        }
    }

    selected
}
