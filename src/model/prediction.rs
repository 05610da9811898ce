/// Index and value of the highest score.
///
/// The first maximum wins on ties and NaN scores are never selected.
/// Returns `None` for an empty slice or one holding only NaN.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| !score.is_nan())
        .fold(None, |best, (i, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((i, score)),
        })
}

/// Rounds a probability to 4 decimal places, clamped to [0, 1].
pub fn round_confidence(confidence: f32) -> f64 {
    let rounded = (f64::from(confidence) * 10_000.0).round() / 10_000.0;
    rounded.clamp(0.0, 1.0)
}
