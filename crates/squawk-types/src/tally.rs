use crate::models::Vote;

/// Sum of vote values, or `None` when there are no votes at all.
///
/// A post nobody has voted on has no score, which is different from a post
/// whose votes cancel out to zero.
pub fn tally(votes: &[Vote]) -> Option<i64> {
    if votes.is_empty() {
        return None;
    }
    Some(votes.iter().map(|v| v.value.delta()).sum())
}
