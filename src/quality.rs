//! rendition quality ranking (C2): picks the best available rendition for a
//! preferred tier, per §4.2/§8 invariant 7
use crate::domain::{Rendition, RenditionTier};

fn rank(tier: RenditionTier) -> usize {
    RenditionTier::RANKED
        .iter()
        .position(|&t| t == tier)
        .expect("RenditionTier::RANKED is exhaustive over the enum")
}

/// among renditions with a non-empty url, choose the one whose tier is
/// closest to `preferred` without exceeding it; if none at or below
/// `preferred` exist, choose the lowest tier above it; if none exist at all,
/// return `None`. adaptive/live/streaming tiers never reach this function
/// because they have no [`RenditionTier`] representation to begin with.
pub fn best(renditions: &[Rendition], preferred: RenditionTier) -> Option<&Rendition> {
    let usable: Vec<&Rendition> = renditions.iter().filter(|r| !r.url.is_empty()).collect();
    if usable.is_empty() {
        return None;
    }

    let preferred_rank = rank(preferred);

    let at_or_below = usable
        .iter()
        .filter(|r| rank(r.tier) <= preferred_rank)
        .max_by_key(|r| rank(r.tier));

    if let Some(r) = at_or_below {
        return Some(r);
    }

    usable.into_iter().min_by_key(|r| rank(r.tier))
}
