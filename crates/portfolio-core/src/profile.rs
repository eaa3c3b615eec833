//! Profile enrichment for `GET /api/profile/{username}`.

use chrono::{DateTime, Utc};

use crate::models::{ProfileResponse, ProfileStats, ProfileSummary};

/// Upper bound of the activity score.
pub const MAX_ACTIVITY_SCORE: i64 = 100;

/// `min(100, 2 × public_repos + followers)`.
pub fn activity_score(profile: &ProfileSummary) -> i64 {
    profile
        .public_repos
        .saturating_mul(2)
        .saturating_add(profile.followers)
        .min(MAX_ACTIVITY_SCORE)
}

pub fn enrich_profile(profile: ProfileSummary, now: DateTime<Utc>) -> ProfileResponse {
    let computed_stats = ProfileStats {
        activity_score: activity_score(&profile),
        last_updated: now,
    };
    ProfileResponse {
        profile,
        computed_stats,
    }
}
