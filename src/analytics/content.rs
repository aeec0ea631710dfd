//! Listing content quality of SKUs.
//!
//! Each SKU passes or fails four checks of equal weight; the score is the
//! share of checks passed (0-100).

use serde::Serialize;

use crate::analytics::{
    delta::{safe_div, safe_pct},
    filter::ContentFilter,
};
use crate::db::models::SkuContent;

pub const MIN_IMAGES: i32 = 5;
pub const MIN_RATING: f64 = 4.0;
pub const MIN_REVIEWS: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentCheck {
    Images,
    Description,
    Rating,
    Reviews,
}

impl ContentCheck {
    const ALL: [ContentCheck; 4] = [
        ContentCheck::Images,
        ContentCheck::Description,
        ContentCheck::Rating,
        ContentCheck::Reviews,
    ];

    /// Missing attributes fail their check
    pub fn passes(&self, sku: &SkuContent) -> bool {
        match self {
            ContentCheck::Images => sku.image_count.is_some_and(|n| n >= MIN_IMAGES),
            ContentCheck::Description => sku.has_description.unwrap_or(false),
            ContentCheck::Rating => sku.rating.is_some_and(|r| r >= MIN_RATING),
            ContentCheck::Reviews => sku.review_count.is_some_and(|n| n >= MIN_REVIEWS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSku {
    #[serde(flatten)]
    pub sku: SkuContent,
    pub score: u8,
    pub gaps: Vec<ContentCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub sku_count: usize,
    pub average_rating: f64,
    pub average_reviews: f64,
    pub average_score: f64,
    /// % of SKUs passing each check
    pub image_coverage: f64,
    pub description_coverage: f64,
    pub rating_coverage: f64,
    pub review_coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub filters: ContentFilter,
    pub summary: ContentSummary,
    pub skus: Vec<ScoredSku>,
}

pub fn score_sku(sku: SkuContent) -> ScoredSku {
    let gaps: Vec<ContentCheck> = ContentCheck::ALL
        .into_iter()
        .filter(|check| !check.passes(&sku))
        .collect();
    let passed = ContentCheck::ALL.len() - gaps.len();

    ScoredSku {
        sku,
        score: (passed * 100 / ContentCheck::ALL.len()) as u8,
        gaps,
    }
}

pub fn analyze_content(filter: &ContentFilter, skus: Vec<SkuContent>) -> ContentAnalysis {
    let scored: Vec<ScoredSku> = skus.into_iter().map(score_sku).collect();
    let count = scored.len() as f64;

    let ratings: Vec<f64> = scored.iter().filter_map(|s| s.sku.rating).collect();
    let reviews: Vec<f64> = scored
        .iter()
        .filter_map(|s| s.sku.review_count.map(f64::from))
        .collect();

    let coverage = |check: ContentCheck| {
        let passing = scored.iter().filter(|s| !s.gaps.contains(&check)).count();
        safe_pct(passing as f64, count)
    };

    let summary = ContentSummary {
        sku_count: scored.len(),
        average_rating: safe_div(ratings.iter().sum(), ratings.len() as f64),
        average_reviews: safe_div(reviews.iter().sum(), reviews.len() as f64),
        average_score: safe_div(scored.iter().map(|s| f64::from(s.score)).sum(), count),
        image_coverage: coverage(ContentCheck::Images),
        description_coverage: coverage(ContentCheck::Description),
        rating_coverage: coverage(ContentCheck::Rating),
        review_coverage: coverage(ContentCheck::Reviews),
    };

    ContentAnalysis {
        filters: filter.clone(),
        summary,
        skus: scored,
    }
}
