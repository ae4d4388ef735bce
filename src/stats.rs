use chrono::{DateTime, Local};
use std::collections::{BTreeMap, BTreeSet};

use crate::classify::Classification;
use crate::patterns::PatternSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapStats {
    pub total_urls: usize,
    pub num_categories: usize,
    pub num_products: usize,
    pub num_other: usize,
    pub num_manufacturers: usize,
    /// Distinct, ascending.
    pub category_names: Vec<String>,
    pub products_by_manufacturer: BTreeMap<String, usize>,
}

impl SitemapStats {
    /// Manufacturers by product count, largest first; ties by name.
    pub fn top_manufacturers(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .products_by_manufacturer
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub source: String,
    pub finished_at: DateTime<Local>,
    pub stats: SitemapStats,
}

/// Derive category names and per-manufacturer product counts.
///
/// Totals come from the partitions, so a product whose manufacturer cannot
/// be extracted still counts as a product.
pub fn aggregate(classification: &Classification, patterns: &PatternSet) -> SitemapStats {
    let category_names: BTreeSet<&str> = classification
        .categories
        .iter()
        .filter_map(|url| patterns.category_name(url))
        .collect();

    let mut products_by_manufacturer: BTreeMap<String, usize> = BTreeMap::new();
    for url in &classification.products {
        if let Some(manufacturer) = patterns.manufacturer(url) {
            *products_by_manufacturer
                .entry(manufacturer.to_string())
                .or_insert(0) += 1;
        }
    }

    SitemapStats {
        total_urls: classification.len(),
        num_categories: classification.categories.len(),
        num_products: classification.products.len(),
        num_other: classification.other.len(),
        num_manufacturers: products_by_manufacturer.len(),
        category_names: category_names.into_iter().map(str::to_string).collect(),
        products_by_manufacturer,
    }
}
