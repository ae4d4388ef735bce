use crate::patterns::PatternSet;

/// Three-way split of a sitemap's URLs. Each input URL lands in exactly one
/// partition and keeps its relative input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub categories: Vec<String>,
    pub products: Vec<String>,
    pub other: Vec<String>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.categories.len() + self.products.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Category pattern is tested first, so a URL matching both patterns is a
/// category.
pub fn classify_urls<I>(urls: I, patterns: &PatternSet) -> Classification
where
    I: IntoIterator<Item = String>,
{
    let mut classification = Classification::default();
    for url in urls {
        if patterns.is_category(&url) {
            classification.categories.push(url);
        } else if patterns.is_product(&url) {
            classification.products.push(url);
        } else {
            classification.other.push(url);
        }
    }
    classification
}
