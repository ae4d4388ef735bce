use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::stats::SitemapStats;
use crate::utils::ensure_dir;

pub const CATEGORIES_CSV: &str = "categories.csv";
pub const MANUFACTURERS_CSV: &str = "products_by_manufacturer.csv";
pub const SUMMARY_CSV: &str = "summary.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFiles {
    pub categories: PathBuf,
    pub manufacturers: PathBuf,
    pub summary: PathBuf,
}

pub fn write_csv_files(stats: &SitemapStats, output_dir: &Path) -> Result<CsvFiles> {
    ensure_dir(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let files = CsvFiles {
        categories: output_dir.join(CATEGORIES_CSV),
        manufacturers: output_dir.join(MANUFACTURERS_CSV),
        summary: output_dir.join(SUMMARY_CSV),
    };

    write_rows(
        &files.categories,
        &["Category Name"],
        stats.category_names.iter().map(|name| vec![name.clone()]),
    )?;

    write_rows(
        &files.manufacturers,
        &["Manufacturer", "Product Count"],
        stats
            .products_by_manufacturer
            .iter()
            .map(|(name, count)| vec![name.clone(), count.to_string()]),
    )?;

    let metrics = [
        ("Total URLs", stats.total_urls),
        ("Categories", stats.num_categories),
        ("Products", stats.num_products),
        ("Manufacturers", stats.num_manufacturers),
        ("Other pages", stats.num_other),
    ];
    write_rows(
        &files.summary,
        &["Metric", "Value"],
        metrics
            .iter()
            .map(|(metric, value)| vec![metric.to_string(), value.to_string()]),
    )?;

    info!(action = "write", component = "csv_export", output_dir = ?output_dir, file_count = 3, "CSV files saved");
    Ok(files)
}

fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush().with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::sample_stats;
    use std::fs;

    #[test]
    fn writes_three_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let files = write_csv_files(&sample_stats(), dir.path()).unwrap();

        assert_eq!(
            fs::read_to_string(&files.categories).unwrap(),
            "Category Name\nborse\nscarpe\n"
        );
        assert_eq!(
            fs::read_to_string(&files.manufacturers).unwrap(),
            "Manufacturer,Product Count\nadidas,1\nnike,2\n"
        );
        assert_eq!(
            fs::read_to_string(&files.summary).unwrap(),
            "Metric,Value\nTotal URLs,8\nCategories,3\nProducts,4\nManufacturers,2\nOther pages,1\n"
        );
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut stats = sample_stats();
        stats.category_names = vec!["shoes, boots".to_string()];
        let dir = tempfile::TempDir::new().unwrap();
        let files = write_csv_files(&stats, dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(files.categories).unwrap(),
            "Category Name\n\"shoes, boots\"\n"
        );
    }
}
