//! Service/product category breakdowns.
//!
//! Category data is hierarchical (business unit, then item category, then
//! subcategory) and feeds both flat renderings (pie, bar) and treemap-style
//! ones, so a breakdown carries the flat leaf totals together with a rollup
//! per hierarchy prefix. Top-N truncation is a separate operation layered on
//! the flat aggregate; rollups always reflect every row.

use crate::aggregate::{aggregate, sort_rows, AggOp, CategoryDimension, GroupedRow, SortOrder};
use crate::error::{InsightsError, Result};
use crate::normalize::{locate_column, parse_count, parse_money, ColumnRule};
use crate::schema::CategoryRecord;
use crate::table::RawTable;

#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    /// Totals per full-hierarchy combination, metric-descending.
    pub leaves: Vec<GroupedRow>,
    /// One grouped table per strict prefix of the hierarchy: `rollups[0]`
    /// groups by the first dimension alone, `rollups[1]` by the first two,
    /// and so on.
    pub rollups: Vec<Vec<GroupedRow>>,
}

pub fn breakdown(
    rows: &[CategoryRecord],
    hierarchy: &[CategoryDimension],
    metric: impl Fn(&CategoryRecord) -> Option<f64> + Copy,
) -> Breakdown {
    let leaves = aggregate(rows, hierarchy, metric, AggOp::Sum);
    let rollups = (1..hierarchy.len())
        .map(|prefix| aggregate(rows, &hierarchy[..prefix], metric, AggOp::Sum))
        .collect();
    Breakdown { leaves, rollups }
}

/// Keeps the `n` largest rows by metric. Explicitly separate from
/// aggregation so rollup totals are never truncated along with the display
/// list.
pub fn top_n(rows: &[GroupedRow], n: usize) -> Vec<GroupedRow> {
    let mut sorted = rows.to_vec();
    sort_rows(&mut sorted, SortOrder::MetricDescending);
    sorted.truncate(n);
    sorted
}

/// Column-discovery hints for category exports.
#[derive(Debug, Clone)]
pub struct CategoryHints {
    pub business_unit: Vec<ColumnRule>,
    pub item_category: Vec<ColumnRule>,
    pub item_subcategory: Vec<ColumnRule>,
    pub total_sales: Vec<ColumnRule>,
    pub total_quantity: Vec<ColumnRule>,
    pub transaction_count: Vec<ColumnRule>,
    pub year: Vec<ColumnRule>,
}

impl Default for CategoryHints {
    fn default() -> Self {
        Self {
            business_unit: vec![ColumnRule::exact("Business Unit")],
            item_category: vec![ColumnRule::exact("Item Category")],
            item_subcategory: vec![ColumnRule::exact("Item Subcategory")],
            total_sales: vec![
                ColumnRule::exact("Total_Sales"),
                ColumnRule::exact("Total Sales"),
            ],
            total_quantity: vec![
                ColumnRule::exact("Total_Quantity"),
                ColumnRule::exact("Total Quantity"),
            ],
            transaction_count: vec![
                ColumnRule::exact("Transaction_Count"),
                ColumnRule::exact("Transaction Count"),
            ],
            year: vec![ColumnRule::exact("Year")],
        }
    }
}

/// Parses a raw category export into [`CategoryRecord`]s.
///
/// Requires business-unit and item-category columns; everything else is
/// optional and missing cells stay missing.
pub fn parse_categories(raw: &RawTable, hints: &CategoryHints) -> Result<Vec<CategoryRecord>> {
    let headers: Vec<String> = raw.headers.iter().map(|h| h.trim().to_string()).collect();

    let unit_idx = locate_column(&headers, &hints.business_unit)
        .map(|(i, _)| i)
        .ok_or_else(|| InsightsError::Schema {
            source_name: "category export".to_string(),
            details: "no business unit column found".to_string(),
        })?;
    let category_idx = locate_column(&headers, &hints.item_category)
        .map(|(i, _)| i)
        .ok_or_else(|| InsightsError::Schema {
            source_name: "category export".to_string(),
            details: "no item category column found".to_string(),
        })?;

    let subcategory_idx = locate_column(&headers, &hints.item_subcategory).map(|(i, _)| i);
    let sales_idx = locate_column(&headers, &hints.total_sales).map(|(i, _)| i);
    let quantity_idx = locate_column(&headers, &hints.total_quantity).map(|(i, _)| i);
    let transactions_idx = locate_column(&headers, &hints.transaction_count).map(|(i, _)| i);
    let year_idx = locate_column(&headers, &hints.year).map(|(i, _)| i);

    let mut records = Vec::new();
    for row in &raw.rows {
        let business_unit = raw.cell(row, unit_idx).map(str::trim).unwrap_or("");
        let item_category = raw.cell(row, category_idx).map(str::trim).unwrap_or("");
        if business_unit.is_empty() || item_category.is_empty() {
            continue;
        }

        let text_at = |idx: Option<usize>| {
            idx.and_then(|i| raw.cell(row, i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        records.push(CategoryRecord {
            business_unit: business_unit.to_string(),
            item_category: item_category.to_string(),
            item_subcategory: text_at(subcategory_idx),
            total_sales: sales_idx.and_then(|i| parse_money(raw.cell(row, i))),
            total_quantity: quantity_idx.and_then(|i| parse_money(raw.cell(row, i))),
            transaction_count: transactions_idx.and_then(|i| parse_count(raw.cell(row, i))),
            year: text_at(year_idx),
        });
    }

    Ok(records)
}
