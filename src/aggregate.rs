//! Grouped sums, means, counts, and derived ratios over the canonical table.
//!
//! Every user interaction recomputes from the full in-memory table: filter,
//! group, reduce. All functions are pure and leave their inputs untouched so
//! one loaded table serves any number of independent views.

use crate::schema::{CategoryRecord, Month, SalesRecord};
use std::collections::{BTreeMap, HashSet};

/// A grouping dimension over some record type.
pub trait Dimension<T> {
    /// The group label this dimension assigns to a row, or `None` when the
    /// row is missing the field and must be excluded from the grouping.
    fn label(&self, row: &T) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesDimension {
    Outlet,
    Brand,
    Month,
    Year,
}

impl Dimension<SalesRecord> for SalesDimension {
    fn label(&self, row: &SalesRecord) -> Option<String> {
        match self {
            SalesDimension::Outlet => Some(row.outlet.clone()),
            SalesDimension::Brand => row.brand.clone(),
            SalesDimension::Month => Some(row.month.name().to_string()),
            SalesDimension::Year => Some(row.year.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDimension {
    BusinessUnit,
    ItemCategory,
    ItemSubcategory,
    Year,
}

impl Dimension<CategoryRecord> for CategoryDimension {
    fn label(&self, row: &CategoryRecord) -> Option<String> {
        match self {
            CategoryDimension::BusinessUnit => Some(row.business_unit.clone()),
            CategoryDimension::ItemCategory => Some(row.item_category.clone()),
            CategoryDimension::ItemSubcategory => row.item_subcategory.clone(),
            CategoryDimension::Year => row.year.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow {
    pub keys: Vec<String>,
    pub value: f64,
}

impl GroupedRow {
    /// The primary (first) group key.
    pub fn key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggOp<D> {
    /// Sum of present metric values; missing values are excluded, not zeroed.
    Sum,
    /// Mean of present metric values; 0.0 when no value is present.
    Mean,
    /// Row count, regardless of metric presence.
    Count,
    /// Distinct labels of another dimension within the group.
    CountDistinct(D),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Descending by metric, ties broken by key. The default.
    MetricDescending,
    /// Fixed calendar order for month-labelled keys, never lexical.
    CalendarMonth,
    KeyAscending,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    present: usize,
    rows: usize,
    distinct: HashSet<String>,
}

/// Groups `rows` by the ordered dimension list and reduces the metric.
///
/// Rows missing any grouping label are excluded. Results come back sorted
/// [`SortOrder::MetricDescending`]; re-sort with [`sort_rows`] if the view
/// wants calendar or label order.
pub fn aggregate<T, D: Dimension<T>>(
    rows: &[T],
    group_by: &[D],
    metric: impl Fn(&T) -> Option<f64>,
    op: AggOp<D>,
) -> Vec<GroupedRow> {
    let mut groups: BTreeMap<Vec<String>, Accumulator> = BTreeMap::new();

    for row in rows {
        let keys: Option<Vec<String>> = group_by.iter().map(|d| d.label(row)).collect();
        let keys = match keys {
            Some(k) => k,
            None => continue,
        };

        let acc = groups.entry(keys).or_default();
        acc.rows += 1;
        if let Some(value) = metric(row) {
            acc.sum += value;
            acc.present += 1;
        }
        if let AggOp::CountDistinct(dim) = &op {
            if let Some(label) = dim.label(row) {
                acc.distinct.insert(label);
            }
        }
    }

    let mut result: Vec<GroupedRow> = groups
        .into_iter()
        .map(|(keys, acc)| {
            let value = match &op {
                AggOp::Sum => acc.sum,
                AggOp::Mean => safe_ratio(acc.sum, acc.present as f64),
                AggOp::Count => acc.rows as f64,
                AggOp::CountDistinct(_) => acc.distinct.len() as f64,
            };
            GroupedRow { keys, value }
        })
        .collect();

    sort_rows(&mut result, SortOrder::MetricDescending);
    result
}

pub fn sort_rows(rows: &mut [GroupedRow], order: SortOrder) {
    match order {
        SortOrder::MetricDescending => {
            rows.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.keys.cmp(&b.keys)));
        }
        SortOrder::CalendarMonth => {
            rows.sort_by_key(|r| {
                Month::parse_label(r.key())
                    .map(|m| m.ordinal())
                    .unwrap_or(u32::MAX)
            });
        }
        SortOrder::KeyAscending => rows.sort_by(|a, b| a.keys.cmp(&b.keys)),
    }
}

/// Division with the zero-denominator guard the derived ratios require:
/// a zero denominator yields 0.0, never NaN.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Average bill value (sum of sales over sum of bills) per group.
pub fn average_bill_value(
    rows: &[SalesRecord],
    group_by: &[SalesDimension],
) -> Vec<GroupedRow> {
    let sales = aggregate(rows, group_by, |r| r.sales, AggOp::Sum);
    let bills = aggregate(rows, group_by, |r| r.bills.map(|b| b as f64), AggOp::Sum);
    ratio_of(sales, &bills)
}

/// Average transaction value (sum of sales over transaction count) per group.
pub fn average_transaction_value(
    rows: &[CategoryRecord],
    group_by: &[CategoryDimension],
) -> Vec<GroupedRow> {
    let sales = aggregate(rows, group_by, |r| r.total_sales, AggOp::Sum);
    let transactions = aggregate(
        rows,
        group_by,
        |r| r.transaction_count.map(|c| c as f64),
        AggOp::Sum,
    );
    ratio_of(sales, &transactions)
}

fn ratio_of(numerators: Vec<GroupedRow>, denominators: &[GroupedRow]) -> Vec<GroupedRow> {
    let denom: BTreeMap<&[String], f64> = denominators
        .iter()
        .map(|r| (r.keys.as_slice(), r.value))
        .collect();

    let mut result: Vec<GroupedRow> = numerators
        .into_iter()
        .map(|mut row| {
            let d = denom.get(row.keys.as_slice()).copied().unwrap_or(0.0);
            row.value = safe_ratio(row.value, d);
            row
        })
        .collect();
    sort_rows(&mut result, SortOrder::MetricDescending);
    result
}

/// The dashboard's headline metric row.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub total_sales: f64,
    pub total_bills: u64,
    pub average_bill_value: f64,
    pub outlet_count: usize,
}

pub fn summarize(rows: &[SalesRecord]) -> SummaryMetrics {
    let mut total_sales = 0.0;
    let mut total_bills = 0u64;
    let mut outlets = HashSet::new();

    for row in rows {
        if let Some(sales) = row.sales {
            total_sales += sales;
        }
        if let Some(bills) = row.bills {
            total_bills += bills;
        }
        outlets.insert(row.outlet.as_str());
    }

    SummaryMetrics {
        total_sales,
        total_bills,
        average_bill_value: safe_ratio(total_sales, total_bills as f64),
        outlet_count: outlets.len(),
    }
}

/// Interactive filter state, applied as a pure function ahead of grouping.
#[derive(Debug, Clone, Default)]
pub struct SalesFilter {
    pub year: Option<String>,
    pub brand: Option<String>,
    pub month: Option<Month>,
    pub outlet: Option<String>,
}

impl SalesFilter {
    pub fn matches(&self, row: &SalesRecord) -> bool {
        if let Some(year) = &self.year {
            if row.year != *year {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if row.brand.as_deref() != Some(brand.as_str()) {
                return false;
            }
        }
        if let Some(month) = self.month {
            if row.month != month {
                return false;
            }
        }
        if let Some(outlet) = &self.outlet {
            if row.outlet != *outlet {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, rows: &[SalesRecord]) -> Vec<SalesRecord> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
