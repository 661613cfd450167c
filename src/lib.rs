//! # Salon Insights
//!
//! A library for normalizing heterogeneous salon sales exports into one
//! canonical long-format table and computing the aggregate, growth, and
//! category views a business-review dashboard renders.
//!
//! ## Core Concepts
//!
//! - **Raw table**: an untyped CSV as exported — unpredictable header row,
//!   inconsistent column names, embedded subtotal rows, localized money
//!   strings
//! - **Canonical table**: one [`SalesRecord`] per outlet-month-year, the
//!   fixed schema every source layout is normalized into
//! - **Partial-failure tolerance**: a malformed yearly file is skipped with
//!   a warning; it never aborts the batch
//! - **Derived views**: grouped aggregates, period-over-period growth with
//!   explicit zero-baseline handling, and hierarchical category breakdowns,
//!   all recomputed from the in-memory table on each interaction
//!
//! ## Example
//!
//! ```rust,ignore
//! use salon_insights::*;
//!
//! let sources = vec![
//!     SalesSource::new("2023", SourceRef::object("reports", "MTD - 2023.csv")),
//!     SalesSource::new("2024", SourceRef::object("reports", "MTD - 2024.csv")),
//! ];
//!
//! let mut cache = LoadCache::new();
//! let outcome = cache.load_or_reuse(&sources, &store, &NormalizeHints::default());
//!
//! let by_outlet = aggregate(
//!     &outcome.records,
//!     &[SalesDimension::Outlet],
//!     |r| r.sales,
//!     AggOp::Sum,
//! );
//! let growth = yearly_growth(&outcome.records, SalesDimension::Outlet);
//! println!("{}", format_inr(by_outlet[0].value));
//! ```

pub mod aggregate;
pub mod breakdown;
pub mod currency;
pub mod error;
pub mod growth;
pub mod loader;
pub mod normalize;
pub mod schema;
pub mod source;
pub mod table;

pub use aggregate::{
    aggregate, average_bill_value, average_transaction_value, safe_ratio, sort_rows, summarize,
    AggOp, CategoryDimension, Dimension, GroupedRow, SalesDimension, SalesFilter, SortOrder,
    SummaryMetrics,
};
pub use breakdown::{breakdown, parse_categories, top_n, Breakdown, CategoryHints};
pub use currency::{format_inr, format_inr_as, MoneyStyle, RUPEE};
pub use error::{InsightsError, Result};
pub use growth::{
    chained_growth, compute_growth, project, GrowthEntry, GrowthTable, PercentChange, PeriodPair,
    PeriodTable,
};
pub use loader::{
    load_sales, source_fingerprint, LoadCache, LoadOutcome, LoadWarning, SalesSource,
};
pub use normalize::{normalize, ColumnRule, NormalizeHints, NormalizeOutcome, NormalizedRow};
pub use schema::{
    canonical_schema_json, read_canonical_csv, write_canonical_csv, CategoryRecord, Month,
    SalesRecord, CANONICAL_HEADERS,
};
pub use source::{MemoryStore, SourceRef, TableStore};
pub use table::RawTable;

/// Chained year-over-year growth along one dimension: the distinct years in
/// the table, ascending, reduced to sales sums per dimension value and
/// joined pairwise.
pub fn yearly_growth(records: &[SalesRecord], dimension: SalesDimension) -> Vec<GrowthTable> {
    let mut years: Vec<String> = records.iter().map(|r| r.year.clone()).collect();
    years.sort();
    years.dedup();

    let periods: Vec<PeriodTable> = years
        .into_iter()
        .map(|year| {
            let filter = SalesFilter {
                year: Some(year.clone()),
                ..SalesFilter::default()
            };
            let rows = aggregate(&filter.apply(records), &[dimension], |r| r.sales, AggOp::Sum);
            PeriodTable::new(year, rows)
        })
        .collect();

    chained_growth(&periods)
}

/// Growth between two arbitrary periods (not necessarily adjacent years)
/// along one dimension.
pub fn period_comparison(
    records: &[SalesRecord],
    dimension: SalesDimension,
    base_year: &str,
    compare_year: &str,
) -> GrowthTable {
    let rows_for = |year: &str| {
        let filter = SalesFilter {
            year: Some(year.to_string()),
            ..SalesFilter::default()
        };
        aggregate(&filter.apply(records), &[dimension], |r| r.sales, AggOp::Sum)
    };

    compute_growth(
        PeriodPair::new(base_year, compare_year),
        &rows_for(base_year),
        &rows_for(compare_year),
    )
}
