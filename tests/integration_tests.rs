use salon_insights::*;

// The 2022 export: clean wide layout with an S.NO sequence column.
const MTD_2022: &str = "S.NO,BRAND,SALONS,January,February,March\n\
    1,Naturals,ADYAR,\"1,00,000\",\"1,10,000\",\"1,20,000\"\n\
    2,Naturals,T NAGAR,90000,95000,99000\n\
    3,Page 3,VELACHERY,40000,42000,44000\n\
    ,,Grand Total,230000,247000,263000\n";

// The 2023 export renames the identifier column and embeds a numeric
// subtotal row.
const MTD_2023: &str = "S.NO,BRAND,Salon Name,January,February,March\n\
    1,Naturals,ADYAR,\"₹1,20,000\",\"₹1,25,000\",\"₹1,30,000\"\n\
    2,Naturals,T NAGAR,100000,not available,104000\n\
    3,Page 3,VELACHERY,0,46000,47000\n\
    4,,42,1,1,1\n";

// 2025 opened a new outlet that has no 2023 baseline.
const MTD_2025: &str = "S.NO,BRAND,SALONS,January,February,March\n\
    1,Naturals,ADYAR,150000,155000,160000\n\
    2,Naturals,T NAGAR,120000,125000,130000\n\
    3,Naturals,ANNA NAGAR,80000,85000,90000\n";

const CATEGORIES: &str = "Business Unit,Item Category,Total_Sales,Total_Quantity,Transaction_Count,Year\n\
    Hair,Hair Cut,\"5,00,000\",2000,1800,2024\n\
    Hair,Hair Color,\"3,00,000\",900,850,2024\n\
    Skin,Facial,\"2,50,000\",700,650,2024\n\
    Spa,Massage,\"1,75,000\",400,380,2024\n\
    Products,Shampoo,\"1,25,000\",1500,1400,2024\n";

fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert("reports", "MTD - 2022.csv", MTD_2022);
    store.insert("reports", "MTD - 2023.csv", MTD_2023);
    store.insert("reports", "MTD - 2025.csv", MTD_2025);
    store.insert("reports", "categories.csv", CATEGORIES);
    store
}

fn sources() -> Vec<SalesSource> {
    vec![
        SalesSource::new("2022", SourceRef::object("reports", "MTD - 2022.csv")),
        SalesSource::new("2023", SourceRef::object("reports", "MTD - 2023.csv")),
        // Deliberately absent from the store.
        SalesSource::new("2024", SourceRef::object("reports", "MTD - 2024.csv")),
        SalesSource::new("2025", SourceRef::object("reports", "MTD - 2025.csv")),
    ]
}

#[test]
fn test_full_pipeline_with_one_missing_year() {
    let outcome = load_sales(&sources(), &store(), &NormalizeHints::default());

    // 2022: 3 outlets x 3 months. 2023: same (the "not available" cell still
    // yields a row with missing sales; the numeric-outlet subtotal row is
    // dropped). 2025: 3 x 3.
    assert_eq!(outcome.skipped_sources, 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].period, "2024");
    assert_eq!(outcome.records.len(), 27);

    // Summary rows never survive normalization.
    assert!(outcome.records.iter().all(|r| !r.outlet.contains("Total")));
    assert!(outcome
        .records
        .iter()
        .all(|r| r.outlet.chars().any(|c| !c.is_ascii_digit())));
}

#[test]
fn test_renamed_identifier_column_still_normalizes() {
    let outcome = load_sales(&sources(), &store(), &NormalizeHints::default());
    let from_2023: Vec<_> = outcome
        .records
        .iter()
        .filter(|r| r.year == "2023")
        .collect();
    assert_eq!(from_2023.len(), 9);
    assert!(from_2023.iter().all(|r| !r.outlet.is_empty()));

    // Currency symbols and Indian separators are stripped during coercion.
    let adyar_jan = from_2023
        .iter()
        .find(|r| r.outlet == "ADYAR" && r.month == Month::January)
        .unwrap();
    assert_eq!(adyar_jan.sales, Some(120_000.0));

    // "not available" became missing, not zero.
    let t_nagar_feb = from_2023
        .iter()
        .find(|r| r.outlet == "T NAGAR" && r.month == Month::February)
        .unwrap();
    assert_eq!(t_nagar_feb.sales, None);
}

#[test]
fn test_aggregation_and_summary_over_union() {
    let outcome = load_sales(&sources(), &store(), &NormalizeHints::default());

    let filter = SalesFilter {
        year: Some("2022".to_string()),
        ..SalesFilter::default()
    };
    let year_2022 = filter.apply(&outcome.records);
    let metrics = summarize(&year_2022);
    assert_eq!(metrics.total_sales, 740_000.0);
    assert_eq!(metrics.outlet_count, 3);

    let by_brand = aggregate(
        &year_2022,
        &[SalesDimension::Brand],
        |r| r.sales,
        AggOp::Sum,
    );
    assert_eq!(by_brand.len(), 2);
    assert_eq!(by_brand[0].key(), "Naturals");
    assert_eq!(by_brand[0].value, 614_000.0);
}

#[test]
fn test_growth_across_years_with_zero_baseline() {
    let outcome = load_sales(&sources(), &store(), &NormalizeHints::default());

    // VELACHERY posted 0 in January 2023 and has no 2025 row at all in some
    // months; compare month-level growth for January.
    let month_filter = SalesFilter {
        month: Some(Month::January),
        ..SalesFilter::default()
    };
    let january = month_filter.apply(&outcome.records);
    let table = period_comparison(&january, SalesDimension::Outlet, "2023", "2025");

    // Inner join: VELACHERY exists in 2023 but not 2025, so only the two
    // common outlets report growth.
    assert_eq!(table.entries.len(), 2);
    let adyar = table.entries.iter().find(|e| e.key() == "ADYAR").unwrap();
    assert_eq!(adyar.delta, 30_000.0);
    match adyar.percent {
        PercentChange::Value(pct) => assert!((pct - 25.0).abs() < 1e-9),
        PercentChange::Infinite => panic!("expected numeric growth"),
    }
}

#[test]
fn test_zero_baseline_growth_uses_infinite_marker() {
    let base = vec![GroupedRow {
        keys: vec!["NEW OUTLET".to_string()],
        value: 0.0,
    }];
    let compare = vec![GroupedRow {
        keys: vec!["NEW OUTLET".to_string()],
        value: 500.0,
    }];
    let table = compute_growth(PeriodPair::new("2023", "2024"), &base, &compare);
    assert_eq!(table.entries[0].percent, PercentChange::Infinite);

    let flat = compute_growth(
        PeriodPair::new("2023", "2024"),
        &[GroupedRow {
            keys: vec!["DORMANT".to_string()],
            value: 0.0,
        }],
        &[GroupedRow {
            keys: vec!["DORMANT".to_string()],
            value: 0.0,
        }],
    );
    assert_eq!(flat.entries[0].percent, PercentChange::Value(0.0));
}

#[test]
fn test_yearly_growth_chain_skips_missing_year() {
    let outcome = load_sales(&sources(), &store(), &NormalizeHints::default());
    let tables = yearly_growth(&outcome.records, SalesDimension::Outlet);

    // Years present: 2022, 2023, 2025 -> two pairwise tables.
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].periods, PeriodPair::new("2022", "2023"));
    assert_eq!(tables[1].periods, PeriodPair::new("2023", "2025"));
}

#[test]
fn test_category_breakdown_end_to_end() {
    let raw = store().read("reports", "categories.csv").unwrap();
    let records = parse_categories(&raw, &CategoryHints::default()).unwrap();
    assert_eq!(records.len(), 5);

    let result = breakdown(
        &records,
        &[
            CategoryDimension::BusinessUnit,
            CategoryDimension::ItemCategory,
        ],
        |r| r.total_sales,
    );

    let hair = result.rollups[0].iter().find(|r| r.key() == "Hair").unwrap();
    assert_eq!(hair.value, 800_000.0);

    let top3 = top_n(&result.leaves, 3);
    assert_eq!(top3.len(), 3);
    assert_eq!(top3[0].keys, vec!["Hair".to_string(), "Hair Cut".to_string()]);

    let avg = average_transaction_value(&records, &[CategoryDimension::BusinessUnit]);
    let hair_avg = avg.iter().find(|r| r.key() == "Hair").unwrap();
    // 800,000 sales over 2,650 transactions.
    assert!((hair_avg.value - 800_000.0 / 2650.0).abs() < 1e-9);
}

#[test]
fn test_canonical_cache_csv_round_trip() {
    let outcome = load_sales(&sources(), &store(), &NormalizeHints::default());

    let mut buf = Vec::new();
    write_canonical_csv(&outcome.records, &mut buf).unwrap();
    let reloaded = read_canonical_csv(buf.as_slice()).unwrap();
    assert_eq!(reloaded, outcome.records);

    // The cache file carries the fixed canonical header.
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with(&CANONICAL_HEADERS.join(",")));
}

#[test]
fn test_currency_formatting_at_the_boundary() {
    let outcome = load_sales(&sources(), &store(), &NormalizeHints::default());
    let by_outlet = aggregate(
        &outcome.records,
        &[SalesDimension::Outlet],
        |r| r.sales,
        AggOp::Sum,
    );

    let labels: Vec<String> = by_outlet.iter().map(|r| format_inr(r.value)).collect();
    assert!(labels.iter().all(|l| l.starts_with(RUPEE)));

    // ADYAR across all three years.
    let adyar = by_outlet.iter().find(|r| r.key() == "ADYAR").unwrap();
    assert_eq!(adyar.value, 1_170_000.0);
    assert_eq!(format_inr(adyar.value), "₹11,70,000");
    assert_eq!(format_inr_as(adyar.value, MoneyStyle::Lakhs), "₹11.70 L");
}
