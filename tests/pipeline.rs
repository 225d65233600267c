use agri_trade::data::{
    build_table, ClassifiedRecord, DataLoader, DataProcessor, Metrics, RawReferenceEntry,
    RawTradeRecord,
};
use agri_trade::export::{continental_frame, export_all};
use agri_trade::schema::files;
use agri_trade::stats::{GroupBy, QueryEngine, QueryError, Scope};
use agri_trade::{build_table_from_files, Continent, M49Classifier, Metric};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

const TRADE_CSV: &str = "\
Area Code (M49),Area,Item Code (CPC),Year,Unit,Import,Export ,Production,Consumption
'156,China,01650,2020,t,10,50,400,360
'156,China,01651,2020,t,5,20,100,85
'356,India,01650,2020,t,30,200,900,730
'704,Viet Nam,01650,2020,t,1,80,120,41
'360,Indonesia,01650,2020,t,2,40,90,52
'764,Thailand,01650,2020,t,3,10,60,53
'050,Bangladesh,01650,2020,t,20,0,30,50
'729,Sudan,01650,2020,t,0,5,15,10
'826,United Kingdom of Great Britain and Northern Ireland,01650,2020,t,40,3,0,37
'036,Australia,01650,2020,t,12,0,0,0
'010,Antarctica,01650,2020,t,1,1,1,1
'999,Atlantis,01650,2020,t,1,1,1,1
'156,China,01650,2019,t,8,45,380,343
";

const REFERENCE_CSV: &str = "\
Country,Alpha-2 code,Alpha-3 code,Numeric code
China,CN,\"CHN\",\"156\"
India,IN,IND,356
Viet Nam,VN,VNM,704
Indonesia,ID,IDN,360
Thailand,TH,THA,764
Bangladesh,BD,BGD,50
Sudan,SD,SDN,736
United Kingdom,GB,GBR,826
Australia,AU,AUS,36
Antarctica,AQ,ATA,10
";

struct Fixture {
    _dir: tempfile::TempDir,
    trade: PathBuf,
    reference: PathBuf,
}

fn fixture(trade: &str, reference: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let trade_path = dir.path().join("data_raw.csv");
    let reference_path = dir.path().join("country_code_conversion.csv");
    std::fs::File::create(&trade_path)
        .unwrap()
        .write_all(trade.as_bytes())
        .unwrap();
    std::fs::File::create(&reference_path)
        .unwrap()
        .write_all(reference.as_bytes())
        .unwrap();
    Fixture {
        _dir: dir,
        trade: trade_path,
        reference: reference_path,
    }
}

fn built() -> (agri_trade::TradeTable, agri_trade::PipelineReport) {
    let f = fixture(TRADE_CSV, REFERENCE_CSV);
    build_table_from_files(&DataLoader::new(), &f.trade, &f.reference, &M49Classifier).unwrap()
}

#[test]
fn builds_canonical_table_from_csv() {
    let (table, report) = built();

    assert_eq!(report.raw_trade_rows, 13);
    assert_eq!(report.unresolved_rows, 2);
    assert_eq!(report.malformed_rows, 0);
    assert_eq!(table.len(), 10);
    assert_eq!(table.years(), &[2019, 2020]);

    for r in table.records() {
        assert!(Continent::ALL.contains(&r.continent));
        assert!(!r.country_identifier.is_empty());
    }

    let china = table
        .records()
        .iter()
        .find(|r| r.area == "China" && r.year == 2020)
        .unwrap();
    assert_eq!(china.country_identifier, "CHN");
    assert_eq!(china.import, 15.0);
    assert_eq!(china.export, 70.0);
    assert_eq!(china.net_trade, 55.0);
    assert_eq!(china.self_sufficiency_ratio, Some(500.0 / 445.0));
}

#[test]
fn source_corrections_are_applied() {
    let (table, _) = built();

    let sudan = table.records().iter().find(|r| r.area == "Sudan").unwrap();
    assert_eq!(sudan.country_identifier, "SDN");
    assert_eq!(sudan.continent, Continent::Africa);

    let uk = table
        .records()
        .iter()
        .find(|r| r.country_identifier == "GBR")
        .unwrap();
    assert_eq!(uk.area, "UK and Northern Ireland");
    assert_eq!(uk.continent, Continent::Europe);

    let australia = table.records().iter().find(|r| r.area == "Australia").unwrap();
    assert_eq!(australia.self_sufficiency_ratio, None);
}

#[test]
fn top_five_for_asia() {
    let (table, _) = built();
    let top = QueryEngine::top_n(
        &table,
        Metric::Production,
        2020,
        Scope::Continent(Continent::Asia),
        5,
    )
    .unwrap();

    let areas: Vec<&str> = top.entries.iter().map(|e| e.area.as_str()).collect();
    assert_eq!(areas, vec!["India", "China", "Viet Nam", "Indonesia", "Thailand"]);
    assert_eq!(top.scope_total, 1700.0);
    let share = top.entries[0].market_share.unwrap();
    assert!((share - 900.0 / 1700.0 * 100.0).abs() < 1e-9);
}

#[test]
fn top_five_for_thin_scope() {
    let (table, _) = built();
    let top = QueryEngine::top_n(
        &table,
        Metric::Import,
        2020,
        Scope::Continent(Continent::Oceania),
        5,
    )
    .unwrap();
    assert_eq!(top.entries.len(), 1);
    assert!(!top.is_complete());
    assert_eq!(top.entries[0].market_share, Some(100.0));

    assert_eq!(
        QueryEngine::top_n(&table, Metric::Import, 2005, Scope::World, 5).unwrap_err(),
        QueryError::UnknownYear(2005)
    );
}

#[test]
fn missing_column_fails_the_build() {
    let f = fixture(
        "Area Code (M49),Area,Year,Unit,Import,Export,Production,Consumption\n156,China,2020,t,1,2,3,4\n",
        REFERENCE_CSV,
    );
    let err = build_table_from_files(&DataLoader::new(), &f.trade, &f.reference, &M49Classifier)
        .unwrap_err();
    assert!(err.to_string().contains("Export "));
}

#[test]
fn decimals_after_integer_prefix_are_summed() {
    let mut trade =
        String::from("Area Code (M49),Area,Year,Unit,Import,Export ,Production,Consumption\n");
    for _ in 0..20 {
        trade.push_str("'156,China,2020,t,1,2,3,4\n");
    }
    trade.push_str("'156,China,2020,t,1.5,2.5,3.5,4.5\n");
    trade.push_str("'156,China,2019,t,1,,3,4\n");
    let f = fixture(&trade, REFERENCE_CSV);

    let loader = DataLoader::new().with_infer_schema_length(10);
    let (table, report) =
        build_table_from_files(&loader, &f.trade, &f.reference, &M49Classifier).unwrap();

    let latest = table.records().iter().find(|r| r.year == 2020).unwrap();
    assert_eq!(latest.import, 21.5);
    assert_eq!(latest.export, 42.5);
    assert_eq!(latest.consumption, 84.5);
    assert_eq!(report.rows_with_missing_metrics, 1);
}

#[test]
fn continental_view_resums_to_canonical_totals() {
    let (table, _) = built();

    let df = continental_frame(&table).unwrap();
    let continents: Vec<String> = df
        .column("Continent")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap().to_string())
        .collect();

    for metric in Metric::BASE {
        let values: Vec<f64> = df
            .column(metric.name())
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();

        let mut resummed: BTreeMap<String, f64> = BTreeMap::new();
        for (c, v) in continents.iter().zip(values) {
            *resummed.entry(c.clone()).or_default() += v;
        }

        let direct = QueryEngine::grouped_sum(&table, GroupBy::CONTINENT, metric);
        assert_eq!(direct.len(), resummed.len());
        for g in direct {
            let name = g.key.continent.unwrap().name().to_string();
            let expected = g.value.unwrap();
            assert!((resummed[&name] - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn exports_three_views() {
    let (table, _) = built();
    let dir = tempfile::tempdir().unwrap();
    export_all(&table, dir.path()).unwrap();

    for name in [files::CANONICAL, files::CONTINENTAL, files::WORLD_RANK] {
        assert!(dir.path().join(name).exists(), "{name} missing");
    }

    let canonical = std::fs::read_to_string(dir.path().join(files::CANONICAL)).unwrap();
    assert!(canonical.starts_with("Area,Continent,ISO-3,Year,Import,Export,"));
    assert_eq!(canonical.lines().count(), table.len() + 1);
}

fn raw_trade(area: &str, code: i64, year: i64, import: f64, consumption: f64) -> RawTradeRecord {
    RawTradeRecord {
        area: Some(area.to_string()),
        area_code: Some(code.to_string()),
        year: Some(year),
        import: Some(import),
        export: Some(1.0),
        production: Some(2.0),
        consumption: Some(consumption),
        unit: None,
    }
}

fn stub(code: i64) -> Option<Continent> {
    Continent::ALL.get(code as usize % 6).copied()
}

proptest! {
    #[test]
    fn ratio_undefined_exactly_when_consumption_zero(
        rows in prop::collection::vec((0i64..4, 2000i64..2003, 0u8..3), 1..30)
    ) {
        let trade: Vec<RawTradeRecord> = rows
            .iter()
            .map(|(code, year, consumption)| {
                raw_trade(&format!("Land{code}"), *code, *year, 1.0, *consumption as f64)
            })
            .collect();
        let reference: Vec<RawReferenceEntry> = (0..4)
            .map(|c| RawReferenceEntry {
                numeric_code: Some(c.to_string()),
                alpha3_code: Some(format!("L{c:02}")),
            })
            .collect();

        let (table, report) = build_table(&trade, &reference, &stub);
        prop_assert_eq!(report.classified_rows + report.unresolved_rows, rows.len());

        for r in table.records() {
            if r.consumption == 0.0 {
                prop_assert_eq!(r.self_sufficiency_ratio, None);
            } else {
                prop_assert_eq!(r.self_sufficiency_ratio, Some(r.production / r.consumption));
            }
            prop_assert_eq!(r.net_trade, r.export - r.import);
        }
    }

    #[test]
    fn aggregation_is_idempotent_and_order_free(
        rows in prop::collection::vec((0usize..3, 2000i32..2003, 0u32..100), 0..40)
    ) {
        let records: Vec<ClassifiedRecord> = rows
            .iter()
            .map(|(area, year, import)| ClassifiedRecord {
                area: format!("A{area}"),
                continent: Continent::ALL[*area],
                country_identifier: format!("C{area}"),
                year: *year,
                metrics: Metrics { import: *import as f64, ..Default::default() },
            })
            .collect();

        let once = DataProcessor::aggregate(records.clone());
        let twice = DataProcessor::aggregate(once.clone());
        prop_assert_eq!(&once, &twice);

        let mut reversed = records;
        reversed.reverse();
        prop_assert_eq!(DataProcessor::aggregate(reversed), once);
    }

    #[test]
    fn world_ranks_form_competition_prefix(
        imports in prop::collection::vec(0u32..6, 1..25)
    ) {
        let trade: Vec<RawTradeRecord> = imports
            .iter()
            .enumerate()
            .map(|(i, v)| raw_trade(&format!("Land{i}"), 1, 2000, *v as f64, 1.0))
            .collect();
        let reference = vec![RawReferenceEntry {
            numeric_code: Some("1".to_string()),
            alpha3_code: Some("ONE".to_string()),
        }];
        let (table, _) = build_table(&trade, &reference, &stub);

        let ranked = QueryEngine::world_rank(&table, Metric::Import);
        prop_assert!(ranked.iter().any(|r| r.rank == Some(1)));
        for r in &ranked {
            let v = r.value.unwrap();
            let greater = ranked.iter().filter(|o| o.value.unwrap() > v).count() as u32;
            prop_assert_eq!(r.rank, Some(greater + 1));
        }
    }
}
