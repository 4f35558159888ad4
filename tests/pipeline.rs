//! End-to-end checks: CSV export -> store -> aggregations -> exports.

use std::collections::HashMap;

use propstat::aggregate::{AggregateError, category_distribution, daily_series};
use propstat::domain::{DistributionConfig, SeriesConfig};
use propstat::io::ingest::{parse_propositions, read_propositions_file};
use propstat::io::{write_series_csv, write_series_json};
use propstat::store::Store;

const EXPORT_2020: &str = "\u{feff}Codigo,TipoProposicao,Numero,Ano,DataPublicacao,Situacao
100,Requerimento,1,2020,02/01/2020,Aprovado
101,requerimento ,2,2020,01/01/2020,Aprovado
102,Projeto de Lei,3,2020,01/01/2020,Em tramitação
103,Requerimento,4,2020,05/01/2020,Arquivado
";

const EXPORT_2021: &str = "Codigo,TipoProposicao,Numero,Ano,DataPublicacao,Situacao
200,Veto,1,2021,10/01/2021,Mantido
101,Requerimento,2,2020,01/01/2020,Arquivado
";

fn record(date: &str) -> HashMap<String, String> {
    HashMap::from([("DataPublicacao".to_string(), date.to_string())])
}

#[test]
fn csv_to_store_to_series() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("nested").join("props.db");

    let mut store = Store::open(&db).unwrap();
    let first = parse_propositions(EXPORT_2020, 2020).unwrap();
    assert_eq!(first.rows_read, 4);
    assert!(first.row_errors.is_empty());
    assert_eq!(store.upsert_propositions(&first.propositions).unwrap(), 4);

    // 101 reappears in the next export and must replace, not duplicate.
    let second = parse_propositions(EXPORT_2021, 2021).unwrap();
    store.upsert_propositions(&second.propositions).unwrap();
    drop(store);

    let store = Store::open(&db).unwrap();
    assert_eq!(store.count_propositions().unwrap(), 5);

    let records = store.load_propositions(None).unwrap();
    let config = SeriesConfig {
        window: 2,
        date_field: "DataPublicacao".to_string(),
    };
    let series = daily_series(&records, &config).unwrap();

    let dates: Vec<String> = series.iter().map(|p| p.date.format("%d/%m/%Y").to_string()).collect();
    assert_eq!(dates, vec!["01/01/2020", "02/01/2020", "05/01/2020", "10/01/2021"]);
    let counts: Vec<usize> = series.iter().map(|p| p.count).collect();
    assert_eq!(counts, vec![2, 1, 1, 1]);
    let averages: Vec<f64> = series.iter().map(|p| p.moving_average).collect();
    assert_eq!(averages, vec![2.0, 1.5, 1.0, 1.0]);

    let only_2020 = store.load_propositions(Some(2020..=2020)).unwrap();
    assert_eq!(only_2020.len(), 3);
}

#[test]
fn distribution_normalizes_labels_from_export() {
    let batch = parse_propositions(EXPORT_2020, 2020).unwrap();
    let shares = category_distribution(&batch.propositions, &DistributionConfig::default()).unwrap();

    let labels: Vec<(&str, usize)> = shares.iter().map(|s| (s.label.as_str(), s.count)).collect();
    assert_eq!(labels, vec![("Projeto De Lei", 1), ("Requerimento", 3)]);
    let total: f64 = shares.iter().map(|s| s.proportion).sum();
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn series_exports_land_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("2020.csv");
    std::fs::write(&csv_path, EXPORT_2020).unwrap();

    let batch = read_propositions_file(&csv_path, 2020).unwrap();
    let config = SeriesConfig::default();
    let series = daily_series(&batch.propositions, &config).unwrap();

    let out_csv = dir.path().join("series.csv");
    write_series_csv(&out_csv, &series).unwrap();
    let text = std::fs::read_to_string(&out_csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,total_propositions,moving_avg"));
    assert_eq!(lines.next(), Some("2020-01-01,2,2.000000"));
    assert_eq!(lines.count(), 2);

    let out_json = dir.path().join("series.json");
    write_series_json(&out_json, &series, &config).unwrap();
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out_json).unwrap()).unwrap();
    assert_eq!(value["window"], 5);
    assert_eq!(value["points"].as_array().map(Vec::len), Some(3));
}

#[test]
fn series_properties_hold_for_generic_records() {
    let raw = [
        "03/02/2021", "01/02/2021", "03/02/2021", "28/02/2020", "01/02/2021", "03/02/2021", "29/02/2020",
    ];
    let records: Vec<_> = raw.iter().map(|d| record(d)).collect();

    for window in 1..=8 {
        let config = SeriesConfig {
            window,
            ..SeriesConfig::default()
        };
        let series = daily_series(&records, &config).unwrap();

        assert_eq!(series.len(), 4);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series.iter().map(|p| p.count).sum::<usize>(), records.len());
        assert_eq!(series[0].moving_average, series[0].count as f64);
        for (i, p) in series.iter().enumerate() {
            let lo = i.saturating_sub(window - 1);
            let slice = &series[lo..=i];
            let mean = slice.iter().map(|q| q.count as f64).sum::<f64>() / slice.len() as f64;
            assert!((p.moving_average - mean).abs() < 1e-12);
        }
    }
}

#[test]
fn bad_date_rejects_whole_input() {
    let records = vec![record("01/01/2020"), record("2020-01-02"), record("03/01/2020")];
    let err = daily_series(&records, &SeriesConfig::default()).unwrap_err();
    match err {
        AggregateError::DateParse { index, value, .. } => {
            assert_eq!(index, 1);
            assert_eq!(value.as_deref(), Some("2020-01-02"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
