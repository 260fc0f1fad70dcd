use anyhow::Result;
use cell_gps_correlator::core::binary_scanner::EPOCH_2000;
use cell_gps_correlator::{
    CliConfig, CorrelationEngine, CorrelationPipeline, CorrelatorError, LocalStorage,
    OutputFormat,
};
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, data: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path.to_str().unwrap().to_string()
}

fn qmdl_frame(unix_seconds: i64) -> Vec<u8> {
    let raw = ((unix_seconds - EPOCH_2000) as u64) * 1_000_000;
    let mut bytes = vec![0x7E, 0x00, 0x10, 0x20];
    bytes.extend_from_slice(&(raw as u32).to_le_bytes());
    bytes.extend_from_slice(&((raw >> 32) as u32).to_le_bytes());
    bytes.extend_from_slice(&[0x33; 4]);
    bytes
}

fn read_rows(path: &str) -> Result<Vec<csv::StringRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.records().collect::<std::result::Result<Vec<_>, _>>()?)
}

#[tokio::test]
async fn test_end_to_end_ndjson_csv() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    let gps = write(dir, "track.gps", b"100,10.0,20.0\n200,10.1,20.1");
    let ndjson = write(dir, "cells.ndjson", br#"{"timestamp":105,"cell_id":42}"#);
    let output = dir.join("out.csv").to_str().unwrap().to_string();

    let mut config = CliConfig::new(gps, Some(ndjson), None);
    config.output = output.clone();

    let pipeline = CorrelationPipeline::new(LocalStorage::default(), config);
    let mut engine = CorrelationEngine::new(pipeline);
    let summary = engine.run().await?;

    assert_eq!(summary.output_path, output);
    assert_eq!(summary.observations, 1);
    assert_eq!(summary.matched, 1);

    let rows = read_rows(&output)?;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(&row[0], "105");
    assert_eq!(&row[2], "100");
    assert_eq!(&row[4], "10.0");
    assert_eq!(&row[5], "20.0");
    assert_eq!(&row[6], "5");
    assert_eq!(&row[7], "42");
    assert_eq!(&row[17], "ndjson");
    Ok(())
}

#[tokio::test]
async fn test_mixed_sources_keep_load_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    let gps = write(
        dir,
        "track.gps",
        b"1600000010,1.0,1.0\n\nbroken line\n1700000000,2.0,2.0\n",
    );
    let ndjson = write(
        dir,
        "cells.ndjson",
        concat!(
            "{\"timestamp\":\"2023-11-14T22:13:40Z\",\"rat\":\"LTE\",\"rsrp\":-101}\n",
            "{\"timestamp\":0,\"cell_id\":9}\n",
            "not json at all\n",
            "{\"timestamp\":\"1699999000\"}\n",
        )
        .as_bytes(),
    );
    let mut capture = vec![0xAB; 7];
    capture.extend(qmdl_frame(1_600_000_000));
    capture.extend(qmdl_frame(1_800_000_000));
    let qmdl = write(dir, "capture.qmdl", &capture);
    let output = dir.join("out.csv").to_str().unwrap().to_string();

    let mut config = CliConfig::new(gps, Some(ndjson), Some(qmdl));
    config.output = output.clone();

    let mut engine =
        CorrelationEngine::new(CorrelationPipeline::new(LocalStorage::default(), config));
    let summary = engine.run().await?;
    assert_eq!(summary.observations, 4);
    assert_eq!(summary.matched, 2);

    let rows = read_rows(&output)?;
    let sources: Vec<&str> = rows.iter().map(|r| r.get(17).unwrap()).collect();
    assert_eq!(sources, vec!["ndjson", "ndjson", "qmdl", "qmdl"]);

    // 2023-11-14T22:13:40Z is 20s after the second fix
    assert_eq!(&rows[0][0], "1700000020");
    assert_eq!(&rows[0][6], "20");
    assert_eq!(&rows[0][13], "-101");
    assert_eq!(&rows[0][16], "LTE");

    // 1000s away from every fix
    assert_eq!(&rows[1][0], "1699999000");
    assert_eq!(&rows[1][2], "");
    assert_eq!(&rows[1][6], "inf");

    assert_eq!(&rows[2][0], "1600000000");
    assert_eq!(&rows[2][6], "10");
    assert_eq!(&rows[3][6], "inf");
    Ok(())
}

#[tokio::test]
async fn test_binary_cap_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    let gps = write(dir, "track.gps", b"1600000000,0.0,0.0\n");
    let capture: Vec<u8> = (0..2000).flat_map(|i| qmdl_frame(1_600_000_000 + i)).collect();
    let qmdl = write(dir, "capture.qmdl", &capture);
    let output = dir.join("out.json").to_str().unwrap().to_string();

    let mut config = CliConfig::new(gps, None, Some(qmdl));
    config.output = output.clone();
    config.format = OutputFormat::Json;

    let mut engine =
        CorrelationEngine::new(CorrelationPipeline::new(LocalStorage::default(), config));
    let summary = engine.run().await?;
    assert_eq!(summary.observations, 1000);
    // fixes within 30s of 1600000000
    assert_eq!(summary.matched, 31);

    let rows: serde_json::Value = serde_json::from_slice(&std::fs::read(&output)?)?;
    assert_eq!(rows.as_array().map(Vec::len), Some(1000));
    assert_eq!(rows[999]["cell_timestamp"], serde_json::json!(1_600_000_999));
    assert_eq!(rows[999]["time_diff_seconds"], serde_json::Value::Null);
    Ok(())
}

#[tokio::test]
async fn test_missing_gps_file_aborts_before_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    let ndjson = write(dir, "cells.ndjson", b"{\"timestamp\":105}\n");
    let output = dir.join("out.csv");

    let mut config = CliConfig::new(
        dir.join("missing.gps").to_str().unwrap(),
        Some(ndjson),
        None,
    );
    config.output = output.to_str().unwrap().to_string();

    let mut engine =
        CorrelationEngine::new(CorrelationPipeline::new(LocalStorage::default(), config));
    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, CorrelatorError::SourceUnavailable { .. }));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_threshold_boundary_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    let gps = write(dir, "track.gps", b"1000,1.0,1.0\n");
    let ndjson = write(
        dir,
        "cells.ndjson",
        b"{\"timestamp\":1030}\n{\"timestamp\":1031}\n",
    );
    let output = dir.join("out.tsv").to_str().unwrap().to_string();

    let mut config = CliConfig::new(gps, Some(ndjson), None);
    config.output = output.clone();
    config.format = OutputFormat::Tsv;

    let mut engine =
        CorrelationEngine::new(CorrelationPipeline::new(LocalStorage::default(), config));
    let summary = engine.run().await?;
    assert_eq!(summary.matched, 1);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(&output)?;
    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(&rows[0][6], "30");
    assert_eq!(&rows[1][6], "inf");
    assert_eq!(&rows[1][4], "");
    Ok(())
}
