//! Tests for the JSON and PNG sinks.

mod common;

use std::sync::Arc;

use common::loaders::ScriptedLoader;
use common::test_data::{anchor, test_config};
use synoptic::config::OutputConfig;
use synoptic::render::{sink_for, FrameSink, JsonSink, PngSink};
use synoptic::{BoundingBox, FrameSequence, SequenceBuilder};

fn sequence(loader: ScriptedLoader) -> FrameSequence {
    let config = test_config();
    SequenceBuilder::from_config(&config, Arc::new(loader))
        .unwrap()
        .build(anchor(), &config.offsets)
        .unwrap()
}

#[test]
fn test_json_document() {
    let loader = ScriptedLoader::new()
        .with_coverage(BoundingBox::new(116.0, 26.0, 125.0, 44.0))
        .failing(anchor(), &[36]);
    let sequence = sequence(loader);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("frames.json");
    JsonSink::new(&path).write(&sequence).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(doc["lons"].as_array().unwrap().len(), 11);
    assert_eq!(doc["lats"].as_array().unwrap().len(), 11);
    assert_eq!(doc["color_domains"]["mslp"]["colormap"], "pressure");
    assert_eq!(doc["skipped"][0]["offset"], 36);

    let frames = doc["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 8);
    assert_eq!(frames[0]["offset"], -48);
    assert_eq!(frames[0]["label"], sequence.frames[0].label.as_str());

    let rows = frames[0]["fields"]["height_500"]["values"].as_array().unwrap();
    assert_eq!(rows.len(), 11);
    // West half defined, east half outside the samples
    assert!(rows[0][0].is_f64());
    assert!(rows[0][10].is_null());
    assert_eq!(frames[0]["fields"]["mslp"]["unit"], "hPa");
}

#[test]
fn test_png_frames() {
    let sequence = sequence(ScriptedLoader::new().failing(anchor(), &[-48]));

    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSink::new(dir.path(), 3);
    sink.write(&sequence).unwrap();

    for index in 0..sequence.frames.len() {
        let path = sink.frame_path(index);
        let img = image::open(&path)
            .unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
            .to_rgba8();
        assert_eq!(img.dimensions(), (33, 99));
        assert_eq!(img.get_pixel(16, 16)[3], 255);
    }
    assert!(!sink.frame_path(sequence.frames.len()).exists());
}

#[test]
fn test_sink_factory() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = OutputConfig {
        path: dir.path().join("seq.json"),
        ..OutputConfig::default()
    };
    assert_eq!(sink_for(&config).unwrap().name(), "json");

    config.format = "png".to_string();
    assert_eq!(sink_for(&config).unwrap().name(), "png");

    config.format = "gif".to_string();
    assert!(sink_for(&config).is_err());
}
