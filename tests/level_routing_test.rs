//! 按级别路由测试
//!
//! 每个级别一个内存输出，检查同步日志器的写入、同步和级别过滤

use rat_routelog::sink::MemorySink;
use rat_routelog::{
    AtomicLevel, Core, Encoder, Field, JsonEncoder, Level, LevelCore, LogError, LogOper,
    LoggerBuilder,
    Record, SinkTable,
};
use std::sync::Arc;

fn sinks_per_level() -> (SinkTable, Vec<Arc<MemorySink>>) {
    let mut table = SinkTable::new();
    let mut sinks = Vec::new();
    for level in Level::ALL {
        let sink = Arc::new(MemorySink::new());
        table.insert(level, sink.clone());
        sinks.push(sink);
    }
    (table, sinks)
}

fn parse(line: &str) -> serde_json::Value {
    serde_json::from_str(line.trim_end()).unwrap()
}

#[test]
fn test_info_then_error_end_to_end() {
    let (table, sinks) = sinks_per_level();
    let logger = LoggerBuilder::new().with_sinks(table).build().unwrap();

    logger.info("x", &[]).unwrap();
    logger.error("y", &[]).unwrap();

    let info = &sinks[Level::Info.index()];
    let error = &sinks[Level::Error.index()];

    assert_eq!(info.write_count(), 1);
    assert_eq!(error.write_count(), 1);
    assert_eq!(parse(&info.lines()[0])["msg"], "x");
    assert_eq!(parse(&error.lines()[0])["msg"], "y");

    // Error 达到同步级别，Info 没有
    assert_eq!(error.sync_count(), 1);
    assert_eq!(info.sync_count(), 0);

    for level in [Level::Debug, Level::Warn, Level::DPanic, Level::Panic, Level::Fatal] {
        assert_eq!(sinks[level.index()].write_count(), 0, "{} sink touched", level);
    }
}

#[test]
fn test_core_delivers_exact_encoded_bytes() {
    let (table, sinks) = sinks_per_level();
    let level = AtomicLevel::new(Level::Debug);
    let core = LevelCore::new(Box::new(JsonEncoder::default()), table, Arc::new(level));

    for target in Level::ALL {
        let message = format!("message for {}", target);
        let record = Record::new(target, &message);
        let fields = [Field::string("level_name", target.as_str())];

        core.write(&record, &fields).unwrap();

        let expected = JsonEncoder::default()
            .encode_entry(&record, &fields)
            .unwrap();
        assert_eq!(sinks[target.index()].writes(), vec![expected]);
    }
}

#[test]
fn test_unregistered_level_reports_error() {
    let info = Arc::new(MemorySink::new());
    let logger = LoggerBuilder::new()
        .with_level(Level::Debug)
        .with_sink(Level::Info, info.clone())
        .build()
        .unwrap();

    let err = logger.warn("no warn sink", &[]).unwrap_err();
    assert!(matches!(err, LogError::NoSinkForLevel(Level::Warn)));
    assert_eq!(info.write_count(), 0);
    assert_eq!(info.sync_count(), 0);
}

#[test]
fn test_level_gate_and_shared_change() {
    let (table, sinks) = sinks_per_level();
    let level = AtomicLevel::new(Level::Warn);
    let logger = LoggerBuilder::new()
        .with_atomic_level(level.clone())
        .with_sinks(table)
        .build()
        .unwrap();
    let child = logger.with_fields(&[Field::string("component", "cache")]);

    for l in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
        assert_eq!(logger.enabled(l), l >= Level::Warn);
        assert_eq!(child.enabled(l), l >= Level::Warn);
    }

    logger.info("dropped", &[]).unwrap();
    child.debug("dropped", &[]).unwrap();
    assert_eq!(sinks[Level::Info.index()].write_count(), 0);
    assert_eq!(sinks[Level::Debug.index()].write_count(), 0);

    // 通过日志器修改，原句柄和子日志器同时生效
    assert!(child.set_level(Level::Debug));
    assert_eq!(level.level(), Level::Debug);
    assert!(logger.enabled(Level::Debug));

    child.debug("kept", &[]).unwrap();
    let line = &sinks[Level::Debug.index()].lines()[0];
    assert_eq!(parse(line)["component"], "cache");
}

#[test]
fn test_child_fields_do_not_leak() {
    let (table, sinks) = sinks_per_level();
    let logger = LoggerBuilder::new().with_sinks(table).build().unwrap();
    let child = logger.with_fields(&[Field::string("request_id", "r-1")]);
    let grandchild = child.with_fields(&[Field::u64("attempt", 2)]);

    grandchild.info("g", &[]).unwrap();
    child.info("c", &[]).unwrap();
    logger.info("p", &[]).unwrap();

    let lines: Vec<serde_json::Value> = sinks[Level::Info.index()]
        .lines()
        .iter()
        .map(|l| parse(l))
        .collect();
    assert_eq!(lines[0]["request_id"], "r-1");
    assert_eq!(lines[0]["attempt"], 2);
    assert_eq!(lines[1]["request_id"], "r-1");
    assert!(lines[1].get("attempt").is_none());
    assert!(lines[2].get("request_id").is_none());
}

#[test]
fn test_sink_failure_surfaces_on_sync_path() {
    let info = Arc::new(MemorySink::new());
    info.set_failing(true);
    let logger = LoggerBuilder::new().with_sink(Level::Info, info).build().unwrap();

    let err = logger.info("lost", &[]).unwrap_err();
    assert!(matches!(err, LogError::SinkWrite(_)));
}

#[test]
fn test_encode_failure_reaches_no_sink() {
    use std::collections::HashMap;

    let info = Arc::new(MemorySink::new());
    let logger = LoggerBuilder::new().with_sink(Level::Info, info.clone()).build().unwrap();

    let mut bad = HashMap::new();
    bad.insert(vec![1u8], "tuple keys are not json");
    let err = logger.info("x", &[Field::any("bad", &bad)]).unwrap_err();

    assert!(matches!(err, LogError::Encode(_)));
    assert_eq!(info.write_count(), 0);
}

#[test]
fn test_config_driven_console_logger() {
    use rat_routelog::ConsoleEncoder;
    use rat_routelog::LoggerConfig;

    let config = LoggerConfig::from_json(
        r#"{
            "level": "debug",
            "core": { "flush_level": "warn" },
            "encoder": { "level_style": "uppercase", "time_format": "epoch_seconds" }
        }"#,
    )
    .unwrap();
    let encoder = ConsoleEncoder::new(config.encoder.clone());

    let memory = Arc::new(MemorySink::new());
    let logger = LoggerBuilder::new()
        .with_config(config)
        .with_encoder(encoder)
        .with_sink_for_levels(&Level::ALL, memory.clone())
        .build()
        .unwrap();

    rat_routelog::debug!(logger, "cache miss"; Field::string("key", "user:7")).unwrap();
    rat_routelog::warn!(logger, "slow query").unwrap();

    let lines = memory.lines();
    assert_eq!(lines.len(), 2);

    let parts: Vec<&str> = lines[0].trim_end().split('\t').collect();
    assert_eq!(parts[1], "DEBUG");
    assert!(parts[2].starts_with("tests/level_routing_test.rs:"));
    assert_eq!(parts[3], "cache miss");
    assert_eq!(parts[4], r#"{"key":"user:7"}"#);

    // Warn 达到配置的同步级别
    assert_eq!(memory.sync_count(), 1);
}
