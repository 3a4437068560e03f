//! 配置模块

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{LogError, Result};

/// 日志级别
///
/// 全序：Debug < Info < Warn < Error < DPanic < Panic < Fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    DPanic = 4,
    Panic = 5,
    Fatal = 6,
}

impl Level {
    /// 全部级别，按严重程度升序
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::DPanic,
        Level::Panic,
        Level::Fatal,
    ];

    /// 级别数量
    pub const COUNT: usize = 7;

    /// 级别在 [`Level::ALL`] 中的下标
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 从下标还原级别
    pub fn from_index(index: u8) -> Option<Level> {
        Self::ALL.get(index as usize).copied()
    }

    /// 小写名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::DPanic => "dpanic",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    /// 大写名称
    pub const fn as_upper_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::DPanic => "DPANIC",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// 宽松解析配置文件中的级别字符串，未识别的值回落到 Warn
    pub fn from_config_str(s: &str) -> Level {
        s.parse().unwrap_or(Level::Warn)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_upper_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Level::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| LogError::InvalidConfig(format!("未知的日志级别: {:?}", s)))
    }
}

/// 写入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterMode {
    /// 调用线程直接写入
    #[default]
    Sync,
    /// 普通级别交给后台线程写入
    Async,
}

/// 级别文本样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStyle {
    #[default]
    Lowercase,
    Uppercase,
}

impl LevelStyle {
    pub fn render(self, level: Level) -> &'static str {
        match self {
            LevelStyle::Lowercase => level.as_str(),
            LevelStyle::Uppercase => level.as_upper_str(),
        }
    }
}

/// 时间戳格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// 2006-01-02T15:04:05.000+0800
    #[default]
    Iso8601,
    /// 2006-01-02T15:04:05+08:00
    Rfc3339,
    /// 毫秒级 Unix 时间戳
    EpochMillis,
    /// 秒级 Unix 时间戳
    EpochSeconds,
}

/// 编码器配置
///
/// 键名为空字符串时对应字段不输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub time_key: String,
    pub level_key: String,
    pub message_key: String,
    pub caller_key: String,
    pub line_ending: String,
    pub level_style: LevelStyle,
    pub time_format: TimeFormat,
}

impl EncoderConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        let keys = [
            &self.time_key,
            &self.level_key,
            &self.message_key,
            &self.caller_key,
        ];
        for (i, a) in keys.iter().enumerate() {
            if a.is_empty() {
                continue;
            }
            if keys[i + 1..].iter().any(|b| b == a) {
                return Err(LogError::InvalidConfig(format!("配置错误: 编码器键名重复 ({})", a)));
            }
        }
        if self.line_ending.is_empty() {
            return Err(LogError::InvalidConfig("配置错误: 行结束符不能为空".to_string()));
        }
        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_key: "time".to_string(),
            level_key: "level".to_string(),
            message_key: "msg".to_string(),
            caller_key: "caller".to_string(),
            line_ending: "\n".to_string(),
            level_style: LevelStyle::Lowercase,
            time_format: TimeFormat::Iso8601,
        }
    }
}

/// 终端颜色配置（ANSI 转义序列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub debug: String,
    pub info: String,
    pub warn: String,
    pub error: String,
    pub dpanic: String,
    pub panic: String,
    pub fatal: String,
    pub timestamp: String,
    pub caller: String,
    pub message: String,
}

impl ColorConfig {
    /// 获取级别颜色
    pub fn for_level(&self, level: Level) -> &str {
        match level {
            Level::Debug => &self.debug,
            Level::Info => &self.info,
            Level::Warn => &self.warn,
            Level::Error => &self.error,
            Level::DPanic => &self.dpanic,
            Level::Panic => &self.panic,
            Level::Fatal => &self.fatal,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            debug: "\x1b[36m".to_string(),  // 青色
            info: "\x1b[32m".to_string(),   // 绿色
            warn: "\x1b[33m".to_string(),   // 黄色
            error: "\x1b[31m".to_string(),  // 红色
            dpanic: "\x1b[35m".to_string(), // 紫色
            panic: "\x1b[1;35m".to_string(),
            fatal: "\x1b[1;31m".to_string(),
            timestamp: "\x1b[90m".to_string(),
            caller: "\x1b[34m".to_string(),
            message: "\x1b[37m".to_string(),
        }
    }
}

/// 核心配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// 达到该级别（含）的记录写入后立即同步对应输出
    pub flush_level: Level,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            flush_level: Level::Error,
        }
    }
}

/// 异步分发配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 队列容量（条）
    pub queue_capacity: usize,
}

impl DispatcherConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LogError::InvalidConfig("配置错误: 队列容量不能为 0".to_string()));
        }
        if self.queue_capacity > 1_000_000 {
            return Err(LogError::InvalidConfig(
                "配置错误: 队列容量过大 (最大 1000000)".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 500,
        }
    }
}

/// 日志器整体配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// 最低输出级别
    pub level: Level,
    pub mode: WriterMode,
    /// 开发模式：DPanic 级别在记录后触发 panic
    pub development: bool,
    pub core: CoreConfig,
    pub dispatcher: DispatcherConfig,
    pub encoder: EncoderConfig,
}

impl LoggerConfig {
    /// 从 JSON 文本解析配置并验证
    pub fn from_json(text: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(text)
            .map_err(|e| LogError::InvalidConfig(format!("配置解析失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        self.dispatcher.validate()?;
        self.encoder.validate()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            mode: WriterMode::Sync,
            development: false,
            core: CoreConfig::default(),
            dispatcher: DispatcherConfig::default(),
            encoder: EncoderConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Error < Level::DPanic);
        assert!(Level::Panic < Level::Fatal);
        for (i, level) in Level::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
            assert_eq!(Level::from_index(i as u8), Some(*level));
        }
        assert_eq!(Level::from_index(7), None);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("info".parse::<Level>().unwrap(), Level::Info);
        assert_eq!(" DPanic ".parse::<Level>().unwrap(), Level::DPanic);
        assert!("verbose".parse::<Level>().is_err());

        assert_eq!(Level::from_config_str("debug"), Level::Debug);
        assert_eq!(Level::from_config_str("whatever"), Level::Warn);
    }

    #[test]
    fn test_dispatcher_config_validate() {
        assert!(DispatcherConfig::default().validate().is_ok());
        let zero = DispatcherConfig { queue_capacity: 0 };
        assert!(matches!(zero.validate(), Err(LogError::InvalidConfig(_))));
    }

    #[test]
    fn test_encoder_config_duplicate_keys() {
        let mut config = EncoderConfig::default();
        assert!(config.validate().is_ok());

        config.caller_key = "msg".to_string();
        assert!(config.validate().is_err());

        // 空键名不参与重复检查
        config.caller_key.clear();
        config.time_key.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logger_config_from_json() {
        let config = LoggerConfig::from_json(
            r#"{
                "level": "debug",
                "mode": "async",
                "core": { "flush_level": "dpanic" },
                "dispatcher": { "queue_capacity": 16 },
                "encoder": { "message_key": "message", "level_style": "uppercase" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.mode, WriterMode::Async);
        assert_eq!(config.core.flush_level, Level::DPanic);
        assert_eq!(config.dispatcher.queue_capacity, 16);
        assert_eq!(config.encoder.message_key, "message");
        assert_eq!(config.encoder.time_key, "time");
        assert_eq!(config.encoder.level_style, LevelStyle::Uppercase);
        assert!(!config.development);
    }

    #[test]
    fn test_logger_config_rejects_invalid() {
        let err = LoggerConfig::from_json(r#"{ "dispatcher": { "queue_capacity": 0 } }"#);
        assert!(matches!(err, Err(LogError::InvalidConfig(_))));

        let err = LoggerConfig::from_json(r#"{ "level": "loud" }"#);
        assert!(matches!(err, Err(LogError::InvalidConfig(_))));
    }
}
