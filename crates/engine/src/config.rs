use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::content::Color4;

pub const CONFIG_FILE_NAME: &str = "engine.cfg";

const WINDOW_WIDTH_RANGE: (u32, u32) = (160, 7680);
const WINDOW_HEIGHT_RANGE: (u32, u32) = (144, 4320);
const TICK_RATE_RANGE: (u32, u32) = (10, 1000);
const MAX_TICKS_RANGE: (u32, u32) = (1, 60);
const FRAME_FLOOR_RANGE: (u32, u32) = (0, 100);
const COLOR_CHANNEL_RANGE: (u32, u32) = (0, 255);
const TIME_SCALE_RANGE: (f32, f32) = (0.0, 10.0);

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
    pub tick_rate_hz: u32,
    pub render_rate_hz: u32,
    pub max_ticks_per_frame: u32,
    pub frame_floor_ms: u32,
    pub clear_color: Color4,
    pub time_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            fullscreen: false,
            tick_rate_hz: 60,
            render_rate_hz: 60,
            max_ticks_per_frame: 5,
            frame_floor_ms: 1,
            clear_color: Color4::BLACK,
            time_scale: 1.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A line of the config file that could not be taken as written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("line {line}: expected key=value")]
    MalformedLine { line: usize },
    #[error("line {line}: unknown key '{key}'")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: '{value}' is not a valid value for '{key}'; using default")]
    InvalidValue {
        line: usize,
        key: &'static str,
        value: String,
    },
    #[error("line {line}: {key}={value} outside {min}..={max}; clamped")]
    OutOfRange {
        line: usize,
        key: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    pub config: EngineConfig,
    pub issues: Vec<ConfigIssue>,
}

impl EngineConfig {
    /// Parses `key=value` lines. Blank lines and `#` comments are skipped.
    /// Never fails: every problem is reported and resolved to a usable value.
    pub fn parse(text: &str) -> ParsedConfig {
        let mut config = Self::default();
        let mut issues = Vec::new();

        for (index, raw_line) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                issues.push(ConfigIssue::MalformedLine { line });
                continue;
            };
            let mut field = FieldParser {
                line,
                value: value.trim(),
                issues: &mut issues,
            };
            match key.trim() {
                "window_width" => {
                    field.int("window_width", WINDOW_WIDTH_RANGE, &mut config.window_width)
                }
                "window_height" => {
                    field.int("window_height", WINDOW_HEIGHT_RANGE, &mut config.window_height)
                }
                "fullscreen" => field.bool("fullscreen", &mut config.fullscreen),
                "tick_rate_hz" => {
                    field.int("tick_rate_hz", TICK_RATE_RANGE, &mut config.tick_rate_hz)
                }
                "render_rate_hz" => {
                    field.int("render_rate_hz", TICK_RATE_RANGE, &mut config.render_rate_hz)
                }
                "max_ticks_per_frame" => field.int(
                    "max_ticks_per_frame",
                    MAX_TICKS_RANGE,
                    &mut config.max_ticks_per_frame,
                ),
                "frame_floor_ms" => {
                    field.int("frame_floor_ms", FRAME_FLOOR_RANGE, &mut config.frame_floor_ms)
                }
                "clear_r" => field.channel("clear_r", &mut config.clear_color.r),
                "clear_g" => field.channel("clear_g", &mut config.clear_color.g),
                "clear_b" => field.channel("clear_b", &mut config.clear_color.b),
                "time_scale" => {
                    field.float("time_scale", TIME_SCALE_RANGE, &mut config.time_scale)
                }
                other => issues.push(ConfigIssue::UnknownKey {
                    line,
                    key: other.to_string(),
                }),
            }
        }

        ParsedConfig { config, issues }
    }

    pub fn to_file_text(&self) -> String {
        let mut text = String::from("# engine settings, key=value\n");
        let _ = writeln!(text, "window_width={}", self.window_width);
        let _ = writeln!(text, "window_height={}", self.window_height);
        let _ = writeln!(text, "fullscreen={}", self.fullscreen);
        let _ = writeln!(text, "tick_rate_hz={}", self.tick_rate_hz);
        let _ = writeln!(text, "render_rate_hz={}", self.render_rate_hz);
        let _ = writeln!(text, "max_ticks_per_frame={}", self.max_ticks_per_frame);
        let _ = writeln!(text, "frame_floor_ms={}", self.frame_floor_ms);
        let _ = writeln!(text, "clear_r={}", self.clear_color.r);
        let _ = writeln!(text, "clear_g={}", self.clear_color.g);
        let _ = writeln!(text, "clear_b={}", self.clear_color.b);
        let _ = writeln!(text, "time_scale={}", self.time_scale);
        text
    }

    /// Reads `path`, falling back per key to defaults. A missing file, or one
    /// with any issue, is rewritten with the resolved values.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(source) if source.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let Some(text) = text else {
            let config = Self::default();
            write_text_atomic(path, &config.to_file_text()).map_err(|source| {
                ConfigError::Write {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            info!(path = %path.display(), "config_created_with_defaults");
            return Ok(config);
        };

        let parsed = Self::parse(&text);
        for issue in &parsed.issues {
            warn!(path = %path.display(), issue = %issue, "config_value_rejected");
        }
        if !parsed.issues.is_empty() {
            write_text_atomic(path, &parsed.config.to_file_text()).map_err(|source| {
                ConfigError::Write {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            info!(
                path = %path.display(),
                issue_count = parsed.issues.len(),
                "config_rewritten"
            );
        }
        Ok(parsed.config)
    }

    pub fn frame_floor(&self) -> Duration {
        Duration::from_millis(u64::from(self.frame_floor_ms))
    }
}

struct FieldParser<'a> {
    line: usize,
    value: &'a str,
    issues: &'a mut Vec<ConfigIssue>,
}

impl FieldParser<'_> {
    fn int(&mut self, key: &'static str, (min, max): (u32, u32), slot: &mut u32) {
        let Ok(parsed) = self.value.parse::<i64>() else {
            self.invalid(key);
            return;
        };
        let clamped = parsed.clamp(i64::from(min), i64::from(max));
        if clamped != parsed {
            self.out_of_range(key, min.to_string(), max.to_string());
        }
        *slot = clamped as u32;
    }

    fn channel(&mut self, key: &'static str, slot: &mut u8) {
        let mut wide = u32::from(*slot);
        self.int(key, COLOR_CHANNEL_RANGE, &mut wide);
        *slot = wide as u8;
    }

    fn float(&mut self, key: &'static str, (min, max): (f32, f32), slot: &mut f32) {
        let parsed = match self.value.parse::<f32>() {
            Ok(parsed) if parsed.is_finite() => parsed,
            _ => {
                self.invalid(key);
                return;
            }
        };
        let clamped = parsed.clamp(min, max);
        if clamped != parsed {
            self.out_of_range(key, min.to_string(), max.to_string());
        }
        *slot = clamped;
    }

    fn bool(&mut self, key: &'static str, slot: &mut bool) {
        match self.value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => *slot = true,
            "false" | "0" | "no" | "off" => *slot = false,
            _ => self.invalid(key),
        }
    }

    fn invalid(&mut self, key: &'static str) {
        self.issues.push(ConfigIssue::InvalidValue {
            line: self.line,
            key,
            value: self.value.to_string(),
        });
    }

    fn out_of_range(&mut self, key: &'static str, min: String, max: String) {
        self.issues.push(ConfigIssue::OutOfRange {
            line: self.line,
            key,
            value: self.value.to_string(),
            min,
            max,
        });
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("cfg.tmp");
    fs::write(&tmp_path, text)?;
    // rename replaces an existing target in one step, so readers see either file.
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn atomic_write_replaces_existing_file_without_leftovers() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "window_width=640\n").expect("seed");

        write_text_atomic(&path, "window_width=1024\n").expect("replace");

        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "window_width=1024\n"
        );
        assert!(!path.with_extension("cfg.tmp").exists());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);

        let config = EngineConfig::load_or_default(&path).expect("config");

        assert_eq!(config, EngineConfig::default());
        let written = fs::read_to_string(&path).expect("written");
        assert!(written.contains("tick_rate_hz=60"));
        assert_eq!(EngineConfig::parse(&written).issues, Vec::new());
    }

    #[test]
    fn valid_file_is_read_and_left_alone() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        let text = "# custom\nwindow_width=1024\n\ntick_rate_hz=120\nclear_b=40\ntime_scale=0.5\n";
        fs::write(&path, text).expect("write");

        let config = EngineConfig::load_or_default(&path).expect("config");

        assert_eq!(config.window_width, 1024);
        assert_eq!(config.tick_rate_hz, 120);
        assert_eq!(config.clear_color, Color4::rgb(0, 0, 40));
        assert!((config.time_scale - 0.5).abs() < f32::EPSILON);
        assert_eq!(fs::read_to_string(&path).expect("read"), text);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let parsed =
            EngineConfig::parse("tick_rate_hz=5000\nmax_ticks_per_frame=0\ntime_scale=42\n");

        assert_eq!(parsed.config.tick_rate_hz, 1000);
        assert_eq!(parsed.config.max_ticks_per_frame, 1);
        assert!((parsed.config.time_scale - 10.0).abs() < f32::EPSILON);
        assert_eq!(parsed.issues.len(), 3);
        assert!(matches!(
            parsed.issues[0],
            ConfigIssue::OutOfRange {
                line: 1,
                key: "tick_rate_hz",
                ..
            }
        ));
    }

    #[test]
    fn unparseable_values_keep_defaults() {
        let parsed =
            EngineConfig::parse("window_height=tall\nfullscreen=maybe\nnonsense\nvsync=1\n");

        assert_eq!(parsed.config, EngineConfig::default());
        assert_eq!(
            parsed.issues,
            vec![
                ConfigIssue::InvalidValue {
                    line: 1,
                    key: "window_height",
                    value: "tall".to_string(),
                },
                ConfigIssue::InvalidValue {
                    line: 2,
                    key: "fullscreen",
                    value: "maybe".to_string(),
                },
                ConfigIssue::MalformedLine { line: 3 },
                ConfigIssue::UnknownKey {
                    line: 4,
                    key: "vsync".to_string(),
                },
            ]
        );
    }

    #[test]
    fn invalid_file_is_rewritten_with_resolved_values() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "fullscreen=true\nframe_floor_ms=-3\n").expect("write");

        let config = EngineConfig::load_or_default(&path).expect("config");

        assert!(config.fullscreen);
        assert_eq!(config.frame_floor_ms, 0);
        let rewritten = EngineConfig::parse(&fs::read_to_string(&path).expect("read"));
        assert!(rewritten.issues.is_empty());
        assert_eq!(rewritten.config, config);
    }

    #[test]
    fn derived_durations_follow_the_settings() {
        let config = EngineConfig {
            frame_floor_ms: 4,
            ..EngineConfig::default()
        };
        assert_eq!(config.frame_floor(), Duration::from_millis(4));
    }
}
