use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::ConfigError;

/// Discord REST API base URL
const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Prefix in front of every chat command (`!start 30`)
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// User ids allowed to run administrator commands
    #[serde(default)]
    pub admins: Vec<String>,

    #[serde(default)]
    pub debug: bool,
}

fn default_command_prefix() -> String {
    "!".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            command_prefix: default_command_prefix(),
            discord: DiscordConfig::default(),
            canvas: CanvasConfig::default(),
            session: SessionConfig::default(),
            admins: vec![],
            debug: false,
        }
    }
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".study-bot".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: Option<String>,

    /// Channel that receives replies, reminders and Pomodoro notifications
    #[serde(default)]
    pub channel_id: Option<String>,

    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
}

fn default_discord_api_base() -> String {
    DEFAULT_DISCORD_API_BASE.into()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            channel_id: None,
            api_base: default_discord_api_base(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Canvas instance root, e.g. `https://umsystem.instructure.com`
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between break reminders during a regular session
    #[serde(default = "default_max_session_minutes")]
    pub max_session_minutes: u32,

    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,

    #[serde(default = "default_cycles")]
    pub cycles: u32,
}

fn default_max_session_minutes() -> u32 {
    60
}

fn default_work_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

fn default_cycles() -> u32 {
    1
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_session_minutes: default_max_session_minutes(),
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            cycles: default_cycles(),
        }
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig::default();
    config.working_dir = wd.clone();

    // Global config
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("study-bot").join("config.json");
        if global_path.exists() {
            merge_config(&mut config, read_config_file(&global_path)?);
        }
    }

    // Local project config
    let local_path = wd.join("study-bot.json");
    if local_path.exists() {
        merge_config(&mut config, read_config_file(&local_path)?);
    }

    detect_env(&mut config);
    config.validate()?;

    Ok(config)
}

fn read_config_file(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::File(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())))
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.data_dir != default_data_dir() {
        base.data_dir = overlay.data_dir;
    }
    if overlay.command_prefix != default_command_prefix() {
        base.command_prefix = overlay.command_prefix;
    }
    if overlay.discord.token.is_some() {
        base.discord.token = overlay.discord.token;
    }
    if overlay.discord.channel_id.is_some() {
        base.discord.channel_id = overlay.discord.channel_id;
    }
    if overlay.discord.api_base != default_discord_api_base() {
        base.discord.api_base = overlay.discord.api_base;
    }
    if overlay.canvas.api_url.is_some() {
        base.canvas.api_url = overlay.canvas.api_url;
    }
    if overlay.canvas.api_key.is_some() {
        base.canvas.api_key = overlay.canvas.api_key;
    }
    if overlay.session.max_session_minutes != default_max_session_minutes() {
        base.session.max_session_minutes = overlay.session.max_session_minutes;
    }
    if overlay.session.work_minutes != default_work_minutes() {
        base.session.work_minutes = overlay.session.work_minutes;
    }
    if overlay.session.break_minutes != default_break_minutes() {
        base.session.break_minutes = overlay.session.break_minutes;
    }
    if overlay.session.cycles != default_cycles() {
        base.session.cycles = overlay.session.cycles;
    }
    if !overlay.admins.is_empty() {
        base.admins = overlay.admins;
    }
    if overlay.debug {
        base.debug = true;
    }
}

fn detect_env(config: &mut AppConfig) {
    let env_string = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    if let Some(token) = env_string("DISCORD_TOKEN") {
        config.discord.token = Some(token);
    }
    if let Some(channel) = env_string("DISCORD_CHANNEL_ID") {
        config.discord.channel_id = Some(channel);
    }
    if let Some(url) = env_string("CANVAS_API_URL") {
        config.canvas.api_url = Some(url);
    }
    if let Some(key) = env_string("CANVAS_API_KEY") {
        config.canvas.api_key = Some(key);
    }
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }

    pub fn has_discord(&self) -> bool {
        self.discord.token.as_ref().map_or(false, |t| !t.is_empty())
            && self.discord.channel_id.is_some()
    }

    pub fn has_canvas(&self) -> bool {
        self.canvas.api_url.is_some() && self.canvas.api_key.is_some()
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|a| a == user_id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_prefix.is_empty() {
            return Err(ConfigError::Invalid("command_prefix must not be empty".into()));
        }
        match (&self.canvas.api_url, &self.canvas.api_key) {
            (Some(_), None) => return Err(ConfigError::MissingField("canvas.api_key".into())),
            (None, Some(_)) => return Err(ConfigError::MissingField("canvas.api_url".into())),
            _ => {}
        }
        let s = &self.session;
        for (field, value) in [
            ("session.max_session_minutes", s.max_session_minutes),
            ("session.work_minutes", s.work_minutes),
            ("session.break_minutes", s.break_minutes),
            ("session.cycles", s.cycles),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{field} must be positive")));
            }
        }
        Ok(())
    }
}
