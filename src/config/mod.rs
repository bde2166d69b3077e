use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::locator::SearchPlan;

const LOCAL_CONFIG: &str = "harvester.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WebDriver session settings
    pub webdriver: WebDriverConfig,

    /// Settle and pacing durations
    pub timings: Timings,

    /// Dataset column names
    pub dataset: DatasetConfig,

    /// Descriptor list overrides; the built-in plan is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectors: Option<SearchPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// WebDriver server endpoint
    pub url: String,

    /// Run the browser without a window
    pub headless: bool,

    /// Window size passed to the browser, "width,height"
    pub window_size: String,

    /// Extra browser command line arguments
    pub browser_args: Vec<String>,

    /// Interval between condition checks while waiting
    pub poll_interval_ms: u64,
}

/// All durations are milliseconds, `scroll_offset` is pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub ready_timeout: u64,
    pub render_settle: u64,
    pub scroll_offset: i64,
    pub scroll_settle: u64,
    pub activation_settle: u64,
    pub menu_settle: u64,
    pub segment_settle: u64,
    pub row_delay: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Column holding the page URL
    pub url_column: String,

    /// Column receiving the transcript or error cell
    pub transcript_column: String,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4444".to_string(),
            headless: true,
            window_size: "1920,1080".to_string(),
            browser_args: Vec::new(),
            poll_interval_ms: 250,
        }
    }
}

impl WebDriverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            ready_timeout: 10_000,
            render_settle: 2_000,
            scroll_offset: 500,
            scroll_settle: 2_000,
            activation_settle: 1_000,
            menu_settle: 2_000,
            segment_settle: 2_000,
            row_delay: 2_000,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url_column: "YouTube URL".to_string(),
            transcript_column: "Transcript".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the working directory or the
    /// user config directory, falling back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };

        let config = match path {
            Some(path) if path.exists() || explicit.is_some() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        serde_yaml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn discover() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            return Some(local_config);
        }
        Self::default_path().ok()
    }

    /// Get configuration file path in the user config directory
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-harvester").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.webdriver.url)
            .with_context(|| format!("Invalid WebDriver URL: {}", self.webdriver.url))?;

        if self.dataset.url_column.trim().is_empty() {
            anyhow::bail!("dataset.url_column must not be empty");
        }
        if self.dataset.transcript_column.trim().is_empty() {
            anyhow::bail!("dataset.transcript_column must not be empty");
        }
        if self.dataset.url_column == self.dataset.transcript_column {
            anyhow::bail!("dataset.url_column and dataset.transcript_column must differ");
        }
        if let Some(plan) = &self.selectors {
            if plan.reveal.is_empty() {
                anyhow::bail!("selectors.reveal must contain at least one strategy");
            }
        }

        Ok(())
    }

    /// The descriptor lists for this run
    pub fn search_plan(&self) -> SearchPlan {
        self.selectors.clone().unwrap_or_default()
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  WebDriver URL: {}", self.webdriver.url);
        println!("  Headless: {}", self.webdriver.headless);
        println!("  URL Column: {}", self.dataset.url_column);
        println!("  Transcript Column: {}", self.dataset.transcript_column);
        println!("  Row Delay: {} ms", self.timings.row_delay);
        println!(
            "  Selectors: {}",
            if self.selectors.is_some() { "custom" } else { "built-in" }
        );
    }
}
