//! `duplex.toml` structure and profile conversion.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use duplex_profile::{
    FallbackMap, ModuleFallback, ReservedSymbols, TargetProfile,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Host entry points reserved by default. These are the callback names the
/// host runtime invokes by fixed literal name.
pub const DEFAULT_RESERVED: &[&str] = &[
    "doGet",
    "doPost",
    "onOpen",
    "onEdit",
    "onInstall",
    "onSelectionChange",
    "main",
];

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplexConfig {
    pub shared: SharedConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub host: HostConfig,
}

/// Settings shared by both target pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// The single entry point both compilers consume.
    pub entry: PathBuf,
}

/// Browser (UMD library) target settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "BrowserConfig::default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "BrowserConfig::default_filename")]
    pub filename: String,

    /// Global name of the UMD library.
    #[serde(default = "BrowserConfig::default_library")]
    pub library: String,

    /// Platform module fallback table. Keys are the abstract module
    /// identifiers shared source imports; a BTreeMap keeps conversion
    /// order stable regardless of file order.
    #[serde(default)]
    pub fallback: BTreeMap<String, FallbackSpec>,
}

impl BrowserConfig {
    fn default_out_dir() -> PathBuf {
        PathBuf::from("dist/browser")
    }

    fn default_filename() -> String {
        "bundle.min.js".to_string()
    }

    fn default_library() -> String {
        "Bundle".to_string()
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            out_dir: Self::default_out_dir(),
            filename: Self::default_filename(),
            library: Self::default_library(),
            fallback: BTreeMap::new(),
        }
    }
}

/// Host-script (bare global) target settings. Note there is no fallback
/// table here: shared source is expected to avoid platform modules on
/// this path, and the prescribed remedy for a violation is removing the
/// dependency, not polyfilling it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "HostConfig::default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "HostConfig::default_filename")]
    pub filename: String,

    /// Entry-point names the host invokes by fixed literal name.
    #[serde(default = "HostConfig::default_reserved")]
    pub reserved: Vec<String>,

    /// Host-provided service globals accepted by the environment check.
    #[serde(default)]
    pub globals: Vec<String>,
}

impl HostConfig {
    fn default_out_dir() -> PathBuf {
        PathBuf::from("dist/host")
    }

    fn default_filename() -> String {
        "main.gs".to_string()
    }

    fn default_reserved() -> Vec<String> {
        DEFAULT_RESERVED.iter().map(|s| s.to_string()).collect()
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            out_dir: Self::default_out_dir(),
            filename: Self::default_filename(),
            reserved: Self::default_reserved(),
            globals: Vec::new(),
        }
    }
}

/// One fallback table entry.
///
/// Either a mapping to a substitute implementation, or the string `"off"`
/// marking the module as deliberately disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FallbackSpec {
    Flag(String),
    Polyfill { polyfill: PathBuf },
    Native { native: PathBuf },
}

impl FallbackSpec {
    /// Convert a config entry into a resolver outcome.
    pub fn to_fallback(&self, specifier: &str) -> Result<ModuleFallback> {
        match self {
            FallbackSpec::Polyfill { polyfill } => Ok(ModuleFallback::Polyfill(polyfill.clone())),
            FallbackSpec::Native { native } => Ok(ModuleFallback::Native(native.clone())),
            FallbackSpec::Flag(flag) => match flag.as_str() {
                "off" | "false" | "disabled" => Ok(ModuleFallback::Disabled),
                other => Err(ConfigError::InvalidValue(format!(
                    "fallback '{specifier}': expected a table with 'polyfill' or 'native', \
                     or the string \"off\", got \"{other}\""
                ))),
            },
        }
    }
}

impl DuplexConfig {
    /// Load from an explicit path, or `duplex.toml` in `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => cwd.join(crate::CONFIG_FILE_NAME),
        };
        if !path.is_file() {
            return Err(ConfigError::NotFound(path));
        }
        debug!(path = %path.display(), "loading configuration");

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_str(&contents)
    }

    /// Parse from TOML text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self> {
        let config: DuplexConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Build the browser target profile.
    pub fn browser_profile(&self) -> Result<TargetProfile> {
        let mut fallbacks = FallbackMap::empty();
        for (specifier, spec) in &self.browser.fallback {
            fallbacks.insert(specifier.clone(), spec.to_fallback(specifier)?);
        }
        Ok(TargetProfile::browser(
            self.shared.entry.clone(),
            self.browser.out_dir.clone(),
            self.browser.filename.clone(),
            self.browser.library.clone(),
        )
        .with_fallbacks(fallbacks))
    }

    /// Build the host-script target profile.
    pub fn host_profile(&self) -> Result<TargetProfile> {
        Ok(TargetProfile::host_script(
            self.shared.entry.clone(),
            self.host.out_dir.clone(),
            self.host.filename.clone(),
            ReservedSymbols::new(self.host.reserved.iter().cloned()),
        )
        .with_ambient_globals(self.host.globals.iter().cloned()))
    }
}
