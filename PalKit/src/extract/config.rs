//! Extraction settings (`palkit.toml`)
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock setup: the four playable characters' battle sprites, read from
//! `assets/sprites` and written to `battle-demo/images/sprites`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compression::{Decompressor, ScriptDecompressor};
use crate::converter::{Rasterizer, RleRasterizer, ScriptRasterizer};
use crate::error::Result;

fn default_input_dir() -> PathBuf {
    PathBuf::from("assets/sprites")
}

fn default_palette_dir() -> PathBuf {
    PathBuf::from("PAL")
}

fn default_palette_file() -> String {
    "PAT.MKF".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("battle-demo/images/sprites")
}

fn default_characters() -> Vec<CharacterEntry> {
    [
        ("sss0.sss", "xiaoyao"),
        ("sss1.sss", "linger"),
        ("sss2.sss", "yueru"),
        ("sss3.sss", "anuanu"),
    ]
    .into_iter()
    .map(|(archive, label)| CharacterEntry::new(archive, label))
    .collect()
}

fn default_python() -> PathBuf {
    PathBuf::from("python3")
}

fn default_deyj1() -> PathBuf {
    PathBuf::from("palresearch/PackageUtils/deyj1.py")
}

fn default_derle() -> PathBuf {
    PathBuf::from("palresearch/PackageUtils/derle.py")
}

fn default_pallib() -> PathBuf {
    PathBuf::from(format!(
        "palresearch/PalLibrary/{}pallib{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    ))
}

fn default_raster_timeout_secs() -> u64 {
    10
}

fn default_decompress_timeout_secs() -> u64 {
    60
}

/// An archive file and the character it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    /// File name inside the input directory.
    pub archive: String,
    /// Label used for output file names.
    pub label: String,
}

impl CharacterEntry {
    /// Create a new entry.
    pub fn new(archive: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            label: label.into(),
        }
    }
}

/// Which `YJ_1` backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompressorKind {
    /// `python3 deyj1.py IN -o OUT`
    #[default]
    Script,
    /// `decodeyj1` from a dynamic library (feature `native-yj1`)
    Native,
}

/// Which frame rasterizer to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterizerKind {
    /// `python3 derle.py IN -o OUT -p PALETTE`
    #[default]
    Script,
    /// In-process RLE decoder
    Builtin,
}

/// Locations of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    #[serde(default = "default_python")]
    pub python: PathBuf,
    #[serde(default = "default_deyj1")]
    pub deyj1: PathBuf,
    #[serde(default = "default_derle")]
    pub derle: PathBuf,
    #[serde(default = "default_pallib")]
    pub pallib: PathBuf,
    #[serde(default = "default_raster_timeout_secs")]
    pub raster_timeout_secs: u64,
    #[serde(default = "default_decompress_timeout_secs")]
    pub decompress_timeout_secs: u64,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            python: default_python(),
            deyj1: default_deyj1(),
            derle: default_derle(),
            pallib: default_pallib(),
            raster_timeout_secs: default_raster_timeout_secs(),
            decompress_timeout_secs: default_decompress_timeout_secs(),
        }
    }
}

/// Full extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_palette_dir")]
    pub palette_dir: PathBuf,
    #[serde(default = "default_palette_file")]
    pub palette_file: String,
    #[serde(default)]
    pub palette_index: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub decompressor: DecompressorKind,
    #[serde(default)]
    pub rasterizer: RasterizerKind,
    #[serde(default)]
    pub tools: ToolPaths,
    #[serde(default = "default_characters")]
    pub characters: Vec<CharacterEntry>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            palette_dir: default_palette_dir(),
            palette_file: default_palette_file(),
            palette_index: 0,
            output_dir: default_output_dir(),
            decompressor: DecompressorKind::default(),
            rasterizer: RasterizerKind::default(),
            tools: ToolPaths::default(),
            characters: default_characters(),
        }
    }
}

impl ExtractConfig {
    /// Read a TOML config file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&text)?)
    }

    /// Load `path` if given, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// See [`ExtractConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Full path of a character's archive.
    #[must_use]
    pub fn archive_path(&self, entry: &CharacterEntry) -> PathBuf {
        self.input_dir.join(&entry.archive)
    }

    /// Full path of the palette resource handed to the rasterizer.
    #[must_use]
    pub fn palette_path(&self) -> PathBuf {
        self.palette_dir.join(&self.palette_file)
    }

    /// Per-conversion timeout for the script rasterizer.
    #[must_use]
    pub fn raster_timeout(&self) -> Duration {
        Duration::from_secs(self.tools.raster_timeout_secs)
    }

    /// Time the decompressor script may take for one archive.
    #[must_use]
    pub fn decompress_timeout(&self) -> Duration {
        Duration::from_secs(self.tools.decompress_timeout_secs)
    }

    /// Instantiate the configured decompressor.
    ///
    /// # Errors
    ///
    /// Returns an error if the native library cannot be loaded, or if the
    /// native backend is selected in a build without `native-yj1`.
    pub fn build_decompressor(&self) -> Result<Box<dyn Decompressor>> {
        match self.decompressor {
            DecompressorKind::Script => Ok(Box::new(
                ScriptDecompressor::new(&self.tools.python, &self.tools.deyj1)
                    .with_timeout(self.decompress_timeout()),
            )),
            #[cfg(feature = "native-yj1")]
            DecompressorKind::Native => Ok(Box::new(
                crate::compression::NativeDecompressor::load(&self.tools.pallib)?,
            )),
            #[cfg(not(feature = "native-yj1"))]
            DecompressorKind::Native => Err(crate::error::Error::NativeLibrary {
                path: self.tools.pallib.clone(),
                message: "palkit was built without the `native-yj1` feature".to_string(),
            }),
        }
    }

    /// Instantiate the configured rasterizer.
    #[must_use]
    pub fn build_rasterizer(&self) -> Box<dyn Rasterizer> {
        match self.rasterizer {
            RasterizerKind::Script => Box::new(
                ScriptRasterizer::new(&self.tools.python, &self.tools.derle)
                    .with_timeout(self.raster_timeout()),
            ),
            RasterizerKind::Builtin => Box::new(RleRasterizer::new(self.palette_index)),
        }
    }
}
