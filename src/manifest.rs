//! Conversion defaults (palspr.yaml) parsing.
//!
//! Every field is optional. Command line flags override manifest values,
//! which override the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dither::DiffusionKernel;
use crate::encode::SpriteFormat;
use crate::error::{Result, SprError};

/// File looked up in the working directory when no manifest is given.
pub const MANIFEST_FILENAME: &str = "palspr.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Output format name (RAW, BMP, HSPR, SSPR, SSPR2, JSPR, JSPR2).
    pub format: Option<String>,

    /// Diffusion kernel name.
    pub kernel: Option<String>,

    /// Dither level, 0 to 100.
    pub level: Option<i32>,

    /// Palette file; relative paths are resolved against the manifest's directory.
    pub palette: Option<PathBuf>,

    /// Largest channel value stored in the palette file.
    pub range: Option<u8>,

    /// Alpha below this is transparent.
    pub threshold: Option<u8>,

    /// Number of colours the palette must hold.
    pub colors: Option<usize>,
}

impl Manifest {
    /// Load a manifest from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SprError::CannotOpen {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        let mut manifest = Self::parse(&content)?;
        if let (Some(palette), Some(dir)) = (&manifest.palette, path.parent()) {
            if palette.is_relative() {
                manifest.palette = Some(dir.join(palette));
            }
        }
        Ok(manifest)
    }

    /// Parse a manifest from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| SprError::BadFormat {
            message: format!("Invalid manifest: {}", e),
            help: Some(format!("Check {} syntax", MANIFEST_FILENAME)),
        })
    }

    /// Load `explicit` if given, else `palspr.yaml` from `dir` if present.
    pub fn find(explicit: Option<&Path>, dir: &Path) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }
        let path = dir.join(MANIFEST_FILENAME);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn sprite_format(&self) -> Result<Option<SpriteFormat>> {
        self.format.as_deref().map(str::parse::<SpriteFormat>).transpose()
    }

    pub fn diffusion_kernel(&self) -> Result<Option<DiffusionKernel>> {
        self.kernel.as_deref().map(str::parse::<DiffusionKernel>).transpose()
    }
}
