//! Session state shared between imports.
//!
//! Holds the reference point the first import pinned, so later imports
//! land in the same planar frame.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path};
use terrain::Anchor;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Session {
    /// Reads the session at `path`, or returns an empty one if there
    /// is no such file.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(raw) => serde_json::from_slice(&raw)
                .with_context(|| format!("parsing session {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading session {}", path.display())),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_vec_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing session {}", path.display()))
    }

    /// Returns the session's anchor, if both coordinates are set.
    pub fn anchor(&self, scale: Option<f64>) -> Result<Option<Anchor>> {
        let (Some(lat), Some(lon)) = (self.latitude, self.longitude) else {
            return Ok(None);
        };
        let mut anchor = Anchor::new(lat, lon)?;
        if let Some(scale) = scale {
            anchor = anchor.with_scale(scale)?;
        }
        Ok(Some(anchor))
    }

    /// Records `anchor` unless the session already has one. Returns
    /// `true` if the session changed.
    pub fn pin(&mut self, anchor: &Anchor) -> bool {
        if self.latitude.is_some() && self.longitude.is_some() {
            return false;
        }
        self.latitude = Some(anchor.lat());
        self.longitude = Some(anchor.lon());
        true
    }
}
