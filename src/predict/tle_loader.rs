use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sgp4::Elements;

use crate::predict::error::PredictError;
use crate::predict::propagation::OrbitalState;
use crate::predict::types::SatelliteInfo;

pub struct TleEntry {
    pub info: SatelliteInfo,
    pub elements: Elements,
}

impl TleEntry {
    /// Fails when SGP4 cannot initialise from these elements.
    pub fn orbital_state(&self) -> Result<OrbitalState, PredictError> {
        OrbitalState::from_elements(self.elements.clone())
    }
}

pub struct TleLoader {
    tle_dir: PathBuf,
    satellites: BTreeMap<u32, TleEntry>,
}

impl TleLoader {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self {
            tle_dir,
            satellites: BTreeMap::new(),
        }
    }

    pub fn tle_dir(&self) -> &Path {
        &self.tle_dir
    }

    /// Load all TLE files from the directory
    pub fn load_all(&mut self) -> Result<(), PredictError> {
        if !self.tle_dir.is_dir() {
            return Err(PredictError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        self.satellites.clear();

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.tle_dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .is_some_and(|ext| ext == "tle" || ext == "txt");
            if path.is_file() && is_tle {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match parse_tle_file(&path) {
                Ok(entries) => {
                    for tle_entry in entries {
                        self.satellites.insert(tle_entry.info.norad_id, tle_entry);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to read TLE file {}: {}", path.display(), e);
                }
            }
        }

        log::info!(
            "Loaded {} satellites from {}",
            self.satellites.len(),
            self.tle_dir.display()
        );
        Ok(())
    }

    /// Get all loaded satellites, ordered by NORAD id
    pub fn satellites(&self) -> Vec<&TleEntry> {
        self.satellites.values().collect()
    }

    pub fn reload(&mut self) -> Result<(), PredictError> {
        self.load_all()
    }
}

/// Parse a single TLE file (may contain multiple satellites).
/// Records that do not parse are skipped.
fn parse_tle_file(path: &Path) -> Result<Vec<TleEntry>, PredictError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok(parse_tle_entries(&content, &filename))
}

pub fn parse_tle_entries(content: &str, source: &str) -> Vec<TleEntry> {
    let mut results = Vec::new();

    for (name, line1, line2) in parse_multi_tle(content) {
        let elements = match Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
        {
            Ok(e) => e,
            Err(e) => {
                let err = PredictError::InvalidTle {
                    file: source.to_string(),
                    message: e.to_string(),
                };
                log::warn!("Skipping {}: {}", name.as_deref().unwrap_or("record"), err);
                continue;
            }
        };

        let sat_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        results.push(TleEntry {
            info: SatelliteInfo {
                name: sat_name,
                norad_id: elements.norad_id as u32,
                tle_source: source.to_string(),
            },
            elements,
        });
    }

    results
}

/// Split multi-satellite TLE content into (name, line1, line2)
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].trim_start_matches("0 ").trim().to_string();
            result.push((
                Some(name),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
