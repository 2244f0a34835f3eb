use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::difficulty::Difficulty;
use crate::normalize::normalize_guess;

const EMBEDDED_CITIES: &str = include_str!("../data/cities.dk.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub population: u64,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read city list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid city list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate city name: {0}")]
    DuplicateName(String),
}

/// The static list of cities the quiz draws from, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CityCatalog {
    cities: Vec<City>,
}

impl CityCatalog {
    pub fn new(mut cities: Vec<City>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(cities.len());
        for city in &cities {
            if !seen.insert(city.name.as_str()) {
                return Err(CatalogError::DuplicateName(city.name.clone()));
            }
        }
        cities.sort_by(|a, b| b.population.cmp(&a.population));
        Ok(Self { cities })
    }

    /// The Danish city list compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CITIES)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// Cities whose population falls in the tier's range, largest first.
    pub fn pool(&self, difficulty: Difficulty) -> Vec<&City> {
        self.cities
            .iter()
            .filter(|c| difficulty.contains(c.population))
            .collect()
    }

    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cities.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }

    /// Autocomplete candidates whose folded name contains the folded query.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = normalize_guess(query);
        if needle.is_empty() {
            return Vec::new();
        }
        self.available_names()
            .into_iter()
            .filter(|name| normalize_guess(name).contains(&needle))
            .take(limit)
            .collect()
    }
}
