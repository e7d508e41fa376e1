// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Case pages live at `<ABP_BASE_URL><case id>`.
const ABP_BASE_URL: &str = "https://www.pleanala.ie/en-ie/case/";

/// Runtime configuration: where output goes, which cases to scrape, and how
/// to expand project acronyms into display names. A built-in default covers
/// the known public-transport cases; a YAML file with the same shape can
/// override any of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub outputs_dir: PathBuf,
    pub chart_file: String,
    pub base_url: String,
    /// infrastructure type → (project short name → ABP case id)
    pub projects: BTreeMap<String, BTreeMap<String, u32>>,
    /// acronym → full project name, applied as substring replacement
    pub acronyms: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let rail: BTreeMap<String, u32> = [
            ("Metrolink", 314724),
            ("Dart+ West", 314232),
            ("Dart+ South West", 316119),
            ("GMTT", 315087),
            ("DCLC", 310286),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect();

        let bus: BTreeMap<String, u32> = [
            ("BCD 1", 313182),
            ("BCD 2", 317121),
            ("BCD 3/4", 314610),
            ("BCD 5", 313892),
            ("BCD 6", 314942),
            ("BCD 7", 314056),
            ("BCD 8/9", 316828),
            ("BCD 10/12", 316272),
            ("BCD 11", 317660),
            ("BCD 13", 317742),
            ("BCD 14/15", 313509),
            ("BCD 16", 317679),
            ("BCG CCL", 314597),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect();

        let projects = [("Rail".to_string(), rail), ("Bus".to_string(), bus)]
            .into_iter()
            .collect();

        let acronyms = [
            ("BCD", "Bus Connects Dublin Core Bus Corridor"),
            ("BCG CCL", "Bus Connects Galway Cross-City Link"),
            ("GMTT", "Glounthaune to Midleton Twin Tracking"),
            ("DCLC", "Dublin-Cork Line Level Crossing Closures"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            outputs_dir: PathBuf::from("results"),
            chart_file: "time_taken.png".to_string(),
            base_url: ABP_BASE_URL.to_string(),
            projects,
            acronyms,
        }
    }
}

impl Config {
    /// Load a YAML config file. Fields left out fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {:?}", path))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config file {:?}", path))
    }

    /// Build the case-page URL for an ABP case id.
    pub fn case_url(&self, case_id: u32) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("invalid base URL {:?}", self.base_url))?;
        base.join(&case_id.to_string())
            .with_context(|| format!("building case URL for {}", case_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_known_projects() {
        let config = Config::default();
        assert_eq!(config.projects["Rail"].len(), 5);
        assert_eq!(config.projects["Bus"].len(), 13);
        assert_eq!(config.projects["Rail"]["Metrolink"], 314724);
        assert_eq!(config.acronyms.len(), 4);
    }

    #[test]
    fn case_url_joins_id_onto_base() {
        let config = Config::default();
        let url = config.case_url(314724).unwrap();
        assert_eq!(url.as_str(), "https://www.pleanala.ie/en-ie/case/314724");
    }

    #[test]
    fn yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.projects, config.projects);
        assert_eq!(back.acronyms, config.acronyms);
        assert_eq!(back.base_url, config.base_url);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: Config = serde_yaml::from_str("outputs_dir: /tmp/out\n").unwrap();
        assert_eq!(config.outputs_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.base_url, ABP_BASE_URL);
        assert!(!config.projects.is_empty());
    }
}
