use anyhow::{Context, Result};
use peptofit_core::settings::RecommenderSettings;
use peptofit_schemas::{
    file_formats::{PeptoneFile, StrainFile},
    peptone::Peptone,
    strain::Strain,
};
use serde::de::DeserializeOwned;
use std::{fs, path::Path};

/// Everything read from a catalog directory for one run.
pub struct Catalog {
    pub strains: Vec<Strain>,
    pub peptones: Vec<Peptone>,
    pub settings: RecommenderSettings,
}

impl Catalog {
    /// Loads `strains/*.yaml`, `peptones/*.yaml`, and `settings.yaml` from `base_path`.
    pub fn load(base_path: &Path) -> Result<Self> {
        tracing::info!(path = %base_path.display(), "loading catalog");

        let strains = load_yaml_files(base_path.join("strains"), |file: StrainFile| file.strains)?;
        let peptones = load_yaml_files(base_path.join("peptones"), |file: PeptoneFile| file.peptones)?;
        let settings = load_settings(&base_path.join("settings.yaml"))?;

        tracing::info!(
            strains = strains.len(),
            peptones = peptones.len(),
            "catalog loaded"
        );
        Ok(Self {
            strains,
            peptones,
            settings,
        })
    }
}

/// Reads the settings file; a missing file means defaults.
pub fn load_settings(path: &Path) -> Result<RecommenderSettings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(RecommenderSettings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse settings from {:?}", path))
}

/// Loads every YAML file in a directory, in file-name order, and concatenates the items each
/// file wrapper holds.
fn load_yaml_files<P, F, E, T>(dir_path: P, extract_vec: E) -> Result<Vec<T>>
where
    P: AsRef<Path>,
    F: DeserializeOwned,
    E: Fn(F) -> Vec<T>,
{
    let dir_path = dir_path.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path)
        .with_context(|| format!("Failed to read directory: {:?}", dir_path))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|s| s == "yaml" || s == "yml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let file_wrapper: F = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;
        items.extend(extract_vec(file_wrapper));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::{level::Level, strain::StrainCategory};

    const STRAINS: &str = r#"
schema_version: "1.0"
strains:
  - strain_id: KCTC 3108
    genus: Lactobacillus
    species: plantarum
  - strain_id: "KCCM 1*"
    genus: Saccharomyces
    species: cerevisiae
"#;

    const PEPTONES: &str = r#"
schema_version: "1.0"
peptones:
  - peptone_id: SP-SOY-01
    name: Soy Peptone S1
    raw_material: soy
    manufacturer: Sempio
    composition:
      general:
        total_nitrogen: 78.5
        amino_nitrogen: N.D
"#;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn loads_catalog_with_default_settings() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join("strains"), "lab.yaml", STRAINS);
        write(&tmp.path().join("peptones"), "sempio.yml", PEPTONES);
        write(&tmp.path().join("peptones"), "README.txt", "ignored");

        let catalog = Catalog::load(tmp.path()).unwrap();
        assert_eq!(catalog.strains.len(), 2);
        assert_eq!(catalog.strains[0].category, StrainCategory::LacticAcidBacteria);
        assert!(catalog.strains[1].confidential);
        assert_eq!(catalog.peptones.len(), 1);
        assert_eq!(catalog.peptones[0].composition.general.amino_nitrogen, Level::Unknown);
        assert_eq!(catalog.settings, RecommenderSettings::default());
    }

    #[test]
    fn settings_file_overrides_selected_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.yaml");
        fs::write(&path, "shortlist_size: 10\nmin_ratio: 0.05\n").unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.shortlist_size, 10);
        assert_eq!(settings.min_ratio, 0.05);
        assert_eq!(settings.max_ratio, RecommenderSettings::default().max_ratio);
    }

    #[test]
    fn malformed_yaml_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join("strains"), "bad.yaml", "strains: [unterminated");
        write(&tmp.path().join("peptones"), "ok.yaml", PEPTONES);
        let err = Catalog::load(tmp.path()).err().unwrap();
        assert!(format!("{:#}", err).contains("bad.yaml"));
    }
}
