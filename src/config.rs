// src/config.rs

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::{PipelineError, Result};
use crate::schema::TableSchema;

/// Where the source tables live and which of their columns matter.
///
/// Every field has a default, so an empty YAML document (or no config file
/// at all) reproduces the stock dataset layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub crime: CrimeSourceConfig,
    pub victims: VictimSourceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrimeSourceConfig {
    /// File paths or glob patterns, loaded in this order.
    pub sources: Vec<String>,
    pub state_column: String,
    pub district_column: String,
    pub year_column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VictimSourceConfig {
    pub sources: Vec<String>,
    pub state_column: String,
    pub subgroup_column: String,
    pub year_column: String,
    pub reported_column: String,
    pub age_bands: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CrimeSourceConfig {
    fn default() -> Self {
        Self {
            sources: strings(&[
                "data/01_District_wise_crimes_committed_IPC_2013.csv",
                "data/01_District_wise_crimes_committed_IPC_2014.csv",
            ]),
            state_column: "States/UTs".into(),
            district_column: "District".into(),
            year_column: "Year".into(),
            categories: strings(&[
                "Murder",
                "Rape",
                "KIDNAPPING & ABDUCTION",
                "Arson",
                "Grievous Hurt",
            ]),
        }
    }
}

impl Default for VictimSourceConfig {
    fn default() -> Self {
        Self {
            sources: strings(&["data/20_Victims_of_rape.csv"]),
            state_column: "Area_Name".into(),
            subgroup_column: "Subgroup".into(),
            year_column: "Year".into(),
            reported_column: "Rape_Cases_Reported".into(),
            age_bands: strings(&[
                "Victims_Above_50_Yrs",
                "Victims_Between_10-14_Yrs",
                "Victims_Between_14-18_Yrs",
                "Victims_Between_18-30_Yrs",
                "Victims_Between_30-50_Yrs",
                "Victims_Upto_10_Yrs",
            ]),
        }
    }
}

impl CrimeSourceConfig {
    pub fn schema(&self) -> TableSchema {
        TableSchema {
            name: "crime".into(),
            region_column: self.state_column.clone(),
            group_column: self.district_column.clone(),
            year_column: self.year_column.clone(),
            count_columns: self.categories.clone(),
        }
    }
}

impl VictimSourceConfig {
    /// Reported cases first, then the age bands.
    pub fn schema(&self) -> TableSchema {
        let mut count_columns = Vec::with_capacity(1 + self.age_bands.len());
        count_columns.push(self.reported_column.clone());
        count_columns.extend(self.age_bands.iter().cloned());
        TableSchema {
            name: "victims".into(),
            region_column: self.state_column.clone(),
            group_column: self.subgroup_column.clone(),
            year_column: self.year_column.clone(),
            count_columns,
        }
    }
}

impl DataConfig {
    /// Parse a YAML config file and validate it.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            PipelineError::Config(msg) => {
                PipelineError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // an empty document deserializes to unit, not to a map
        let cfg: DataConfig = if text.trim().is_empty() {
            DataConfig::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.crime.schema().validate()?;
        if self.victims.age_bands.is_empty() {
            return Err(PipelineError::Config(
                "victims.age_bands must name at least one column".into(),
            ));
        }
        self.victims.schema().validate()
    }
}
