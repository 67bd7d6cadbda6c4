// src/views.rs

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{
    category_totals, group_sums, melt, rows_as_wide, CategoryTotals, LongTable, WideTable,
};
use crate::config::DataConfig;
use crate::danger::DangerAssessment;
use crate::dataset::{Dataset, DatasetRow};
use crate::error::Result;
use crate::process::{expand_sources, load_table};
use crate::victims::{woman_safety_views, WomanSafetyReport};

pub const WELCOME: &str = "Welcome to the Crime Navigator! \
Pick a view and a state (and district) to explore the crime data.";

/// Both source tables, loaded once and never mutated.
///
/// Safe to share across threads; every view borrows it read-only.
#[derive(Debug, Clone)]
pub struct Catalog {
    crime: Dataset,
    victims: Dataset,
    categories: Vec<String>,
    reported_column: String,
    age_bands: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Home,
    CrimeData,
    DangerLevel,
    WomanSafety,
}

/// What the two selectors currently hold. Unset values default to the first
/// available option, the way a dropdown does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub state: Option<String>,
    pub district: Option<String>,
}

impl Selection {
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            district: None,
        }
    }

    pub fn district(state: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            district: Some(district.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrimeDataReport {
    pub state: String,
    pub district: String,
    /// The selected district's rows as loaded.
    pub rows: Vec<DatasetRow>,
    /// Per-category sums for the district, in category order.
    pub totals: CategoryTotals,
    /// Same sums, largest first.
    pub sorted_totals: CategoryTotals,
    /// One row per district of the state.
    pub comparison: WideTable,
    /// The state's rows melted to (district, category, count).
    pub distribution: LongTable,
    /// `distribution` summed per category.
    pub distribution_totals: CategoryTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewReport {
    Home {
        message: String,
        crime_rows: usize,
        victim_rows: usize,
    },
    /// The selection matched nothing; shells show `reason` instead of charts.
    NoData { reason: String },
    CrimeData(CrimeDataReport),
    DangerLevel {
        state: String,
        district: String,
        assessment: DangerAssessment,
        message: String,
    },
    WomanSafety {
        state: String,
        report: WomanSafetyReport,
    },
}

impl Catalog {
    /// Load every configured source. Any load failure aborts.
    pub fn load(config: &DataConfig) -> Result<Self> {
        config.validate()?;
        let crime_paths = expand_sources(&config.crime.sources)?;
        let victim_paths = expand_sources(&config.victims.sources)?;
        info!(
            crime_files = crime_paths.len(),
            victim_files = victim_paths.len(),
            "loading catalog"
        );
        let crime = load_table(&crime_paths, &config.crime.schema())?;
        let victims = load_table(&victim_paths, &config.victims.schema())?;
        Ok(Self::from_parts(crime, victims, config))
    }

    /// Assemble a catalog from already-loaded tables.
    pub fn from_parts(crime: Dataset, victims: Dataset, config: &DataConfig) -> Self {
        Self {
            crime,
            victims,
            categories: config.crime.categories.clone(),
            reported_column: config.victims.reported_column.clone(),
            age_bands: config.victims.age_bands.clone(),
        }
    }

    pub fn crime(&self) -> &Dataset {
        &self.crime
    }

    pub fn victims(&self) -> &Dataset {
        &self.victims
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// States of the crime table, first-seen order.
    pub fn states(&self) -> Vec<String> {
        self.crime.regions()
    }

    /// Districts of `state` only.
    pub fn districts(&self, state: &str) -> Result<Vec<String>> {
        Ok(self.crime.filter_region(state, None)?.groups())
    }

    /// Evaluate one view for one selection.
    ///
    /// Idempotent and side-effect free; an empty selection yields
    /// `ViewReport::NoData`, never an error.
    pub fn render(&self, kind: ViewKind, selection: &Selection) -> Result<ViewReport> {
        debug!(?kind, ?selection, "render view");
        match kind {
            ViewKind::Home => Ok(ViewReport::Home {
                message: WELCOME.to_string(),
                crime_rows: self.crime.num_rows(),
                victim_rows: self.victims.num_rows(),
            }),
            ViewKind::CrimeData => self.crime_data(selection),
            ViewKind::DangerLevel => self.danger_level(selection),
            ViewKind::WomanSafety => self.woman_safety(selection),
        }
    }

    fn crime_data(&self, selection: &Selection) -> Result<ViewReport> {
        let (state, state_rows) = match pick_state(&self.crime, selection)? {
            Ok(picked) => picked,
            Err(no_data) => return Ok(no_data),
        };
        let (district, district_rows) = match pick_district(&state, &state_rows, selection)? {
            Ok(picked) => picked,
            Err(no_data) => return Ok(no_data),
        };

        let totals = category_totals(&district_rows, &self.categories)?;
        let sorted_totals = totals.sorted_desc();
        let comparison = group_sums(&state_rows, &self.categories)?;
        let distribution = melt(
            &rows_as_wide(&state_rows, &self.categories)?,
            "CrimeType",
            "CrimeCount",
        )?;
        let distribution_totals = distribution.totals_by_variable()?;

        Ok(ViewReport::CrimeData(CrimeDataReport {
            state,
            district,
            rows: district_rows.rows(),
            totals,
            sorted_totals,
            comparison,
            distribution,
            distribution_totals,
        }))
    }

    fn danger_level(&self, selection: &Selection) -> Result<ViewReport> {
        let (state, state_rows) = match pick_state(&self.crime, selection)? {
            Ok(picked) => picked,
            Err(no_data) => return Ok(no_data),
        };
        let (district, district_rows) = match pick_district(&state, &state_rows, selection)? {
            Ok(picked) => picked,
            Err(no_data) => return Ok(no_data),
        };

        let assessment = DangerAssessment::assess(&district_rows, &self.categories)?;
        Ok(ViewReport::DangerLevel {
            state,
            district,
            message: assessment.message(),
            assessment,
        })
    }

    fn woman_safety(&self, selection: &Selection) -> Result<ViewReport> {
        let (state, state_rows) = match pick_state(&self.victims, selection)? {
            Ok(picked) => picked,
            Err(no_data) => return Ok(no_data),
        };
        let report = woman_safety_views(&state_rows, &self.reported_column, &self.age_bands)?;
        Ok(ViewReport::WomanSafety { state, report })
    }
}

type Picked = std::result::Result<(String, Dataset), ViewReport>;

/// Resolve the state selector against `data`: the requested state, or the
/// first one present. The inner `Err` is the report to show instead.
fn pick_state(data: &Dataset, selection: &Selection) -> Result<Picked> {
    let state = match &selection.state {
        Some(s) => s.clone(),
        None => match data.regions().into_iter().next() {
            Some(first) => first,
            None => {
                return Ok(Err(ViewReport::NoData {
                    reason: format!("the `{}` table has no rows", data.schema().name),
                }))
            }
        },
    };
    let rows = data.filter_region(&state, None)?;
    if rows.is_empty() {
        return Ok(Err(ViewReport::NoData {
            reason: format!("no data for state `{}`", state),
        }));
    }
    Ok(Ok((state, rows)))
}

/// Resolve the district selector within an already state-filtered table.
fn pick_district(state: &str, state_rows: &Dataset, selection: &Selection) -> Result<Picked> {
    let district = match &selection.district {
        Some(d) => d.clone(),
        None => match state_rows.groups().into_iter().next() {
            Some(first) => first,
            None => {
                return Ok(Err(ViewReport::NoData {
                    reason: format!("no districts for state `{}`", state),
                }))
            }
        },
    };
    let rows = state_rows.filter_region(state, Some(district.as_str()))?;
    if rows.is_empty() {
        return Ok(Err(ViewReport::NoData {
            reason: format!("no data for district `{}` in `{}`", district, state),
        }));
    }
    Ok(Ok((district, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrimeSourceConfig, VictimSourceConfig};
    use crate::danger::DangerTier;
    use crate::error::PipelineError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(body: &str) -> anyhow::Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(body.as_bytes())?;
        Ok(tmp)
    }

    fn config(crime: &[&NamedTempFile], victims: &[&NamedTempFile]) -> DataConfig {
        let path = |f: &&NamedTempFile| f.path().display().to_string();
        DataConfig {
            crime: CrimeSourceConfig {
                sources: crime.iter().map(path).collect(),
                categories: vec!["Murder".into(), "Rape".into()],
                ..CrimeSourceConfig::default()
            },
            victims: VictimSourceConfig {
                sources: victims.iter().map(path).collect(),
                age_bands: vec!["Victims_Upto_10_Yrs".into()],
                ..VictimSourceConfig::default()
            },
        }
    }

    const CRIME: &str = "States/UTs,District,Year,Murder,Rape,Arson\n\
Karnataka,Bengaluru,2013,10,5,9\n\
Karnataka,Mysuru,2013,3,2,9\n";

    const VICTIMS: &str = "Area_Name,Year,Subgroup,Rape_Cases_Reported,Victims_Upto_10_Yrs\n\
Kerala,2010,Total Rape Victims,20,3\n\
Kerala,2011,Total Rape Victims,30,2\n";

    fn catalog() -> anyhow::Result<Catalog> {
        let crime = write_csv(CRIME)?;
        let victims = write_csv(VICTIMS)?;
        Ok(Catalog::load(&config(&[&crime], &[&victims]))?)
    }

    #[test]
    fn end_to_end_state_totals_and_danger() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let karnataka = catalog.crime().filter_region("Karnataka", None)?;
        let totals = category_totals(&karnataka, catalog.categories())?;
        assert_eq!(totals.get("Murder"), Some(13));
        assert_eq!(totals.get("Rape"), Some(7));

        let report = catalog.render(
            ViewKind::DangerLevel,
            &Selection::district("Karnataka", "Bengaluru"),
        )?;
        match report {
            ViewReport::DangerLevel { assessment, .. } => {
                assert_eq!(assessment.total, 15);
                assert_eq!(assessment.tier, DangerTier::Low);
            }
            other => panic!("unexpected report {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn crime_data_defaults_to_first_state_and_district() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let report = catalog.render(ViewKind::CrimeData, &Selection::default())?;
        let ViewReport::CrimeData(data) = report else {
            panic!("expected crime data report");
        };
        assert_eq!(data.state, "Karnataka");
        assert_eq!(data.district, "Bengaluru");
        assert_eq!(data.rows.len(), 1);
        assert_eq!(
            data.sorted_totals.categories().collect::<Vec<_>>(),
            vec!["Murder", "Rape"]
        );
        assert_eq!(data.comparison.rows.len(), 2);
        assert_eq!(data.distribution.rows.len(), 4);
        assert_eq!(data.distribution_totals.get("Murder"), Some(13));
        Ok(())
    }

    #[test]
    fn district_from_another_state_is_no_data() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let report = catalog.render(ViewKind::CrimeData, &Selection::district("Goa", "Mysuru"))?;
        assert!(matches!(report, ViewReport::NoData { .. }));
        assert_eq!(catalog.districts("Goa")?, Vec::<String>::new());
        assert_eq!(catalog.districts("Karnataka")?, vec!["Bengaluru", "Mysuru"]);
        Ok(())
    }

    #[test]
    fn woman_safety_uses_the_victim_table() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let report = catalog.render(ViewKind::WomanSafety, &Selection::default())?;
        let ViewReport::WomanSafety { state, report } = report else {
            panic!("expected woman safety report");
        };
        assert_eq!(state, "Kerala");
        assert_eq!(report.trend.len(), 2);
        assert_eq!(report.demographics.get("Victims_Upto_10_Yrs"), Some(5));
        Ok(())
    }

    #[test]
    fn loading_the_same_file_twice_doubles_every_sum() -> anyhow::Result<()> {
        let crime = write_csv(CRIME)?;
        let victims = write_csv(VICTIMS)?;
        let once = Catalog::load(&config(&[&crime], &[&victims]))?;
        let twice = Catalog::load(&config(&[&crime, &crime], &[&victims]))?;
        let a = category_totals(once.crime(), once.categories())?;
        let b = category_totals(twice.crime(), twice.categories())?;
        for (single, double) in a.iter().zip(b.iter()) {
            assert_eq!(double.count, 2 * single.count);
        }
        assert_eq!(twice.crime().num_rows(), 4);
        Ok(())
    }

    #[test]
    fn filtering_twice_changes_nothing() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let once = catalog.crime().filter_region("Karnataka", None)?;
        let twice = once.filter_region("Karnataka", None)?;
        assert_eq!(
            category_totals(&once, catalog.categories())?,
            category_totals(&twice, catalog.categories())?
        );
        Ok(())
    }

    #[test]
    fn missing_source_aborts_load() -> anyhow::Result<()> {
        let victims = write_csv(VICTIMS)?;
        let mut cfg = config(&[], &[&victims]);
        cfg.crime.sources = vec!["/no/such/crimes.csv".into()];
        assert!(matches!(
            Catalog::load(&cfg),
            Err(PipelineError::Load { .. })
        ));
        Ok(())
    }

    #[test]
    fn empty_catalog_renders_no_data() {
        let cfg = config(&[], &[]);
        let catalog = Catalog::from_parts(
            Dataset::empty(cfg.crime.schema()),
            Dataset::empty(cfg.victims.schema()),
            &cfg,
        );
        for kind in [ViewKind::CrimeData, ViewKind::DangerLevel, ViewKind::WomanSafety] {
            let report = catalog.render(kind, &Selection::default()).unwrap();
            assert!(matches!(report, ViewReport::NoData { .. }));
        }
        let home = catalog.render(ViewKind::Home, &Selection::default()).unwrap();
        assert!(matches!(home, ViewReport::Home { crime_rows: 0, .. }));
    }

    #[test]
    fn reports_serialize_with_a_view_tag() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let report = catalog.render(ViewKind::DangerLevel, &Selection::state("Karnataka"))?;
        let json = serde_json::to_value(&report)?;
        assert_eq!(json["view"], "danger_level");
        assert_eq!(json["assessment"]["tier"], "Low");
        assert_eq!(json["assessment"]["severity"], "success");
        Ok(())
    }
}
