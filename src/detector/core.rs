use crate::data::{Column, ColumnType, Dataset, Source};
use crate::detector::config::DriftConfig;
use crate::drift::calculation::{categorical_drift, continuous_drift};
use crate::drift::stats::ContingencyTable;
use crate::errors::DriftError;
use crate::plot::{render_categorical, render_continuous};
use crate::report::{ColumnDriftResult, DriftReport, FeatureVisualization};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

type ColumnOutcome = Result<(ColumnDriftResult, FeatureVisualization), DriftError>;

/// Drift detector object
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftDetector {
    pub cfg: DriftConfig,
}

impl DriftDetector {
    /// Create a detector, rejecting invalid configuration up front.
    ///
    /// * `cfg` - Detector configuration.
    pub fn new(cfg: DriftConfig) -> Result<Self, DriftError> {
        let detector = DriftDetector { cfg };
        detector.validate()?;
        Ok(detector)
    }

    pub fn validate(&self) -> Result<(), DriftError> {
        self.cfg.validate()
    }

    /// Compare every column of `observed` against the same column of `reference`.
    ///
    /// Columns are reported in the reference column order. The column sets of the two datasets
    /// must be equal and each column must have the same type on both sides; row counts may differ.
    ///
    /// * `reference` - Training-time data.
    /// * `observed` - Live data.
    pub fn detect(&self, reference: &Dataset, observed: &Dataset) -> Result<DriftReport, DriftError> {
        let start = Instant::now();
        self.validate()?;
        let pairs = paired_columns(reference, observed)?;

        let outcomes: Vec<ColumnOutcome> = if self.cfg.parallel && pairs.len() > 1 {
            let pool = self.thread_pool()?;
            pool.install(|| {
                pairs
                    .par_iter()
                    .map(|(r, o)| self.compare_column(r, o))
                    .collect()
            })
        } else {
            pairs.iter().map(|(r, o)| self.compare_column(r, o)).collect()
        };

        // First failure in column order wins.
        let (results, visualizations): (Vec<_>, Vec<_>) =
            outcomes.into_iter().collect::<Result<Vec<_>, _>>()?.into_iter().unzip();
        let report = DriftReport::new(self.cfg.significance_level, results, visualizations);

        let summary = report.summary();
        info!(
            "Finished drift detection over {0} columns in {1:.3} seconds, {2} drifted.",
            summary.total_features,
            start.elapsed().as_secs_f32(),
            summary.drifted_features
        );
        Ok(report)
    }

    fn thread_pool(&self) -> Result<rayon::ThreadPool, DriftError> {
        let n_threads_available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let num_threads = match self.cfg.num_threads {
            Some(num_threads) => num_threads,
            None => n_threads_available,
        };
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| DriftError::ThreadPool(e.to_string()))
    }

    /// Test and chart one column. Nothing here touches state shared with other columns.
    fn compare_column(&self, reference: &Column, observed: &Column) -> ColumnOutcome {
        let feature = reference.name.as_str();
        for (column, dataset) in [(reference, Source::Reference), (observed, Source::Observed)] {
            if column.values.present_count() == 0 {
                return Err(DriftError::EmptyColumn {
                    column: feature.to_string(),
                    dataset,
                });
            }
        }

        match reference.column_type() {
            ColumnType::Categorical => {
                let ref_labels = reference.values.present_labels().unwrap_or_default();
                let obs_labels = observed.values.present_labels().unwrap_or_default();
                let table = ContingencyTable::from_samples(&ref_labels, &obs_labels);
                debug!("{}: {} categories", feature, table.n_categories());
                let result = categorical_drift(feature, &table, &self.cfg)?;
                let visualization = render_categorical(feature, &table, &self.cfg)?;
                Ok((result, visualization))
            }
            ColumnType::Continuous => {
                let ref_values = reference.values.present_numbers().unwrap_or_default();
                let obs_values = observed.values.present_numbers().unwrap_or_default();
                let result = continuous_drift(feature, &ref_values, &obs_values, &self.cfg)?;
                let visualization = render_continuous(feature, &ref_values, &obs_values, &self.cfg)?;
                Ok((result, visualization))
            }
        }
    }
}

/// Detect drift with the default configuration.
///
/// * `reference` - Training-time data.
/// * `observed` - Live data.
pub fn detect(reference: &Dataset, observed: &Dataset) -> Result<DriftReport, DriftError> {
    DriftDetector::default().detect(reference, observed)
}

/// Match every reference column with its observed counterpart, in reference order.
fn paired_columns<'a>(
    reference: &'a Dataset,
    observed: &'a Dataset,
) -> Result<Vec<(&'a Column, &'a Column)>, DriftError> {
    let missing: Vec<String> = reference
        .column_names()
        .into_iter()
        .filter(|name| observed.column(name).is_none())
        .map(String::from)
        .collect();
    let unexpected: Vec<String> = observed
        .column_names()
        .into_iter()
        .filter(|name| reference.column(name).is_none())
        .map(String::from)
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(DriftError::SchemaMismatch { missing, unexpected });
    }

    reference
        .columns()
        .iter()
        .map(|r| {
            let o = observed.column(&r.name).ok_or_else(|| DriftError::SchemaMismatch {
                missing: vec![r.name.clone()],
                unexpected: Vec::new(),
            })?;
            if r.column_type() != o.column_type() {
                return Err(DriftError::ColumnTypeMismatch {
                    column: r.name.clone(),
                    reference: r.column_type(),
                    observed: o.column_type(),
                });
            }
            Ok((r, o))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnValues;
    use crate::detector::config::UnsharedCategories;
    use crate::drift::stats::UndefinedTest;
    use crate::report::TestKind;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample(rng: &mut StdRng, n: usize, shift: f64) -> Vec<f64> {
        (0..n).map(|_| rng.gen::<f64>() * 10.0 + shift).collect()
    }

    fn jobs(seed: u64, shift: f64) -> Dataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = 120;
        let education: Vec<&str> = (0..n)
            .map(|i| match i % 3 {
                0 => "HS",
                1 => "BA",
                _ => "MS",
            })
            .collect();
        Dataset::new(vec![
            Column::numeric("experience", sample(&mut rng, n, shift)),
            Column::categorical("education", education),
            Column::numeric("salary", sample(&mut rng, n, 0.0)),
        ])
        .unwrap()
    }

    fn sequential() -> DriftDetector {
        DriftDetector::default().set_parallel(false)
    }

    #[test]
    fn test_detect_order_and_length() {
        let reference = jobs(0, 0.0);
        let shuffled = Dataset::new(vec![
            reference.column("salary").unwrap().clone(),
            reference.column("education").unwrap().clone(),
            reference.column("experience").unwrap().clone(),
        ])
        .unwrap();
        let report = sequential().detect(&reference, &shuffled).unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(report.results().len(), report.visualizations().len());
        for ((r, v), name) in report.iter().zip(reference.column_names()) {
            assert_eq!(r.feature, name);
            assert_eq!(v.feature, name);
        }
    }

    #[test]
    fn test_detect_shift() {
        let reference = jobs(1, 0.0);
        let observed = jobs(2, 5.0);
        let report = sequential().detect(&reference, &observed).unwrap();
        let (experience, _) = report.get("experience").unwrap();
        assert_eq!(experience.test_kind, TestKind::DistributionDistance);
        assert!(experience.drifted);
        let (education, _) = report.get("education").unwrap();
        assert_eq!(education.test_kind, TestKind::CategoricalAssociation);
        assert!(!education.drifted);
        for r in report.results() {
            assert_eq!(r.drifted, r.p_value < 0.05);
            assert!((0.0..=1.0).contains(&r.p_value));
        }
        assert_eq!(report.drifted_features()[0], "experience");
    }

    #[test]
    fn test_identical_datasets_do_not_drift() {
        let reference = jobs(3, 0.0);
        let report = detect(&reference, &reference.clone()).unwrap();
        assert!(!report.summary().has_drift());
        for r in report.results() {
            assert_eq!(r.p_value, 1.0);
        }
    }

    #[test]
    fn test_detect_is_deterministic() {
        let reference = jobs(4, 0.0);
        let observed = jobs(5, 1.0);
        let a = sequential().detect(&reference, &observed).unwrap();
        let b = sequential().detect(&reference, &observed).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let reference = jobs(6, 0.0);
        let observed = jobs(7, 2.0);
        let seq = sequential().detect(&reference, &observed).unwrap();
        let par = DriftDetector::default()
            .set_num_threads(Some(2))
            .detect(&reference, &observed)
            .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_degenerate_table_falls_back() {
        let reference = Dataset::new(vec![Column::categorical("grade", vec!["A", "B", "A", "B"])]).unwrap();
        let observed = Dataset::new(vec![Column::categorical("grade", vec!["A", "A", "A"])]).unwrap();
        let report = detect(&reference, &observed).unwrap();
        let (r, v) = report.get("grade").unwrap();
        assert_eq!(r.p_value, 1.0);
        assert!(!r.drifted);
        assert_eq!(r.fallback, Some(UndefinedTest::UnsharedCategory));
        assert!(!v.image.is_empty());
    }

    #[test]
    fn test_lost_category_is_tested_when_configured() {
        let reference = [vec!["HS"; 20], vec!["BA"; 20]].concat();
        let observed = vec!["HS"; 40];
        let reference = Dataset::new(vec![Column::categorical("education", reference)]).unwrap();
        let observed = Dataset::new(vec![Column::categorical("education", observed)]).unwrap();
        let detector = sequential().set_unshared_categories(UnsharedCategories::Test);
        let report = detector.detect(&reference, &observed).unwrap();
        let (r, _) = report.get("education").unwrap();
        assert!(r.fallback.is_none());
        assert!(r.drifted);
    }

    #[test]
    fn test_missing_values_are_ignored() {
        let reference = Dataset::new(vec![
            Column::numeric("x", vec![1.0, f64::NAN, 2.0, 3.0]),
            Column::new(
                "c",
                ColumnValues::Categorical(vec![Some("a".into()), None, Some("b".into()), Some("a".into())]),
            ),
        ])
        .unwrap();
        let observed = Dataset::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0]),
            Column::categorical("c", vec!["a", "b", "a"]),
        ])
        .unwrap();
        let report = sequential().detect(&reference, &observed).unwrap();
        for r in report.results() {
            assert_eq!(r.p_value, 1.0);
        }
    }

    #[test]
    fn test_empty_column() {
        let reference = Dataset::new(vec![Column::numeric("x", vec![1.0, 2.0])]).unwrap();
        let observed = Dataset::new(vec![Column::numeric("x", vec![f64::NAN, f64::NAN])]).unwrap();
        match detect(&reference, &observed) {
            Err(DriftError::EmptyColumn { column, dataset }) => {
                assert_eq!(column, "x");
                assert_eq!(dataset, Source::Observed);
            }
            other => panic!("unexpected {:?}", other),
        }

        let empty = Dataset::new(vec![Column::numeric("x", vec![])]).unwrap();
        match detect(&empty, &reference) {
            Err(DriftError::EmptyColumn { dataset, .. }) => assert_eq!(dataset, Source::Reference),
            other => panic!("unexpected {:?}", other),
        }

        let labels = Dataset::new(vec![Column::categorical("c", vec!["a"])]).unwrap();
        let no_labels = Dataset::new(vec![Column::categorical("c", Vec::<&str>::new())]).unwrap();
        assert!(matches!(
            detect(&labels, &no_labels),
            Err(DriftError::EmptyColumn { .. })
        ));
    }

    #[test]
    fn test_schema_mismatch() {
        let reference = Dataset::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("b", vec![1.0]),
        ])
        .unwrap();
        let observed = Dataset::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("c", vec![1.0]),
        ])
        .unwrap();
        match detect(&reference, &observed) {
            Err(DriftError::SchemaMismatch { missing, unexpected }) => {
                assert_eq!(missing, vec!["b".to_string()]);
                assert_eq!(unexpected, vec!["c".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_column_type_mismatch() {
        let reference = Dataset::new(vec![Column::numeric("a", vec![1.0, 2.0])]).unwrap();
        let observed = Dataset::new(vec![Column::categorical("a", vec!["1", "2"])]).unwrap();
        match detect(&reference, &observed) {
            Err(DriftError::ColumnTypeMismatch { column, reference, observed }) => {
                assert_eq!(column, "a");
                assert_eq!(reference, ColumnType::Continuous);
                assert_eq!(observed, ColumnType::Categorical);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config() {
        let cfg = DriftConfig {
            significance_level: 0.0,
            ..Default::default()
        };
        assert!(DriftDetector::new(cfg.clone()).is_err());
        let detector = DriftDetector { cfg };
        let data = jobs(8, 0.0);
        assert!(matches!(
            detector.detect(&data, &data),
            Err(DriftError::InvalidParameter(..))
        ));
    }

    #[test]
    fn test_empty_datasets() {
        let report = detect(&Dataset::default(), &Dataset::default()).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_infinite_values_fail_to_render() {
        let reference = Dataset::new(vec![Column::numeric("x", vec![1.0, 2.0, 3.0, f64::INFINITY])]).unwrap();
        let observed = Dataset::new(vec![Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0])]).unwrap();
        match sequential().detect(&reference, &observed) {
            Err(DriftError::RenderFailure { feature, .. }) => assert_eq!(feature, "x"),
            other => panic!("unexpected {:?}", other),
        }

        let loader = crate::loader::CsvLoader::new();
        let reference = loader.load_str("x,c\n1,a\ninf,b\n-Infinity,a\n").unwrap();
        let observed = loader.load_str("x,c\n1,a\n2,b\n3,a\n").unwrap();
        match DriftDetector::default().detect(&reference, &observed) {
            Err(DriftError::RenderFailure { feature, reason }) => {
                assert_eq!(feature, "x");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_huge_spread_fails_to_render() {
        let reference = Dataset::new(vec![Column::numeric("x", vec![-1e308, 1e308])]).unwrap();
        let observed = Dataset::new(vec![Column::numeric("x", vec![0.0, 1.0])]).unwrap();
        assert!(matches!(
            detect(&reference, &observed),
            Err(DriftError::RenderFailure { .. })
        ));
    }

    #[test]
    fn test_education_example_lost_category() {
        // BA is absent from the observed data, so the default policy reports no evidence.
        let reference = Dataset::new(vec![Column::categorical("education", vec!["HS", "HS", "BA", "BA"])]).unwrap();
        let observed = Dataset::new(vec![Column::categorical("education", vec!["HS", "HS", "HS", "HS"])]).unwrap();
        let report = detect(&reference, &observed).unwrap();
        let (r, _) = report.get("education").unwrap();
        assert_eq!(r.test_kind, TestKind::CategoricalAssociation);
        assert_eq!(r.p_value, 1.0);
        assert!(!r.drifted);
        assert_eq!(r.fallback, Some(UndefinedTest::UnsharedCategory));

        // Running the test anyway still finds no significant change on four rows per side.
        let report = sequential()
            .set_unshared_categories(UnsharedCategories::Test)
            .detect(&reference, &observed)
            .unwrap();
        let (r, _) = report.get("education").unwrap();
        assert!(r.fallback.is_none());
        assert!(r.p_value > 0.05);
        assert!(!r.drifted);
    }
}
