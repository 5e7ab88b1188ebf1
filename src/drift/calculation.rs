use crate::constants::FALLBACK_P_VALUE;
use crate::data::Source;
use crate::detector::config::{DriftConfig, KsMethod, UnsharedCategories};
use crate::drift::stats::{chi2_contingency, ks_2samp, Association, ContingencyTable, UndefinedTest};
use crate::errors::DriftError;
use crate::report::{ColumnDriftResult, TestKind};
use log::{debug, warn};

/// A column has drifted when its p-value is strictly below the significance level.
pub fn is_drifted(p_value: f64, significance_level: f64) -> bool {
    p_value < significance_level
}

/// Test a categorical column for a change in category frequencies.
///
/// When the association test is undefined for the table, the result carries the fallback
/// p-value of 1.0 and the reason, and the column is never reported as drifted.
///
/// * `feature` - Column name.
/// * `table` - Category by source counts of the present labels.
/// * `cfg` - Significance level, Yates correction and unshared category policy.
pub fn categorical_drift(
    feature: &str,
    table: &ContingencyTable,
    cfg: &DriftConfig,
) -> Result<ColumnDriftResult, DriftError> {
    let association = match (cfg.unshared_categories, table.unshared_category()) {
        (UnsharedCategories::NoEvidence, Some(category)) => {
            debug!("{}: category {} is present in one dataset only.", feature, category);
            Association::Undefined(UndefinedTest::UnsharedCategory)
        }
        _ => chi2_contingency(table, cfg.yates_correction)?,
    };

    let result = match association {
        Association::Computed(test) => {
            debug!(
                "{}: chi-square statistic {:.4} with {} dof, p-value {:.6}",
                feature, test.statistic, test.dof, test.p_value
            );
            ColumnDriftResult {
                feature: feature.to_string(),
                test_kind: TestKind::CategoricalAssociation,
                statistic: test.statistic,
                p_value: test.p_value,
                drifted: is_drifted(test.p_value, cfg.significance_level),
                fallback: None,
            }
        }
        Association::Undefined(reason) => {
            debug!("{}: association test undefined ({}), using p-value {}", feature, reason, FALLBACK_P_VALUE);
            ColumnDriftResult {
                feature: feature.to_string(),
                test_kind: TestKind::CategoricalAssociation,
                statistic: 0.0,
                p_value: FALLBACK_P_VALUE,
                drifted: is_drifted(FALLBACK_P_VALUE, cfg.significance_level),
                fallback: Some(reason),
            }
        }
    };
    Ok(result)
}

/// Test a numeric column with the two-sample Kolmogorov-Smirnov test.
///
/// * `feature` - Column name.
/// * `reference` - Present reference values.
/// * `observed` - Present observed values.
/// * `cfg` - Significance level and KS method.
pub fn continuous_drift(
    feature: &str,
    reference: &[f64],
    observed: &[f64],
    cfg: &DriftConfig,
) -> Result<ColumnDriftResult, DriftError> {
    let largest = reference.len().max(observed.len());
    if cfg.ks_method == KsMethod::Exact && largest > cfg.ks_exact_max_samples {
        warn!(
            "{}: exact Kolmogorov-Smirnov requested for {} samples, above the limit of {}.",
            feature, largest, cfg.ks_exact_max_samples
        );
    }
    let test = ks_2samp(reference, observed, cfg.ks_method, cfg.ks_exact_max_samples).ok_or_else(|| {
        DriftError::EmptyColumn {
            column: feature.to_string(),
            dataset: if reference.is_empty() {
                Source::Reference
            } else {
                Source::Observed
            },
        }
    })?;
    debug!(
        "{}: KS statistic {:.4} ({:?}), p-value {:.6}",
        feature, test.statistic, test.method, test.p_value
    );
    Ok(ColumnDriftResult {
        feature: feature.to_string(),
        test_kind: TestKind::DistributionDistance,
        statistic: test.statistic,
        p_value: test.p_value,
        drifted: is_drifted(test.p_value, cfg.significance_level),
        fallback: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_is_drifted_boundary() {
        assert!(is_drifted(0.0499, 0.05));
        assert!(!is_drifted(0.05, 0.05));
        assert!(!is_drifted(1.0, 0.05));
    }

    #[test]
    fn test_categorical_shift() {
        let reference = [vec!["HS"; 40], vec!["BA"; 40]].concat();
        let observed = [vec!["HS"; 70], vec!["BA"; 10]].concat();
        let table = ContingencyTable::from_samples(&reference, &observed);
        let res = categorical_drift("education", &table, &DriftConfig::default()).unwrap();
        assert_eq!(res.test_kind, TestKind::CategoricalAssociation);
        assert!(res.p_value < 0.05);
        assert!(res.drifted);
        assert!(res.fallback.is_none());
        assert!(res.statistic > 0.0);
    }

    #[test]
    fn test_categorical_unshared_fallback() {
        let table = ContingencyTable::from_samples(&["A", "B"], &["A"]);
        let res = categorical_drift("grade", &table, &DriftConfig::default()).unwrap();
        assert_eq!(res.p_value, 1.0);
        assert!(!res.drifted);
        assert_eq!(res.fallback, Some(UndefinedTest::UnsharedCategory));
    }

    #[test]
    fn test_categorical_unshared_tested() {
        let reference = [vec!["A"; 30], vec!["B"; 30]].concat();
        let observed = vec!["A"; 60];
        let table = ContingencyTable::from_samples(&reference, &observed);
        let cfg = DriftConfig {
            unshared_categories: UnsharedCategories::Test,
            ..Default::default()
        };
        let res = categorical_drift("grade", &table, &cfg).unwrap();
        assert!(res.fallback.is_none());
        assert!(res.drifted);
    }

    #[test]
    fn test_categorical_single_category_fallback() {
        let table = ContingencyTable::from_samples(&["A", "A"], &["A"]);
        let cfg = DriftConfig {
            unshared_categories: UnsharedCategories::Test,
            ..Default::default()
        };
        let res = categorical_drift("grade", &table, &cfg).unwrap();
        assert_eq!(res.p_value, 1.0);
        assert_eq!(res.fallback, Some(UndefinedTest::SingleCategory));
    }

    #[test]
    fn test_continuous_shift() {
        let mut rng = StdRng::seed_from_u64(7);
        let reference: Vec<f64> = (0..300).map(|_| rng.gen::<f64>()).collect();
        let observed: Vec<f64> = (0..300).map(|_| rng.gen::<f64>() + 0.5).collect();
        let res = continuous_drift("salary", &reference, &observed, &DriftConfig::default()).unwrap();
        assert_eq!(res.test_kind, TestKind::DistributionDistance);
        assert!(res.drifted);
        assert!(res.statistic > 0.3);

        let same = continuous_drift("salary", &reference, &reference, &DriftConfig::default()).unwrap();
        assert_eq!(same.p_value, 1.0);
        assert!(!same.drifted);
    }

    #[test]
    fn test_continuous_empty() {
        let cfg = DriftConfig::default();
        match continuous_drift("salary", &[], &[1.0], &cfg) {
            Err(DriftError::EmptyColumn { column, dataset }) => {
                assert_eq!(column, "salary");
                assert_eq!(dataset, Source::Reference);
            }
            other => panic!("unexpected {:?}", other),
        }
        match continuous_drift("salary", &[1.0], &[], &cfg) {
            Err(DriftError::EmptyColumn { dataset, .. }) => assert_eq!(dataset, Source::Observed),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_custom_significance_level() {
        let reference = [vec!["x"; 10], vec!["y"; 10]].concat();
        let observed = [vec!["x"; 5], vec!["y"; 20]].concat();
        let table = ContingencyTable::from_samples(&reference, &observed);
        let cfg = DriftConfig {
            yates_correction: false,
            ..Default::default()
        };
        // p is about 0.0339
        assert!(categorical_drift("c", &table, &cfg).unwrap().drifted);
        let strict = DriftConfig {
            significance_level: 0.01,
            ..cfg
        };
        assert!(!categorical_drift("c", &table, &strict).unwrap().drifted);
    }
}
