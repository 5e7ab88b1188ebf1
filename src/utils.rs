use crate::errors::DriftError;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

// Validation
pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), DriftError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(DriftError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Same as [`validate_float_parameter`], with both bounds excluded.
pub fn validate_open_interval(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), DriftError> {
    if value.is_nan() || value <= min || max <= value {
        let ex_msg = format!("real value strictly between {} and {}", min, max);
        Err(DriftError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_positive_count(value: usize, min: usize, parameter: &str) -> Result<(), DriftError> {
    if value < min {
        Err(DriftError::InvalidParameter(
            parameter.to_string(),
            format!("an integer of at least {}", min),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Total ordering for floats that are known not to be NaN.
#[inline]
pub fn cmp_f64(a: &f64, b: &f64) -> std::cmp::Ordering {
    a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Sample standard deviation (ddof = 1). Returns zero for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (ss / (n - 1) as f64).sqrt()
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
