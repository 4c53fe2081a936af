// Exponential Moving Average (EMA), the building block of MACD and its signal line

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first value and
/// no bias adjustment. Defined from the first element onward.
pub fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut results = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for &x in values {
        let ema = match previous {
            Some(prev) => prev + alpha * (x - prev),
            None => x,
        };
        results.push(ema);
        previous = Some(ema);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_calculation() {
        // alpha = 0.5, seeded with 10
        // 11 -> 10.5, 12 -> 11.25, 13 -> 12.125
        let results = ema_values(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_eq!(results, vec![10.0, 10.5, 11.25, 12.125]);
    }

    #[test]
    fn test_ema_constant_input_is_constant() {
        let values = vec![42.0; 30];
        assert!(ema_values(&values, 12).iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema_values(&[], 9).is_empty());
    }
}
