// summary statistics over f64 samples, None for an empty sample

pub fn mean(data:&[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>()/data.len() as f64)
}

// even length: mean of the two middle values
pub fn median(data:&[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a,b| a.total_cmp(b));
    let mid = sorted.len()/2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid-1] + sorted[mid])/2.0)
    }
}

pub fn min(data:&[f64]) -> Option<f64> {
    data.iter().copied().min_by(|a,b| a.total_cmp(b))
}

pub fn max(data:&[f64]) -> Option<f64> {
    data.iter().copied().max_by(|a,b| a.total_cmp(b))
}

#[cfg(test)]
mod test {
    use super::{max, mean, median, min};

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0,1.0,2.0]),Some(2.0));
        assert_eq!(median(&[4.0,1.0,3.0,2.0]),Some(2.5));
        assert_eq!(median(&[]),None);
    }

    #[test]
    fn test_mean_and_extrema() {
        let data = [2.0,-1.0,5.0,2.0];
        assert_eq!(mean(&data),Some(2.0));
        assert_eq!(min(&data),Some(-1.0));
        assert_eq!(max(&data),Some(5.0));
        assert_eq!(mean(&[]),None);
        assert_eq!(max(&[]),None);
    }

    #[test]
    fn test_median_of_random_sample_is_bounded() {
        use rand::Rng;
        let mut rng = rand::rng();
        let len = rng.random_range(1..500);
        let data:Vec<f64> = (0..len).map(|_| rng.random_range(-1000.0..1000.0)).collect();
        let m = median(&data).unwrap();
        assert!(min(&data).unwrap() <= m && m <= max(&data).unwrap());
        let below = data.iter().filter(|x| **x < m).count();
        assert!(below <= len/2);
    }
}
