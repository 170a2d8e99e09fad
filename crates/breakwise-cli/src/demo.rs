//! Synthetic stress series for demo days.
//!
//! Stands in for a wearable feed: a wobbly baseline with a handful of
//! randomly placed peaks. The peak count drives the "break recommended"
//! banner; the series itself is display-only.

use rand::Rng;

const SERIES_LEN: usize = 48;

/// Number of peaks for a fresh demo day: half the days are high-stress.
pub fn draw_peak_count<R: Rng + ?Sized>(rng: &mut R) -> usize {
    if rng.gen::<f64>() < 0.5 {
        rng.gen_range(5..=7)
    } else {
        rng.gen_range(1..=4)
    }
}

/// A day of synthetic stress samples with `target_peaks` peaks.
pub fn generate_series<R: Rng + ?Sized>(target_peaks: usize, rng: &mut R) -> Vec<f64> {
    let baseline = rng.gen_range(38..=55) as f64;
    let mut series: Vec<f64> = (0..SERIES_LEN)
        .map(|i| {
            let i = i as f64;
            baseline + 6.0 * (i / 7.0).sin() + 4.0 * (i / 3.5).sin()
        })
        .collect();

    // Pick well-separated peak centers; give up after a bounded number of
    // tries so a crowded request cannot loop forever.
    let mut centers: Vec<usize> = Vec::new();
    let mut tries = 0;
    while centers.len() < target_peaks && tries < 200 {
        let k = rng.gen_range(2..SERIES_LEN - 2);
        if centers.iter().all(|c| c.abs_diff(k) >= 4) {
            centers.push(k);
        }
        tries += 1;
    }

    for center in centers {
        let amplitude = rng.gen_range(14..=28) as f64;
        for j in -3i64..=3 {
            let idx = (center as i64 + j).clamp(0, SERIES_LEN as i64 - 1) as usize;
            let weight = (-(j * j) as f64 / 4.0).exp();
            series[idx] += amplitude * weight;
        }
    }

    for v in &mut series {
        *v = (*v + rng.gen_range(-3..=4) as f64).max(0.0);
    }
    series
}

/// True when the day warrants urging a break.
pub fn is_high_stress(peaks: usize) -> bool {
    peaks > 4
}

/// Compact one-line rendering of the series for terminal output.
pub fn sparkline(series: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    if series.is_empty() {
        return String::new();
    }
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(1e-6);
    series
        .iter()
        .map(|v| {
            let level = ((v - min) / range * (BARS.len() - 1) as f64).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    #[test]
    fn series_has_expected_shape() {
        let mut rng = Mcg128Xsl64::seed_from_u64(1);
        let series = generate_series(6, &mut rng);
        assert_eq!(series.len(), SERIES_LEN);
        assert!(series.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn peak_count_stays_in_band() {
        let mut rng = Mcg128Xsl64::seed_from_u64(2);
        for _ in 0..100 {
            let peaks = draw_peak_count(&mut rng);
            assert!((1..=7).contains(&peaks));
        }
    }

    #[test]
    fn high_stress_threshold() {
        assert!(!is_high_stress(4));
        assert!(is_high_stress(5));
    }

    #[test]
    fn sparkline_is_one_char_per_sample() {
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        let series = generate_series(3, &mut rng);
        assert_eq!(sparkline(&series).chars().count(), series.len());
    }
}
