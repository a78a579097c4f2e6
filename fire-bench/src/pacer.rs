//! Inter-request pacing.
use fire_bench_core::PacingMode;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, Uniform};
use std::time::Duration;

/// Computes the delay a worker waits before each attempt.
///
/// Each worker owns its own `Pacer` (and RNG), so drawing a delay never contends with other
/// workers.
#[derive(Debug, Clone)]
pub struct Pacer {
    jitter: Jitter,
    rng: SmallRng,
}

#[derive(Debug, Clone)]
enum Jitter {
    None,
    Uniform(Uniform<f64>),
    Exponential(Exp<f64>),
}

impl Pacer {
    pub fn new(mode: PacingMode, avg_jitter_secs: f64) -> Self {
        Self::with_rng(mode, avg_jitter_secs, SmallRng::from_entropy())
    }

    pub fn with_rng(mode: PacingMode, avg_jitter_secs: f64, rng: SmallRng) -> Self {
        // NOTE: A zero (or invalid) mean collapses every mode into burst.
        let jitter = if !(avg_jitter_secs.is_finite() && avg_jitter_secs > 0.) {
            Jitter::None
        } else {
            match mode {
                PacingMode::Burst => Jitter::None,
                PacingMode::Uniform => {
                    let high = 2. * avg_jitter_secs;
                    if high.is_finite() {
                        Jitter::Uniform(Uniform::new_inclusive(0., high))
                    } else {
                        Jitter::None
                    }
                }
                PacingMode::Exponential => Exp::new(1. / avg_jitter_secs)
                    .map(Jitter::Exponential)
                    .unwrap_or(Jitter::None),
            }
        };

        Self { jitter, rng }
    }

    /// Draw the next delay.
    pub fn delay(&mut self) -> Duration {
        let secs = match &self.jitter {
            Jitter::None => return Duration::ZERO,
            Jitter::Uniform(dist) => dist.sample(&mut self.rng),
            Jitter::Exponential(dist) => dist.sample(&mut self.rng),
        };

        // Draws only fail to convert by overflowing.
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Sleep for the next delay. Returns immediately in burst mode.
    pub async fn wait(&mut self) -> Duration {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}

/// One-shot form of [`Pacer::delay`].
pub fn delay(mode: PacingMode, avg_jitter_secs: f64) -> Duration {
    Pacer::new(mode, avg_jitter_secs).delay()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWS: usize = 100_000;

    fn mean_delay(pacer: &mut Pacer) -> f64 {
        (0..DRAWS).map(|_| pacer.delay().as_secs_f64()).sum::<f64>() / DRAWS as f64
    }

    #[test]
    fn burst_never_waits() {
        let mut pacer = Pacer::with_rng(PacingMode::Burst, 0.5, SmallRng::seed_from_u64(1));
        assert!((0..1_000).all(|_| pacer.delay().is_zero()));
    }

    #[test]
    fn zero_jitter_never_waits() {
        for mode in [PacingMode::Uniform, PacingMode::Exponential] {
            assert!(delay(mode, 0.).is_zero());
        }
    }

    #[test]
    fn uniform_mean_converges() {
        let avg = 0.010;
        let mut pacer = Pacer::with_rng(PacingMode::Uniform, avg, SmallRng::seed_from_u64(7));
        let mean = mean_delay(&mut pacer);
        assert!((mean - avg).abs() / avg < 0.02, "mean={mean}");
    }

    #[test]
    fn uniform_stays_in_bounds() {
        let avg = 0.25;
        let mut pacer = Pacer::with_rng(PacingMode::Uniform, avg, SmallRng::seed_from_u64(3));
        for _ in 0..10_000 {
            let d = pacer.delay().as_secs_f64();
            assert!((0. ..=2. * avg + 1e-9).contains(&d), "delay={d}");
        }
    }

    #[test]
    fn extreme_means_never_panic() {
        // An unrepresentable uniform bound disables pacing; validation rejects it upstream.
        let mut pacer = Pacer::with_rng(PacingMode::Uniform, 1e308, SmallRng::seed_from_u64(2));
        assert!(pacer.delay().is_zero());

        // Huge but finite means saturate instead of dropping to zero.
        for mode in [PacingMode::Uniform, PacingMode::Exponential] {
            let mut pacer = Pacer::with_rng(mode, 1e20, SmallRng::seed_from_u64(4));
            for _ in 0..100 {
                assert!(pacer.delay() > Duration::from_secs(3_600));
            }
        }
    }

    #[test]
    fn exponential_mean_converges() {
        let avg = 0.010;
        let mut pacer = Pacer::with_rng(PacingMode::Exponential, avg, SmallRng::seed_from_u64(11));
        let mean = mean_delay(&mut pacer);
        assert!((mean - avg).abs() / avg < 0.03, "mean={mean}");
    }

    #[tokio::test(start_paused = true)]
    async fn wait_sleeps_for_the_drawn_delay() {
        let mut pacer = Pacer::with_rng(PacingMode::Uniform, 0.5, SmallRng::seed_from_u64(5));
        let start = tokio::time::Instant::now();
        let delay = pacer.wait().await;
        assert!(start.elapsed() >= delay);
    }
}
