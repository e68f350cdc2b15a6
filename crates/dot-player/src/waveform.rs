use rand::Rng;

/// Decorative bar heights drawn under the progress overlay.
///
/// Heights are fractions of the bar area. They carry no audio information.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waveform {
    bars: Vec<f32>,
}

impl Waveform {
    pub fn generate(count: usize, min_height: f32, max_height: f32, rng: &mut impl Rng) -> Self {
        let bars = (0..count)
            .map(|_| {
                if max_height > min_height {
                    rng.random_range(min_height..max_height)
                } else {
                    min_height
                }
            })
            .collect();
        Self { bars }
    }

    pub fn bars(&self) -> &[f32] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bars_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let waveform = Waveform::generate(70, 0.15, 0.75, &mut rng);
        assert_eq!(waveform.bars().len(), 70);
        assert!(waveform.bars().iter().all(|h| (0.15..0.75).contains(h)));
    }

    #[test]
    fn degenerate_range_is_flat() {
        let mut rng = StdRng::seed_from_u64(3);
        let waveform = Waveform::generate(4, 0.5, 0.5, &mut rng);
        assert_eq!(waveform.bars(), &[0.5; 4]);
    }
}
