/// 1-D symmetric smoothing taps for separable convolution.
///
/// The shape is a Gaussian with one difference: within one standard
/// deviation of the center the taps follow the line
/// `w(i) = (-a / sd) * i + (a + e^-0.5)`, which puts a sharp spike at the
/// center of the otherwise smooth bell. The spike keeps the smoothed field's
/// gradient pointing at the ridge crest even very close to it. `a` is fixed
/// at `1.5 * std_dev` and controls the sharpness.
///
/// `std_dev` is in ground meters; `mercator_scale` converts it to planar
/// units so the same value behaves identically at any latitude.
#[derive(Clone, Debug)]
pub struct Kernel {
    taps: Vec<f64>,
}

impl Kernel {
    /// Build the smoothing taps for `std_dev` meters at `mercator_scale`.
    /// A zero `std_dev` yields the identity kernel.
    pub fn new(std_dev: f64, mercator_scale: f64) -> Self {
        debug_assert!(std_dev >= 0.0, "negative smoothing std-dev");
        if std_dev == 0.0 {
            return Self::identity();
        }

        let inv_sqrt_e = (-0.5f64).exp();
        let addition = std_dev * 1.5;
        let sd = std_dev * mercator_scale;
        let depth = mercator_scale.sqrt() / (addition + inv_sqrt_e);

        // taps beyond 3.5 standard deviations are treated as zero
        let size = (sd * 3.5).ceil() as usize;
        let mut taps = vec![0.0; 2 * size + 1];
        for i in 0..=size {
            let x = if (i as f64) < sd {
                -addition / sd * i as f64 + (addition + inv_sqrt_e)
            } else {
                let r = i as f64 / sd;
                (-r * r).exp()
            };
            taps[size - i] = x * depth;
            taps[size + i] = x * depth;
        }

        Self { taps }
    }

    /// The single-tap kernel that leaves the field untouched.
    pub fn identity() -> Self {
        Self { taps: vec![1.0] }
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Number of taps on either side of the center.
    #[inline]
    pub fn half_width(&self) -> usize {
        (self.taps.len() - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_std_dev_is_identity() {
        let k = Kernel::new(0.0, 1.3);
        assert_eq!(k.taps(), &[1.0]);
        assert_eq!(k.half_width(), 0);
    }

    #[test]
    fn taps_are_symmetric() {
        let k = Kernel::new(5.0, 1.2);
        let size = k.half_width();
        assert_eq!(k.taps().len(), 2 * size + 1);
        for i in 0..=size {
            assert_eq!(k.taps()[size - i], k.taps()[size + i], "tap {i}");
        }
    }

    #[test]
    fn taps_reach_three_and_a_half_std_devs() {
        let k = Kernel::new(3.0, 1.0);
        assert_eq!(k.half_width(), (3.0f64 * 3.5).ceil() as usize);
    }

    #[test]
    fn center_spike_exceeds_gaussian() {
        // inside one std-dev the linear spike rises above the pure Gaussian
        let k = Kernel::new(4.0, 1.0);
        let size = k.half_width();
        let depth = 1.0 / (4.0 * 1.5 + (-0.5f64).exp());
        let center = k.taps()[size];
        assert!(center > depth, "center tap should carry the spike");
        // the bell decreases monotonically away from the center
        for i in 0..size {
            assert!(k.taps()[size + i] >= k.taps()[size + i + 1]);
        }
    }
}
