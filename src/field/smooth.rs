use super::{Kernel, ScalarField};
use rayon::prelude::*;

/// Smooth the whole field in place with the kernel, column pass then row
/// pass, replicating border cells. Produces the same values as
/// [`super::SmoothedField`] would for every cell; prefer the lazy view when
/// only part of the field is read.
pub fn smooth_in_place(field: &mut ScalarField, kernel: &Kernel) {
    let w = field.width();
    let h = field.height();
    let size = kernel.half_width() as isize;
    let taps = kernel.taps();

    // column (vertical) pass into scratch
    let src = field.data().to_vec();
    let mut scratch = vec![0.0f64; w * h];
    scratch
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            let max_y = (h - 1) as isize;
            for (x, out) in row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for (tap, j) in taps.iter().zip(y as isize - size..) {
                    let k = j.clamp(0, max_y) as usize;
                    sum += tap * src[k * w + x];
                }
                *out = sum;
            }
        });

    // row (horizontal) pass back into the field
    field
        .data_mut()
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            let max_x = (w - 1) as isize;
            let scratch_row = &scratch[y * w..(y + 1) * w];
            for (x, out) in row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for (tap, j) in taps.iter().zip(x as isize - size..) {
                    let k = j.clamp(0, max_x) as usize;
                    sum += tap * scratch_row[k];
                }
                *out = sum;
            }
        });
}
