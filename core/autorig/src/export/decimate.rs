use crate::scene::{Action, FCurve, Keyframe};

fn deviation(key: &Keyframe, first: &Keyframe, last: &Keyframe) -> f32 {
    let span = last.frame - first.frame;
    if span.abs() <= f32::EPSILON {
        return (key.value - first.value).abs();
    }

    let t = (key.frame - first.frame) / span;
    let expected = first.value + (last.value - first.value) * t;
    (key.value - expected).abs()
}

fn mark_kept(keys: &[Keyframe], first: usize, last: usize, tolerance: f32, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }

    let (index, error) = (first + 1..last)
        .map(|i| (i, deviation(&keys[i], &keys[first], &keys[last])))
        .fold((first, 0.0f32), |max, cur| if cur.1 > max.1 { cur } else { max });

    if error > tolerance {
        keep[index] = true;
        mark_kept(keys, first, index, tolerance, keep);
        mark_kept(keys, index, last, tolerance, keep);
    }
}

/// Removes keys that linear interpolation between the remaining keys
/// reproduces within `tolerance`. End keys are always kept.
pub fn decimate_fcurve(curve: &mut FCurve, tolerance: f32) -> usize {
    let count = curve.keyframes.len();
    if count <= 2 {
        return 0;
    }

    let mut keep = vec![false; count];
    keep[0] = true;
    keep[count - 1] = true;
    mark_kept(&curve.keyframes, 0, count - 1, tolerance, &mut keep);

    let mut flags = keep.into_iter();
    curve.keyframes.retain(|_| flags.next().unwrap_or(true));

    count - curve.keyframes.len()
}

/// Decimates every curve of the action, returns the number of removed keys
pub fn decimate_action(action: &mut Action, tolerance: f32) -> usize {
    let removed = action
        .fcurves
        .iter_mut()
        .map(|curve| decimate_fcurve(curve, tolerance))
        .sum();

    log::debug!("Decimated {removed} key(s) from \"{}\"", action.name);
    removed
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;
    use crate::DEFAULT_DECIMATE_TOLERANCE;

    fn curve(points: &[(f32, f32)]) -> FCurve {
        let mut curve = FCurve::new("location", 0);
        for (frame, value) in points {
            curve.insert(*frame, *value);
        }
        curve
    }

    fn frames(curve: &FCurve) -> Vec<f32> {
        curve.keyframes.iter().map(|k| k.frame).collect()
    }

    #[rstest]
    fn collinear_keys_collapse_to_endpoints() {
        let mut c = curve(&[(1.0, 0.0), (2.0, 0.5), (3.0, 1.0), (4.0, 1.5), (5.0, 2.0)]);

        assert_eq!(decimate_fcurve(&mut c, DEFAULT_DECIMATE_TOLERANCE), 3);
        assert_eq!(frames(&c), vec![1.0, 5.0]);
    }

    #[rstest]
    fn peaks_are_kept() {
        let mut c = curve(&[(1.0, 0.0), (2.0, 0.5), (3.0, 1.0), (4.0, 0.5), (5.0, 0.0)]);

        decimate_fcurve(&mut c, DEFAULT_DECIMATE_TOLERANCE);
        assert_eq!(frames(&c), vec![1.0, 3.0, 5.0]);
    }

    #[rstest]
    fn constant_curve_keeps_endpoints() {
        let mut c = curve(&[(1.0, 2.0), (2.0, 2.0), (3.0, 2.0)]);

        decimate_fcurve(&mut c, DEFAULT_DECIMATE_TOLERANCE);
        assert_eq!(frames(&c), vec![1.0, 3.0]);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[(1.0, 0.0)])]
    #[case(&[(1.0, 0.0), (2.0, 3.0)])]
    fn short_curves_are_untouched(#[case] points: &[(f32, f32)]) {
        let mut c = curve(points);

        assert_eq!(decimate_fcurve(&mut c, DEFAULT_DECIMATE_TOLERANCE), 0);
        assert_eq!(c.keyframes.len(), points.len());
    }

    #[rstest]
    fn small_noise_within_tolerance_is_dropped() {
        let mut c = curve(&[(1.0, 0.0), (2.0, 0.000001), (3.0, 0.0)]);

        decimate_fcurve(&mut c, DEFAULT_DECIMATE_TOLERANCE);
        assert_eq!(frames(&c), vec![1.0, 3.0]);
    }
}
