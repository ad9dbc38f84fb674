use nalgebra::Vector3;

#[inline]
pub fn exchange(s_i: &Vector3<f64>, s_j: &Vector3<f64>, strength: f64) -> f64 {
    -strength * s_i.dot(s_j)
}

/// Gradient of [`exchange`] with respect to `s_i` and `s_j`.
#[inline]
pub fn exchange_gradient(
    s_i: &Vector3<f64>,
    s_j: &Vector3<f64>,
    strength: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    (s_j * -strength, s_i * -strength)
}

#[inline]
pub fn dzyaloshinskii_moriya(s_i: &Vector3<f64>, s_j: &Vector3<f64>, d: &Vector3<f64>) -> f64 {
    -d.dot(&s_i.cross(s_j))
}

/// Gradient of [`dzyaloshinskii_moriya`] with respect to `s_i` and `s_j`.
///
/// Uses the cyclic identity `D . (a x b) = a . (b x D) = b . (D x a)`.
#[inline]
pub fn dzyaloshinskii_moriya_gradient(
    s_i: &Vector3<f64>,
    s_j: &Vector3<f64>,
    d: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    (-s_j.cross(d), -d.cross(s_i))
}

#[inline]
pub fn uniaxial_anisotropy(s: &Vector3<f64>, k1: f64, axis: &Vector3<f64>) -> f64 {
    let projection = s.dot(axis);
    -k1 * projection * projection
}

#[inline]
pub fn uniaxial_anisotropy_gradient(s: &Vector3<f64>, k1: f64, axis: &Vector3<f64>) -> Vector3<f64> {
    axis * (-2.0 * k1 * s.dot(axis))
}

#[inline]
pub fn zeeman(s: &Vector3<f64>, field: &Vector3<f64>) -> f64 {
    -s.dot(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;
    const FD_STEP: f64 = 1e-6;
    const FD_TOLERANCE: f64 = 1e-7;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn finite_difference<F>(f: F, at: &Vector3<f64>) -> Vector3<f64>
    where
        F: Fn(&Vector3<f64>) -> f64,
    {
        let mut grad = Vector3::zeros();
        for k in 0..3 {
            let mut plus = *at;
            let mut minus = *at;
            plus[k] += FD_STEP;
            minus[k] -= FD_STEP;
            grad[k] = (f(&plus) - f(&minus)) / (2.0 * FD_STEP);
        }
        grad
    }

    #[test]
    fn exchange_of_antiparallel_spins_is_positive_for_ferromagnetic_coupling() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(-1.0, 0.0, 0.0);
        assert!(approx_eq(exchange(&a, &b, 1.0), 1.0));
    }

    #[test]
    fn exchange_of_parallel_spins_returns_negative_coupling() {
        let a = Vector3::new(0.0, 0.0, 1.0);
        assert!(approx_eq(exchange(&a, &a, 2.5), -2.5));
    }

    #[test]
    fn dmi_is_zero_for_parallel_spins() {
        let a = Vector3::new(0.0, 1.0, 0.0);
        let d = Vector3::new(0.3, -0.2, 1.0);
        assert!(approx_eq(dzyaloshinskii_moriya(&a, &a, &d), 0.0));
    }

    #[test]
    fn dmi_favours_canting_along_the_coupling_vector() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 1.0, 0.0);
        let d = Vector3::new(0.0, 0.0, 1.0);
        assert!(approx_eq(dzyaloshinskii_moriya(&a, &b, &d), -1.0));
        assert!(approx_eq(dzyaloshinskii_moriya(&b, &a, &d), 1.0));
    }

    #[test]
    fn anisotropy_is_minimal_along_easy_axis() {
        let axis = Vector3::new(0.0, 0.0, 1.0);
        let along = Vector3::new(0.0, 0.0, -1.0);
        let across = Vector3::new(1.0, 0.0, 0.0);
        assert!(approx_eq(uniaxial_anisotropy(&along, 0.5, &axis), -0.5));
        assert!(approx_eq(uniaxial_anisotropy(&across, 0.5, &axis), 0.0));
    }

    #[test]
    fn zeeman_aligns_spin_with_field() {
        let field = Vector3::new(0.0, 0.0, 2.0);
        let up = Vector3::new(0.0, 0.0, 1.0);
        assert!(approx_eq(zeeman(&up, &field), -2.0));
        assert!(approx_eq(zeeman(&-up, &field), 2.0));
    }

    #[test]
    fn exchange_gradient_matches_finite_differences() {
        let a = Vector3::new(0.3, -0.4, 0.5);
        let b = Vector3::new(-0.1, 0.7, 0.2);
        let (ga, gb) = exchange_gradient(&a, &b, 1.7);
        let fa = finite_difference(|x| exchange(x, &b, 1.7), &a);
        let fb = finite_difference(|x| exchange(&a, x, 1.7), &b);
        assert!((ga - fa).norm() < FD_TOLERANCE);
        assert!((gb - fb).norm() < FD_TOLERANCE);
    }

    #[test]
    fn dmi_gradient_matches_finite_differences() {
        let a = Vector3::new(0.3, -0.4, 0.5);
        let b = Vector3::new(-0.1, 0.7, 0.2);
        let d = Vector3::new(0.2, 0.9, -0.4);
        let (ga, gb) = dzyaloshinskii_moriya_gradient(&a, &b, &d);
        let fa = finite_difference(|x| dzyaloshinskii_moriya(x, &b, &d), &a);
        let fb = finite_difference(|x| dzyaloshinskii_moriya(&a, x, &d), &b);
        assert!((ga - fa).norm() < FD_TOLERANCE);
        assert!((gb - fb).norm() < FD_TOLERANCE);
    }

    #[test]
    fn anisotropy_gradient_matches_finite_differences() {
        let s = Vector3::new(0.6, 0.0, 0.8);
        let axis = Vector3::new(0.0, 0.6, 0.8);
        let g = uniaxial_anisotropy_gradient(&s, 0.9, &axis);
        let f = finite_difference(|x| uniaxial_anisotropy(x, 0.9, &axis), &s);
        assert!((g - f).norm() < FD_TOLERANCE);
    }
}
