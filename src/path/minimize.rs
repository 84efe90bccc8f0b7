//! Bounded scalar minimisation (Brent's method)
//!
//! Golden-section search with parabolic interpolation steps, restricted to a
//! closed interval. Finds a local minimum; callers that need the global one
//! seed the interval from a coarse scan.

const GOLDEN: f64 = 0.381_966_011_250_105_1; // (3 - sqrt(5)) / 2
const SQRT_EPS: f64 = 1.490_116_119_384_765_6e-8;

/// Result of [`minimize_bounded`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub value: f64,
    pub evaluations: usize,
}

#[inline]
fn sign_or_one(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

/// Minimise `f` on `[lower, upper]` to an absolute tolerance `xtol`
///
/// An empty or inverted interval returns `lower` without iterating.
pub fn minimize_bounded<F>(mut f: F, lower: f64, upper: f64, xtol: f64, max_evaluations: usize) -> Minimum
where
    F: FnMut(f64) -> f64,
{
    if !(upper > lower) {
        return Minimum {
            x: lower,
            value: f(lower),
            evaluations: 1,
        };
    }

    let (mut a, mut b) = (lower, upper);
    let mut fulc = a + GOLDEN * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat = 0.0_f64;
    let mut e = 0.0_f64;

    let mut fx = f(xf);
    let mut evaluations = 1;
    let mut ffulc = fx;
    let mut fnfc = fx;

    let mut xm = 0.5 * (a + b);
    let mut tol1 = SQRT_EPS * xf.abs() + xtol / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;

        if e.abs() > tol1 {
            golden = false;
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                // Parabolic step
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * sign_or_one(xm - xf);
                }
            } else {
                golden = true;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = GOLDEN * e;
        }

        let x = xf + sign_or_one(rat) * rat.abs().max(tol1);
        let fu = f(x);
        evaluations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = SQRT_EPS * xf.abs() + xtol / 3.0;
        tol2 = 2.0 * tol1;

        if evaluations >= max_evaluations {
            log::debug!("minimize_bounded hit {} evaluations", evaluations);
            break;
        }
    }

    Minimum {
        x: xf,
        value: fx,
        evaluations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_interior_minimum() {
        let m = minimize_bounded(|x| (x - 1.3).powi(2) + 2.0, -5.0, 5.0, 1e-8, 500);
        assert!((m.x - 1.3).abs() < 1e-6);
        assert!((m.value - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_minimum_on_boundary() {
        let m = minimize_bounded(|x| x, 2.0, 7.0, 1e-6, 500);
        assert!((m.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_non_smooth_minimum() {
        let m = minimize_bounded(|x: f64| (x - 0.25).abs(), 0.0, 1.0, 1e-6, 500);
        assert!((m.x - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_empty_interval_returns_lower() {
        let m = minimize_bounded(|x| x * x, 3.0, 3.0, 1e-6, 500);
        assert_eq!(m.x, 3.0);
        let m = minimize_bounded(|x| x * x, 3.0, 1.0, 1e-6, 500);
        assert_eq!(m.x, 3.0);
    }

    #[test]
    fn test_evaluation_cap() {
        let m = minimize_bounded(|x| x.sin(), 0.0, 100.0, 1e-12, 5);
        assert!(m.evaluations <= 5);
    }
}
