//! Internal root-finding utilities for implied volatility inversion.

/// Configuration for the bracketing Brent solver.
pub(crate) struct BrentConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence threshold on bracket width.
    pub tol: f64,
}

/// Outcome of a Brent search that started from a valid sign-changing bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BrentResult {
    /// Best root estimate.
    pub root: f64,
    /// Evaluations of `f` beyond the two bracket endpoints.
    pub iterations: usize,
    /// Whether the bracket shrank below tolerance (or an exact zero was hit).
    pub converged: bool,
}

/// Find a root of `f` inside `[lo, hi]` with Brent's method.
///
/// Caller guarantees `f_lo = f(lo)` and `f_hi = f(hi)` have opposite signs.
/// Combines bisection, secant and inverse quadratic interpolation; the
/// bracket `[b, c]` always contains the root. Stops when half the bracket
/// width drops below `tol / 2` (plus a relative machine-epsilon term) or
/// after `max_iter` evaluations, whichever comes first.
pub(crate) fn brent<F>(
    f: F,
    lo: f64,
    hi: f64,
    f_lo: f64,
    f_hi: f64,
    config: &BrentConfig,
) -> BrentResult
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (lo, hi);
    let (mut fa, mut fb) = (f_lo, f_hi);
    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for iter in 1..=config.max_iter {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            // Root lies in [a, b]: reset the contrapoint.
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            // Passes before this one each evaluated `f` once.
            return BrentResult {
                root: b,
                iterations: iter - 1,
                converged: true,
            };
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant step
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let qq = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qq * (qq - r) - (b - a) * (r - 1.0)),
                    (qq - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                // Interpolation rejected, bisect
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b);
    }

    BrentResult {
        root: b,
        iterations: config.max_iter,
        converged: false,
    }
}
