//! Levenberg-Marquardt for two equations in two unknowns.

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Options {
    /// Relative change of the solution below which the iteration stops.
    pub xtol: f64,
    /// Relative reduction of the sum of squares below which the iteration stops.
    pub ftol: f64,
    /// Orthogonality between residual and Jacobian columns below which the
    /// iteration stops.
    pub gtol: f64,
    pub max_evaluations: usize,
    /// Relative step of the forward differences.
    pub step: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            xtol: 1.49012e-8,
            ftol: 1.49012e-8,
            gtol: 0.0,
            max_evaluations: 600,
            step: f64::EPSILON.sqrt(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub x: [f64; 2],
    pub residual: [f64; 2],
    pub success: bool,
    pub evaluations: usize,
}

fn norm(v: [f64; 2]) -> f64 {
    v[0].hypot(v[1])
}

type Matrix = [[f64; 2]; 2];

fn jacobian(f: &impl Fn([f64; 2]) -> [f64; 2], x: [f64; 2], fx: [f64; 2], step: f64) -> Matrix {
    let mut jac = [[0.0; 2]; 2];
    for j in 0..2 {
        let h = if x[j] == 0.0 { step } else { step * x[j].abs() };
        let mut xh = x;
        xh[j] += h;
        let fh = f(xh);
        for i in 0..2 {
            jac[i][j] = (fh[i] - fx[i]) / h;
        }
    }
    jac
}

/// Solve `(a + lambda diag(a)) d = -g`.
fn damped_step(a: Matrix, g: [f64; 2], lambda: f64) -> Option<[f64; 2]> {
    let scale = |d: f64| if d > 0.0 { d } else { 1.0 };
    let m00 = a[0][0] + lambda * scale(a[0][0]);
    let m11 = a[1][1] + lambda * scale(a[1][1]);
    let m01 = a[0][1];
    let det = m00 * m11 - m01 * m01;
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some([
        -(m11 * g[0] - m01 * g[1]) / det,
        -(m00 * g[1] - m01 * g[0]) / det,
    ])
}

/// Minimise `|f(x)|²` starting from `x0`. Convergence in the sense of the
/// tolerances in `options` does not imply `f(x) = 0`.
pub fn levenberg_marquardt(
    f: impl Fn([f64; 2]) -> [f64; 2],
    x0: [f64; 2],
    options: &Options,
) -> Solution {
    let mut x = x0;
    let mut fx = f(x);
    let mut evaluations = 1;
    let mut lambda: f64 = 1e-3;

    let solution = |x, residual, success, evaluations| Solution {
        x,
        residual,
        success,
        evaluations,
    };

    loop {
        if !fx[0].is_finite() || !fx[1].is_finite() {
            log::debug!("Residual is not finite at {x:?}");
            return solution(x, fx, false, evaluations);
        }
        if norm(fx) == 0.0 {
            return solution(x, fx, true, evaluations);
        }
        if evaluations + 2 > options.max_evaluations {
            log::debug!("Levenberg-Marquardt stopped after {evaluations} evaluations");
            return solution(x, fx, false, evaluations);
        }

        let jac = jacobian(&f, x, fx, options.step);
        evaluations += 2;

        let mut a = [[0.0; 2]; 2];
        let mut g = [0.0; 2];
        for i in 0..2 {
            for j in 0..2 {
                a[i][j] = jac[0][i] * jac[0][j] + jac[1][i] * jac[1][j];
            }
            g[i] = jac[0][i] * fx[0] + jac[1][i] * fx[1];
        }

        let fnorm = norm(fx);
        let columns = [a[0][0].sqrt(), a[1][1].sqrt()];
        let gnorm = (0..2)
            .filter(|&j| columns[j] != 0.0)
            .map(|j| (g[j] / (columns[j] * fnorm)).abs())
            .fold(0.0, f64::max);
        if gnorm <= options.gtol {
            return solution(x, fx, true, evaluations);
        }

        loop {
            if evaluations >= options.max_evaluations {
                log::debug!("Levenberg-Marquardt stopped after {evaluations} evaluations");
                return solution(x, fx, false, evaluations);
            }

            let Some(delta) = damped_step(a, g, lambda) else {
                lambda *= 10.0;
                if lambda > 1e300 {
                    return solution(x, fx, false, evaluations);
                }
                continue;
            };

            let trial = [x[0] + delta[0], x[1] + delta[1]];
            let ft = f(trial);
            evaluations += 1;
            let small_step = norm(delta) <= options.xtol * (norm(x) + options.xtol);

            if ft[0].is_finite() && ft[1].is_finite() && norm(ft) < fnorm {
                let reduction = 1.0 - (norm(ft) / fnorm).powi(2);
                x = trial;
                fx = ft;
                lambda = (lambda / 10.0).max(1e-12);
                if small_step || reduction <= options.ftol {
                    return solution(x, fx, true, evaluations);
                }
                break;
            }

            if small_step {
                return solution(x, fx, true, evaluations);
            }
            lambda *= 10.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_linear_system() {
        let f = |x: [f64; 2]| [2.0 * x[0] + x[1] - 3.0, x[0] - x[1]];
        let result = levenberg_marquardt(f, [10.0, -4.0], &Options::default());
        assert!(result.success);
        assert_abs_diff_eq!(result.x[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(result.x[1], 1.0, epsilon = 1e-8);
    }

    #[test]
    fn complex_square_root() {
        // z² = i written as two real equations
        let f = |x: [f64; 2]| [x[0] * x[0] - x[1] * x[1], 2.0 * x[0] * x[1] - 1.0];
        let result = levenberg_marquardt(f, [1.0, 0.5], &Options::default());
        assert!(result.success);
        let expected = 0.5_f64.sqrt();
        assert_abs_diff_eq!(result.x[0], expected, epsilon = 1e-8);
        assert_abs_diff_eq!(result.x[1], expected, epsilon = 1e-8);
        assert!(norm(result.residual) < 1e-12);
    }

    #[test]
    fn constant_function_converges_without_a_root() {
        let result = levenberg_marquardt(|_| [1.0, 0.0], [0.3, -0.2], &Options::default());
        assert!(result.success);
        assert_eq!(result.residual, [1.0, 0.0]);
    }

    #[test]
    fn evaluation_limit() {
        let options = Options {
            max_evaluations: 4,
            ..Options::default()
        };
        let f = |x: [f64; 2]| [x[0].exp() + 1.0, x[1]];
        let result = levenberg_marquardt(f, [0.0, 1.0], &options);
        assert!(!result.success);
        assert!(result.evaluations <= 4);
    }
}
