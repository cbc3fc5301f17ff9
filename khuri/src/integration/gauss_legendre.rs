use std::f64::consts::PI;

const PRECISION_GOAL: f64 = 1e-15;
const MAX_ITERATIONS: usize = 100;

/// Nodes and weights of the n-point Gauss-Legendre rule on `[-1, 1]`, in
/// ascending order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

/// `P_n(x)` and `P_n'(x)`.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let k = k as f64;
        let p2 = ((2.0 * k - 1.0) * x * p1 - (k - 1.0) * p0) / k;
        p0 = p1;
        p1 = p2;
    }
    let n = n as f64;
    (p1, n * (x * p1 - p0) / (x * x - 1.0))
}

impl GaussLegendre {
    pub fn new(points: usize) -> Self {
        let mut nodes = vec![0.0; points];
        let mut weights = vec![0.0; points];

        for i in 0..(points + 1) / 2 {
            let mut x = (PI * (i as f64 + 0.75) / (points as f64 + 0.5)).cos();
            for _ in 0..MAX_ITERATIONS {
                let (p, dp) = legendre(points, x);
                let dx = p / dp;
                x -= dx;
                if dx.abs() < PRECISION_GOAL {
                    break;
                }
            }
            let (_, dp) = legendre(points, x);
            let w = 2.0 / ((1.0 - x * x) * dp * dp);
            nodes[i] = -x;
            nodes[points - 1 - i] = x;
            weights[i] = w;
            weights[points - 1 - i] = w;
        }
        if points % 2 == 1 {
            nodes[points / 2] = 0.0;
        }

        Self { nodes, weights }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node `i` and its weight, mapped to `[start, end]`.
    pub fn point(&self, start: f64, end: f64, i: usize) -> Option<(f64, f64)> {
        let x = self.nodes.get(i)?;
        let w = self.weights.get(i)?;
        let half = 0.5 * (end - start);
        Some((start + half * (1.0 + x), half * w))
    }

    /// All nodes and weights mapped to `[start, end]`.
    pub fn points(&self, start: f64, end: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let half = 0.5 * (end - start);
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(move |(x, w)| (start + half * (1.0 + x), half * w))
    }

    pub fn integrate(&self, f: impl Fn(f64) -> f64, start: f64, end: f64) -> f64 {
        self.points(start, end).map(|(x, w)| w * f(x)).sum()
    }
}
