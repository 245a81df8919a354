use nalgebra::DVector;

use crate::matrix::LinearSystem;

/*
    Exact means LU solved the system outright. Approximated means the counting matrix was singular or
    close enough to it that we took the least-squares, minimum-norm answer instead. This happens on real
    schedules whenever two teams can't be told apart, e.g. they always played on the same alliance.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    Exact(DVector<f64>),
    Approximated(DVector<f64>),
}

impl Solution {
    pub fn values(&self) -> &DVector<f64> {
        match self {
            Solution::Exact(v) | Solution::Approximated(v) => v,
        }
    }

    pub fn into_values(self) -> DVector<f64> {
        match self {
            Solution::Exact(v) | Solution::Approximated(v) => v,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Solution::Exact(_))
    }
}

pub fn solve(system: &LinearSystem, tolerance: f64) -> Solution {
    if system.is_empty() {
        return Solution::Exact(DVector::zeros(0));
    }

    match solve_exact(system, tolerance) {
        Some(x) => Solution::Exact(x),
        None => Solution::Approximated(solve_least_squares(system, tolerance)),
    }
}

// LU with partial pivoting. Refuses when a pivot is tiny relative to the largest one.
fn solve_exact(system: &LinearSystem, tolerance: f64) -> Option<DVector<f64>> {
    let lu = system.counting_matrix.clone().lu();

    let pivots = lu.u().diagonal().abs();
    let largest = pivots.max();
    if largest == 0.0 || pivots.min() <= largest * tolerance {
        return None;
    }

    let x = lu.solve(&system.totals_vector)?;
    x.iter().all(|v| v.is_finite()).then_some(x)
}

// Minimum-norm least squares through SVD, dropping singular values below tolerance * the largest one
fn solve_least_squares(system: &LinearSystem, tolerance: f64) -> DVector<f64> {
    let svd = system.counting_matrix.clone().svd(true, true);
    let cutoff = svd.singular_values.max() * tolerance;

    match svd.solve(&system.totals_vector, cutoff) {
        Ok(x) if x.iter().all(|v| v.is_finite()) => x,
        // Non-finite input, nothing meaningful to fit
        _ => DVector::zeros(system.len()),
    }
}

pub fn residual_norm(system: &LinearSystem, x: &DVector<f64>) -> f64 {
    (&system.counting_matrix * x - &system.totals_vector).norm()
}
