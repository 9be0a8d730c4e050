//! Intercept solver for fixed-speed interceptors.
//!
//! Finds the earliest time at which a straight-line interceptor flight from a
//! launch point meets a threat assumed to keep its current velocity, and the
//! point where that happens.

use glam::DVec3;

use sentinel_core::constants::{SOLVER_EPSILON, SOLVER_MIN_TIME};
use sentinel_core::enums::InfeasibleReason;
use sentinel_core::types::{Position, Velocity};

/// A feasible intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptSolution {
    /// Predicted meeting point.
    pub point: Position,
    /// Flight time from the launch point (seconds).
    pub time_secs: f64,
}

/// Solve `|p + v t - o| = s t` for the smallest positive `t`.
///
/// Expands to `a t² + b t + c = 0` with `a = |v|² - s²`, `b = 2 r·v`,
/// `c = |r|²`, `r = p - o`. Infeasibility is a normal outcome and is returned
/// as the reason, never as NaN.
pub fn solve_intercept(
    threat_position: &Position,
    threat_velocity: &Velocity,
    origin: &Position,
    speed: f64,
    max_range: f64,
) -> Result<InterceptSolution, InfeasibleReason> {
    let p = threat_position.as_dvec3();
    let v = threat_velocity.as_dvec3();
    let o = origin.as_dvec3();
    if !p.is_finite() || !v.is_finite() || !o.is_finite() {
        return Err(InfeasibleReason::Degenerate);
    }
    if !speed.is_finite() || speed <= 0.0 || max_range.is_nan() {
        return Err(InfeasibleReason::Degenerate);
    }

    let r = p - o;
    let vv = v.length_squared();
    let ss = speed * speed;
    let a = vv - ss;
    let b = 2.0 * r.dot(v);
    let c = r.length_squared();

    let time = if a.abs() <= SOLVER_EPSILON * (vv + ss) {
        solve_linear(b, c, r, v)?
    } else {
        solve_quadratic(a, b, c)?
    };
    if !time.is_finite() {
        return Err(InfeasibleReason::Degenerate);
    }

    let point = p + v * time;
    if !point.is_finite() {
        return Err(InfeasibleReason::Degenerate);
    }
    if point.distance(o) > max_range {
        return Err(InfeasibleReason::OutOfRange);
    }

    Ok(InterceptSolution {
        point: Position::from_dvec3(point),
        time_secs: time,
    })
}

/// Threat and interceptor speeds match: `b t + c = 0`.
fn solve_linear(b: f64, c: f64, r: DVec3, v: DVec3) -> Result<f64, InfeasibleReason> {
    let scale = 2.0 * r.length() * v.length();
    if b == 0.0 || b.abs() <= SOLVER_EPSILON * scale {
        return Err(InfeasibleReason::Degenerate);
    }
    let t = -c / b;
    if t > SOLVER_MIN_TIME {
        Ok(t)
    } else {
        Err(InfeasibleReason::NoPositiveRoot)
    }
}

fn solve_quadratic(a: f64, b: f64, c: f64) -> Result<f64, InfeasibleReason> {
    let four_ac = 4.0 * a * c;
    let mut disc = b * b - four_ac;
    if disc < 0.0 {
        if disc < -SOLVER_EPSILON * (b * b + four_ac.abs()) {
            return Err(InfeasibleReason::NoRealRoot);
        }
        disc = 0.0;
    }

    // q = -(b + sign(b) √d) / 2 never subtracts nearly equal values.
    let sign = if b < 0.0 { -1.0 } else { 1.0 };
    let q = -0.5 * (b + sign * disc.sqrt());

    let mut roots = [f64::NAN; 2];
    roots[0] = q / a;
    if q != 0.0 {
        roots[1] = c / q;
    }

    roots
        .into_iter()
        .filter(|t| t.is_finite() && *t > SOLVER_MIN_TIME)
        .min_by(f64::total_cmp)
        .ok_or(InfeasibleReason::NoPositiveRoot)
}
