//! Per-frame movement toward authoritative targets.
//!
//! Authoritative positions arrive sparsely and may jump; the rendered
//! position approaches them along a straight line at a fixed speed. The
//! step is clamped to the remaining distance, so a single tick can never
//! overshoot, and repeated ticks strictly decrease the distance until it
//! falls under the arrival epsilon.

/// Agent movement speed, units per second.
pub const MOVE_SPEED: f32 = 5.0;

/// Upper bound on the wall-clock delta fed into a tick. Keeps agents from
/// teleporting after a stall (e.g. a backgrounded window).
pub const MAX_TICK_DELTA: f32 = 0.1;

/// Distance under which an agent counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 0.01;

pub fn clamp_tick_delta(dt: f32) -> f32 {
    dt.clamp(0.0, MAX_TICK_DELTA)
}

/// Advance `current` toward `target` by at most `speed * dt`.
///
/// Returns the new position and, when the agent actually moved this tick,
/// the unit direction of travel (for orienting the visual).
pub fn step_toward(
    current: [f32; 3],
    target: [f32; 3],
    speed: f32,
    dt: f32,
) -> ([f32; 3], Option<[f32; 3]>) {
    let delta = [
        target[0] - current[0],
        target[1] - current[1],
        target[2] - current[2],
    ];
    let distance = (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2]).sqrt();
    if distance <= ARRIVAL_EPSILON {
        return (current, None);
    }

    let step = (speed * dt).min(distance);
    if step <= 0.0 {
        return (current, None);
    }
    let dir = [delta[0] / distance, delta[1] / distance, delta[2] / distance];
    (
        [
            current[0] + dir[0] * step,
            current[1] + dir[1] * step,
            current[2] + dir[2] * step,
        ],
        Some(dir),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(a: [f32; 3], b: [f32; 3]) -> f32 {
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
    }

    #[test]
    fn test_delta_clamp() {
        assert_eq!(clamp_tick_delta(0.016), 0.016);
        assert_eq!(clamp_tick_delta(3.0), MAX_TICK_DELTA);
        assert_eq!(clamp_tick_delta(-1.0), 0.0);
    }

    #[test]
    fn test_no_overshoot_even_with_huge_delta() {
        let target = [1.0, 0.0, 0.0];
        // Unclamped 100s delta would travel 500 units; must stop at target.
        let (pos, dir) = step_toward([0.0, 0.0, 0.0], target, MOVE_SPEED, 100.0);
        assert_eq!(pos, target);
        assert_eq!(dir, Some([1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_convergence_within_bounded_ticks() {
        let start = [0.0, 0.5, 0.0];
        let target = [10.0, 0.5, -5.0];
        let initial = dist(start, target);
        let bound = (initial / (MOVE_SPEED * MAX_TICK_DELTA)).ceil() as usize;

        let mut pos = start;
        let mut prev = initial;
        let mut ticks = 0;
        while dist(pos, target) > ARRIVAL_EPSILON {
            let (next, _) = step_toward(pos, target, MOVE_SPEED, MAX_TICK_DELTA);
            let d = dist(next, target);
            assert!(d < prev, "distance must strictly decrease: {d} vs {prev}");
            pos = next;
            prev = d;
            ticks += 1;
            assert!(ticks <= bound + 1, "did not converge within {bound} ticks");
        }
    }

    #[test]
    fn test_arrived_agent_stays_put() {
        let target = [3.0, 0.5, 3.0];
        let (pos, dir) = step_toward(target, target, MOVE_SPEED, MAX_TICK_DELTA);
        assert_eq!(pos, target);
        assert_eq!(dir, None);

        // Within epsilon also counts as arrived.
        let near = [3.0, 0.5, 3.0 + ARRIVAL_EPSILON * 0.5];
        let (pos, dir) = step_toward(near, target, MOVE_SPEED, MAX_TICK_DELTA);
        assert_eq!(pos, near);
        assert_eq!(dir, None);
    }

    #[test]
    fn test_zero_delta_reports_no_movement() {
        let (pos, dir) = step_toward([0.0; 3], [5.0, 0.0, 0.0], MOVE_SPEED, 0.0);
        assert_eq!(pos, [0.0; 3]);
        assert_eq!(dir, None);
    }

    #[test]
    fn test_retarget_mid_transit_redirects() {
        let (pos, _) = step_toward([0.0; 3], [10.0, 0.0, 0.0], MOVE_SPEED, MAX_TICK_DELTA);
        // New authoritative target arrives; next tick heads there instead.
        let (_, dir) = step_toward(pos, [pos[0], 0.0, 10.0], MOVE_SPEED, MAX_TICK_DELTA);
        assert_eq!(dir, Some([0.0, 0.0, 1.0]));
    }
}
