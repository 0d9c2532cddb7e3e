use crate::point::Point;
use crate::space::SearchSpace;
use crate::Coord;
use rand::Rng;

/// Smooth a path by attempting to connect nodes directly.
///
/// For each node, this attempts to connect to the furthest node that is
/// still reachable without collision. Not guaranteed to find the shortest
/// shortcut, but runs in a single linear pass.
///
/// Parameters:
/// - `path`: The path to smooth.
/// - `space`: The space whose obstacles constrain shortcuts.
/// - `r`: The collision sampling resolution along candidate edges.
///
/// Returns:
/// The smoothed path.
pub fn fast_shortcutting<F: Coord, const N: usize>(
    path: &[Point<F, N>],
    space: &SearchSpace<F, N>,
    r: F,
) -> Vec<Point<F, N>> {
    if path.len() < 3 {
        return path.to_vec();
    }
    let mut smoothed = vec![path[0]];
    let mut last_valid = 0;
    for i in 1..path.len() {
        if !space.collision_free(&smoothed[last_valid], &path[i], r) {
            smoothed.push(path[i - 1]);
            last_valid = smoothed.len() - 1;
        }
    }
    smoothed.push(path[path.len() - 1]);
    smoothed
}

/// Select two random non-adjacent path positions and, when the direct edge
/// between them is collision-free, drop everything in between. Repeated
/// `num_tries` times.
pub fn shortcut_path<F: Coord, const N: usize, R: Rng + ?Sized>(
    path: &mut Vec<Point<F, N>>,
    space: &SearchSpace<F, N>,
    r: F,
    num_tries: usize,
    rng: &mut R,
) {
    for _ in 0..num_tries {
        if path.len() < 3 {
            return;
        }
        let ind1 = rng.gen_range(0..path.len() - 2);
        let ind2 = rng.gen_range(ind1 + 2..path.len());
        if space.collision_free(&path[ind1], &path[ind2], r) {
            path.drain(ind1 + 1..ind2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Hyperrect;
    use crate::distance::path_length;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn walled_space() -> SearchSpace<f64, 2> {
        // A wall with a gap at the top.
        let wall = Hyperrect::new([40.0, 0.0], [60.0, 80.0]).unwrap();
        SearchSpace::new([(0.0, 100.0); 2], vec![wall]).unwrap()
    }

    fn detour() -> Vec<Point<f64, 2>> {
        vec![
            Point::new([10.0, 10.0]),
            Point::new([15.0, 40.0]),
            Point::new([20.0, 70.0]),
            Point::new([50.0, 90.0]),
            Point::new([80.0, 70.0]),
            Point::new([85.0, 40.0]),
            Point::new([90.0, 10.0]),
        ]
    }

    #[test]
    fn fast_shortcutting_shortens_and_stays_valid() {
        let space = walled_space();
        let path = detour();
        let smoothed = fast_shortcutting(&path, &space, 0.5);
        assert_eq!(smoothed.first(), path.first());
        assert_eq!(smoothed.last(), path.last());
        assert!(path_length(&smoothed) <= path_length(&path));
        for pair in smoothed.windows(2) {
            assert!(space.collision_free(&pair[0], &pair[1], 0.5));
        }
    }

    #[test]
    fn shortcut_path_keeps_endpoints() {
        let space = walled_space();
        let mut path = detour();
        let original = path.clone();
        let mut rng = StdRng::seed_from_u64(11);
        shortcut_path(&mut path, &space, 0.5, 64, &mut rng);
        assert_eq!(path.first(), original.first());
        assert_eq!(path.last(), original.last());
        assert!(path_length(&path) <= path_length(&original));
        for pair in path.windows(2) {
            assert!(space.collision_free(&pair[0], &pair[1], 0.5));
        }
    }

    #[test]
    fn short_paths_are_untouched() {
        let space = walled_space();
        let short = vec![Point::new([0.0, 0.0]), Point::new([10.0, 0.0])];
        assert_eq!(fast_shortcutting(&short, &space, 0.5), short);
        let mut owned = short.clone();
        let mut rng = StdRng::seed_from_u64(12);
        shortcut_path(&mut owned, &space, 0.5, 8, &mut rng);
        assert_eq!(owned, short);
    }
}
