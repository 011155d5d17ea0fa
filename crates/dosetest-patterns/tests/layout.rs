use dosetest_core::{GeomPrimitive, Point};
use dosetest_patterns::angled::{angle_pairs, AnglePairConfig};
use dosetest_patterns::assembly::{CHECKERBOARD, TOP, VERTICAL_LINES};
use dosetest_patterns::bend::{bend_paths, BendConfig};
use dosetest_patterns::lines::{line_array, LineArrayConfig, Orientation};
use dosetest_patterns::{bend_library, pattern_library, BendSetConfig, PatternSetConfig};

const EPS: f64 = 1e-9;

#[test]
fn default_lines_edges() {
    let rects = line_array(&LineArrayConfig::default(), Orientation::Vertical);
    let near: Vec<f64> = rects.iter().map(|r| r.lower_left.x).collect();
    let far: Vec<f64> = rects.iter().map(|r| r.upper_right.x).collect();
    for (i, (n, f)) in near.iter().zip(&far).enumerate() {
        assert!((n - 2.0 * i as f64).abs() < EPS);
        assert!((f - (2.0 * i as f64 + 1.0)).abs() < EPS);
    }
    assert_eq!(near.len(), 10);
}

#[test]
fn angle_pairs_hinge_on_shared_corner() {
    for pair in angle_pairs(&AnglePairConfig::default()) {
        let hinge = pair.second.vertices[0];
        assert!(
            hinge.distance_to(&pair.pivot()) < EPS,
            "pair at {}° is not hinged",
            pair.angle_deg
        );
    }
}

#[test]
fn top_flattens_groups_at_their_rows() {
    let cfg = PatternSetConfig::default();
    let lib = pattern_library(&cfg).unwrap();
    let top = lib.find_cell_by_name(TOP).unwrap().id;
    let flat = lib.flatten(&top).unwrap();

    // vertical lines come first, lifted by three rows
    match &flat[0] {
        GeomPrimitive::Rect(r) => {
            assert!((r.lower_left.y - 3.0 * cfg.cell_pitch).abs() < EPS);
            assert!((r.upper_right.y - (3.0 * cfg.cell_pitch + 50.0)).abs() < EPS);
        }
        other => panic!("expected a line, got {other:?}"),
    }

    let vertical = lib.find_cell_by_name(VERTICAL_LINES).unwrap();
    let board = lib.find_cell_by_name(CHECKERBOARD).unwrap();
    let last = flat.last().unwrap().bbox().unwrap();
    let local_last = board.geometries.last().unwrap().bbox().unwrap();
    assert!(last.min.distance_to(&local_last.min) < EPS);
    assert_eq!(vertical.geometry_count(), 10);
    assert_eq!(flat.len(), 10 + 10 + 14 + 18);
}

#[test]
fn bend_shapes_end_above_their_arcs() {
    let cfg = BendConfig::default();
    let stacking = cfg.effective_stacking();
    for (i, (path, r)) in bend_paths(&cfg).iter().zip(cfg.radii()).enumerate() {
        let start_y = cfg.start.y + i as f64 * stacking;
        let expected = Point::new(
            cfg.start.x + cfg.segment_length + r,
            start_y + r + cfg.tail_length,
        );
        assert!(path.end_point().distance_to(&expected) < 1e-9);
    }
}

#[test]
fn default_bend_library_is_clear() {
    let lib = bend_library(&BendSetConfig::default());
    let cell = lib.top().unwrap();
    let paths: Vec<_> = cell
        .geometries
        .iter()
        .filter_map(|g| match g {
            GeomPrimitive::Path(p) => Some(p.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(paths.len(), 6);
    assert!(dosetest_patterns::bend::overlapping_shapes(&paths).is_empty());
}
