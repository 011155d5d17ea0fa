//! Post-export check: compare a library with what a GDS-II file read back.

use dosetest_core::Library;

/// A difference between the generated and the re-read library.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    CellOrder { expected: Vec<String>, found: Vec<String> },
    ElementCount { cell: String, expected: usize, found: usize },
    ReferenceCount { cell: String, expected: usize, found: usize },
    ReferenceTarget { cell: String, expected: String, found: String },
    ReferenceOffset { cell: String, target: String, error_um: f64 },
    TopCell { expected: Option<String>, found: Option<String> },
}

/// Compare structure and placements; coordinates may differ by up to
/// `tolerance_um` (grid snapping).
pub fn compare_libraries(expected: &Library, found: &Library, tolerance_um: f64) -> Vec<Mismatch> {
    let mut out = Vec::new();

    let exp_names: Vec<String> = expected.cell_names().iter().map(|s| s.to_string()).collect();
    let found_names: Vec<String> = found.cell_names().iter().map(|s| s.to_string()).collect();
    if exp_names != found_names {
        out.push(Mismatch::CellOrder {
            expected: exp_names,
            found: found_names,
        });
        return out;
    }

    let top_name = |lib: &Library| lib.top().map(|c| c.name.clone());
    if top_name(expected) != top_name(found) {
        out.push(Mismatch::TopCell {
            expected: top_name(expected),
            found: top_name(found),
        });
    }

    for (a, b) in expected.all_cells().zip(found.all_cells()) {
        if a.geometry_count() != b.geometry_count() {
            out.push(Mismatch::ElementCount {
                cell: a.name.clone(),
                expected: a.geometry_count(),
                found: b.geometry_count(),
            });
        }
        if a.instance_count() != b.instance_count() {
            out.push(Mismatch::ReferenceCount {
                cell: a.name.clone(),
                expected: a.instance_count(),
                found: b.instance_count(),
            });
            continue;
        }
        for (ia, ib) in a.instances.iter().zip(&b.instances) {
            if ia.cell_name != ib.cell_name {
                out.push(Mismatch::ReferenceTarget {
                    cell: a.name.clone(),
                    expected: ia.cell_name.clone(),
                    found: ib.cell_name.clone(),
                });
                continue;
            }
            let error_um = ia.transform.offset.distance_to(&ib.transform.offset);
            if error_um > tolerance_um {
                out.push(Mismatch::ReferenceOffset {
                    cell: a.name.clone(),
                    target: ia.cell_name.clone(),
                    error_um,
                });
            }
        }
    }

    out
}
