use std::fs;

use approx::assert_abs_diff_eq;

use crate::interfaces::vasp::procar::{
    format_procar, irrep_output_path, parse_procar, read_procar, ProcarLayout, WeightBlockKind,
};

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("{ROOT}/tests/data/{name}")).unwrap()
}

fn layout_of(contents: &str) -> ProcarLayout {
    let lines = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    ProcarLayout::resolve(&lines).unwrap()
}

#[test]
fn test_interfaces_vasp_procar_layout() {
    let layout = layout_of(&fixture("PROCAR"));
    assert_eq!(layout.npoints, 2);
    assert_eq!(layout.nbands, 2);
    assert_eq!(layout.nions, 2);
    assert_eq!(layout.orbitals, vec!["s", "py", "pz", "px"]);
    assert_eq!(layout.nspin, 1);
    assert_eq!(layout.weight_kind, WeightBlockKind::Collinear);
    assert!(layout.has_phase);

    let layout = layout_of(&fixture("PROCAR_spin"));
    assert_eq!(layout.nspin, 2);
    assert!(!layout.has_phase);

    let layout = layout_of(&fixture("PROCAR_ncl"));
    assert_eq!(layout.weight_kind, WeightBlockKind::NonCollinear);
    assert_eq!(layout.weight_kind.nblocks(), 4);
}

#[test]
fn test_interfaces_vasp_procar_collinear_with_phases() {
    let bs = read_procar(format!("{ROOT}/tests/data/PROCAR")).unwrap();
    assert_eq!(bs.npoints(), 2);
    assert_eq!(bs.nbands(), 2);
    assert_eq!(bs.nspin(), 1);
    assert_eq!(bs.nions(), 2);
    assert_eq!(bs.norbitals(), 4);
    assert_eq!(bs.ndim(), 1);

    assert_abs_diff_eq!(bs.kpoints()[[1, 0]], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.kweights()[1], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.energies()[[0, 1, 0]], -2.5, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.occupancies()[[0, 0, 0]], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.occupancies()[[0, 1, 0]], 0.0, epsilon = 1e-12);

    // Second ion, `py` orbital, first k-point, second band.
    assert_abs_diff_eq!(bs.weights()[[0, 5, 1, 0, 0]], 0.07, epsilon = 1e-12);
    let phases = bs.phases().unwrap();
    assert_abs_diff_eq!(phases[[0, 5, 1, 0]].re, 0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(phases[[0, 5, 1, 0]].im, -0.05, epsilon = 1e-12);
    assert_abs_diff_eq!(phases[[1, 0, 0, 0]].re, 0.15, epsilon = 1e-12);
}

#[test]
fn test_interfaces_vasp_procar_spin_polarised() {
    let bs = parse_procar(&fixture("PROCAR_spin")).unwrap();
    assert_eq!(bs.nspin(), 2);
    assert!(!bs.has_phases());
    assert_abs_diff_eq!(bs.energies()[[0, 0, 0]], -5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.energies()[[0, 0, 1]], -4.5, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.weights()[[0, 0, 0, 0, 1]], 0.02, epsilon = 1e-12);
}

#[test]
fn test_interfaces_vasp_procar_non_collinear() {
    let bs = parse_procar(&fixture("PROCAR_ncl")).unwrap();
    assert_eq!(bs.ndim(), 4);
    assert_abs_diff_eq!(bs.weights()[[0, 0, 0, 3, 0]], 0.04, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.weights()[[0, 4, 0, 2, 0]], 0.04, epsilon = 1e-12);
    assert!(bs.has_phases());
}

#[test]
fn test_interfaces_vasp_procar_merged_kpoint_coordinates() {
    let bs = parse_procar(&fixture("PROCAR_merged")).unwrap();
    assert_abs_diff_eq!(bs.kpoints()[[0, 0]], -0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.kpoints()[[0, 1]], -0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.kpoints()[[0, 2]], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(bs.kweights()[0], 0.25, epsilon = 1e-12);
}

#[test]
fn test_interfaces_vasp_procar_overflowed_fields() {
    let contents = fixture("PROCAR").replacen("0.070  0.160", "*****  0.160", 1);
    let err = parse_procar(&contents).unwrap_err();
    assert!(format!("{err:#}").contains("overflowed"));
}

#[test]
fn test_interfaces_vasp_procar_truncated() {
    let contents = fixture("PROCAR");
    let truncated = contents.lines().take(30).collect::<Vec<_>>().join("\n");
    assert!(parse_procar(&truncated).is_err());
}

#[test]
fn test_interfaces_vasp_procar_write_round_trip() {
    for name in ["PROCAR", "PROCAR_spin", "PROCAR_ncl"] {
        let contents = fixture(name);
        let bs = parse_procar(&contents).unwrap();
        let mut buffer = Vec::<u8>::new();
        format_procar(&mut buffer, &bs).unwrap();
        let written = String::from_utf8(buffer).unwrap();
        assert_eq!(written, contents, "{name} is not reproduced verbatim.");

        let reread = parse_procar(&written).unwrap();
        assert_eq!(reread.weights(), bs.weights());
        assert_eq!(reread.phases(), bs.phases());
    }
}

#[test]
fn test_interfaces_vasp_procar_irrep_output_path() {
    assert_eq!(
        irrep_output_path("out/PROCAR", 3).to_str().unwrap(),
        "out/PROCAR.irrep.3"
    );
}
