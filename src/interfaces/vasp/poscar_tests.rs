use approx::assert_abs_diff_eq;

use crate::interfaces::vasp::poscar::parse_poscar;

#[test]
fn test_interfaces_vasp_poscar_direct() {
    let contents = "\
Si2 supercell
1.0
  7.68  0.00  0.00
  0.00  3.84  0.00
  0.00  0.00  3.84
Si
2
Direct
  0.00 0.00 0.00
  0.50 0.00 0.00
";
    let crystal = parse_poscar(contents).unwrap();
    assert_eq!(crystal.natoms(), 2);
    assert_eq!(crystal.symbols(), &["Si".to_string(), "Si".to_string()]);
    assert_abs_diff_eq!(crystal.cell()[(0, 0)], 7.68, epsilon = 1e-12);
    assert_abs_diff_eq!(crystal.fractional_positions()[[1, 0]], 0.5, epsilon = 1e-12);
}

#[test]
fn test_interfaces_vasp_poscar_blank_lines() {
    let contents = "\
Si2 supercell

1.0
  7.68  0.00  0.00
  0.00  3.84  0.00
  0.00  0.00  3.84

Si
2

Direct
  0.00 0.00 0.00
   \t
  0.50 0.00 0.00

";
    let crystal = parse_poscar(contents).unwrap();
    assert_eq!(crystal.natoms(), 2);
    assert_eq!(crystal.symbols(), &["Si".to_string(), "Si".to_string()]);
    assert_abs_diff_eq!(crystal.cell()[(2, 2)], 3.84, epsilon = 1e-12);
    assert_abs_diff_eq!(crystal.fractional_positions()[[0, 0]], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(crystal.fractional_positions()[[1, 0]], 0.5, epsilon = 1e-12);
}

#[test]
fn test_interfaces_vasp_poscar_cartesian_selective_dynamics() {
    let contents = "\
GaAs
2.0
  2.0  0.0  0.0
  0.0  1.0  0.0
  0.0  0.0  1.0
Ga As
1 2
Selective dynamics
Cartesian
  0.0 0.0 0.0 T T T
  1.0 0.0 0.0 F F F
  0.5 0.5 0.5 T T T
";
    let crystal = parse_poscar(contents).unwrap();
    assert_eq!(crystal.natoms(), 3);
    assert_eq!(crystal.symbols()[0], "Ga");
    assert_eq!(crystal.symbols()[2], "As");
    assert_abs_diff_eq!(crystal.cell()[(0, 0)], 4.0, epsilon = 1e-12);
    let frac = crystal.fractional_positions();
    assert_abs_diff_eq!(frac[[1, 0]], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(frac[[2, 0]], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(frac[[2, 1]], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(frac[[2, 2]], 0.5, epsilon = 1e-12);
}

#[test]
fn test_interfaces_vasp_poscar_negative_scale_is_volume() {
    let contents = "\
cubic
-8.0
  1.0 0.0 0.0
  0.0 1.0 0.0
  0.0 0.0 1.0
Po
1
Direct
  0.0 0.0 0.0
";
    let crystal = parse_poscar(contents).unwrap();
    assert_abs_diff_eq!(crystal.cell().determinant(), 8.0, epsilon = 1e-10);
    assert_abs_diff_eq!(crystal.cell()[(1, 1)], 2.0, epsilon = 1e-12);
}

#[test]
fn test_interfaces_vasp_poscar_malformed() {
    let missing_species = "\
old format
1.0
  1.0 0.0 0.0
  0.0 1.0 0.0
  0.0 0.0 1.0
2
Direct
  0.0 0.0 0.0
  0.5 0.0 0.0
";
    assert!(parse_poscar(missing_species).is_err());

    let bad_mode = "\
bad mode
1.0
  1.0 0.0 0.0
  0.0 1.0 0.0
  0.0 0.0 1.0
H
1
Fractional
  0.0 0.0 0.0
";
    assert!(parse_poscar(bad_mode).is_err());

    let truncated = "\
truncated
1.0
  1.0 0.0 0.0
  0.0 1.0 0.0
  0.0 0.0 1.0
H
2
Direct
  0.0 0.0 0.0
";
    assert!(parse_poscar(truncated).is_err());
}
