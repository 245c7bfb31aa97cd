use std::str::FromStr;

use approx::assert_abs_diff_eq;
use nalgebra::Matrix3;
use ndarray::{array, Array1, Array2, Array3, Array4};
use num::Complex;

use crate::auxiliary::crystal::Crystal;
use crate::drivers::unfolding::{UnfoldingDriver, UnfoldingParams};
use crate::drivers::UnfoldDriver;
use crate::error::UnfoldingError;
use crate::group::FractionalTranslation;
use crate::target::band_structure::BandStructure;

fn tgens(generators: &[&str]) -> Vec<FractionalTranslation> {
    generators
        .iter()
        .map(|g| FractionalTranslation::from_str(g).unwrap())
        .collect()
}

fn crystal(positions: Array2<f64>) -> Crystal {
    let natoms = positions.nrows();
    Crystal::builder()
        .cell(Matrix3::from_diagonal_element(4.0))
        .fractional_positions(positions)
        .symbols(vec!["C".to_string(); natoms])
        .build()
        .unwrap()
}

/// Two sites with one `s` and one `p` orbital each. The first band is symmetric under the
/// exchange of the two sites and the second band is antisymmetric.
fn band_structure(with_phases: bool) -> BandStructure {
    let (npoints, nbands, nspin, m) = (1, 2, 1, 4);
    let phases = Array4::from_shape_fn((npoints, m, nbands, nspin), |(_, i, b, _)| {
        let site_sign = if b == 1 && i >= 2 { -1.0 } else { 1.0 };
        let orbital = Complex::new(0.3 + 0.1 * (i % 2) as f64, -0.2);
        orbital * site_sign
    });
    let weights = phases
        .mapv(|c| c.norm_sqr())
        .into_shape((npoints, m, nbands, 1, nspin))
        .unwrap();
    let mut builder = BandStructure::builder();
    builder
        .orbitals(vec!["s".to_string(), "p".to_string()])
        .kpoints(array![[0.0, 0.0, 0.0]])
        .kweights(Array1::ones(npoints))
        .energies(array![[[-1.0], [1.0]]])
        .occupancies(Array3::from_shape_fn((npoints, nbands, nspin), |(_, b, _)| {
            if b == 0 {
                1.0
            } else {
                0.0
            }
        }))
        .weights(weights);
    if with_phases {
        builder.phases(Some(phases));
    }
    builder.build().unwrap()
}

#[test]
fn test_drivers_unfolding_params() {
    let params = UnfoldingParams::default();
    assert!(params.translation_generators.is_empty());
    assert_eq!(params.distance_threshold, 1e-6);
    assert!(!params.check_mapping);
    assert!(!params.all_irreps);
    assert_eq!(params.phase_regulariser, 1e-4);

    assert!(UnfoldingParams::builder()
        .translation_generators(&tgens(&["1/2,0,0", "0,1/2,0", "0,0,1/2", "1/2,1/2,0"]))
        .build()
        .is_err());
    assert!(UnfoldingParams::builder()
        .distance_threshold(-1e-3)
        .build()
        .is_err());
    assert!(UnfoldingParams::builder()
        .phase_regulariser(0.0)
        .build()
        .is_err());

    let params: UnfoldingParams = serde_yaml::from_str(
        "translation_generators: [\"1/2,0,0\", \"0,1/3,0\"]\ncheck_mapping: true\n",
    )
    .unwrap();
    assert_eq!(params.translation_generators, tgens(&["1/2,0,0", "0,1/3,0"]));
    assert!(params.check_mapping);
    assert_eq!(params.distance_threshold, 1e-6);
    assert!(params.to_string().contains("1/3"));
}

#[test]
fn test_drivers_unfolding_trivial_group() {
    let params = UnfoldingParams::default();
    let crystal = crystal(array![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]);
    let bs = band_structure(true);
    let mut driver = UnfoldingDriver::builder()
        .parameters(&params)
        .crystal(&crystal)
        .band_structure(&bs)
        .build()
        .unwrap();
    assert!(driver.result().is_err());
    driver.run().unwrap();

    let res = driver.result().unwrap();
    assert_eq!(res.group.order(), 1);
    assert_eq!(res.unfolded.len(), 1);
    let unfolded = res.irrep(0).unwrap();
    assert_eq!(unfolded.phases(), bs.phases());
    assert_eq!(unfolded.energies(), bs.energies());
    let delta = params.phase_regulariser;
    let phases = bs.phases().unwrap();
    for ((p, i, b, d, s), w) in unfolded.weights().indexed_iter() {
        let c = phases[[p, i, b, s]].norm();
        assert_abs_diff_eq!(
            *w,
            bs.weights()[[p, i, b, d, s]] * c / (c + delta),
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_drivers_unfolding_half_translation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let crystal = crystal(array![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]);
    let bs = band_structure(true);

    let params = UnfoldingParams::builder()
        .translation_generators(&tgens(&["1/2,0,0"]))
        .build()
        .unwrap();
    let mut driver = UnfoldingDriver::builder()
        .parameters(&params)
        .crystal(&crystal)
        .band_structure(&bs)
        .build()
        .unwrap();
    driver.run().unwrap();
    let res = driver.result().unwrap();
    assert_eq!(res.group.order(), 2);
    assert_eq!(res.unfolded.len(), 1);
    assert!(res.irrep(1).is_none());

    let params = UnfoldingParams::builder()
        .translation_generators(&tgens(&["1/2,0,0"]))
        .all_irreps(true)
        .build()
        .unwrap();
    let mut driver = UnfoldingDriver::builder()
        .parameters(&params)
        .crystal(&crystal)
        .band_structure(&bs)
        .build()
        .unwrap();
    driver.run().unwrap();
    let res = driver.result().unwrap();
    assert_eq!(res.unfolded.len(), 2);

    let folded = bs.phases().unwrap();
    let symmetric = res.irrep(0).unwrap();
    let antisymmetric = res.irrep(1).unwrap();
    let sym_phases = symmetric.phases().unwrap();
    let anti_phases = antisymmetric.phases().unwrap();
    for (idx, phase) in folded.indexed_iter() {
        let total = sym_phases[idx] + anti_phases[idx];
        assert_abs_diff_eq!(total.re, phase.re, epsilon = 1e-12);
        assert_abs_diff_eq!(total.im, phase.im, epsilon = 1e-12);
    }

    // The symmetric band lies entirely in the totally symmetric irrep and the antisymmetric
    // band entirely in the other one.
    for i in 0..4 {
        assert_abs_diff_eq!(
            (sym_phases[[0, i, 0, 0]] - folded[[0, i, 0, 0]]).norm(),
            0.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(sym_phases[[0, i, 1, 0]].norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(anti_phases[[0, i, 0, 0]].norm(), 0.0, epsilon = 1e-12);
        let c = folded[[0, i, 1, 0]].norm();
        assert_abs_diff_eq!(
            antisymmetric.weights()[[0, i, 1, 0, 0]],
            bs.weights()[[0, i, 1, 0, 0]] * c / (c + params.phase_regulariser),
            epsilon = 1e-12
        );
        assert!(symmetric.weights()[[0, i, 1, 0, 0]] < 1e-12);
        assert!(antisymmetric.weights()[[0, i, 0, 0, 0]] < 1e-12);
    }
}

#[test]
fn test_drivers_unfolding_missing_phases() {
    let params = UnfoldingParams::default();
    let crystal = crystal(array![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]);
    let bs = band_structure(false);
    let mut driver = UnfoldingDriver::builder()
        .parameters(&params)
        .crystal(&crystal)
        .band_structure(&bs)
        .build()
        .unwrap();
    let err = driver.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UnfoldingError>(),
        Some(UnfoldingError::MissingData(_))
    ));
    assert!(driver.result().is_err());
}

#[test]
fn test_drivers_unfolding_mismatched_sites() {
    let params = UnfoldingParams::default();
    let crystal = crystal(array![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 0.5, 0.0]]);
    let bs = band_structure(true);
    let mut driver = UnfoldingDriver::builder()
        .parameters(&params)
        .crystal(&crystal)
        .band_structure(&bs)
        .build()
        .unwrap();
    let err = driver.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UnfoldingError>(),
        Some(UnfoldingError::StructuralMismatch(_))
    ));
}

#[test]
fn test_drivers_unfolding_check_mapping() {
    let crystal = crystal(array![[0.0, 0.0, 0.0], [0.3, 0.0, 0.0]]);
    let bs = band_structure(true);

    let strict = UnfoldingParams::builder()
        .translation_generators(&tgens(&["1/2,0,0"]))
        .check_mapping(true)
        .build()
        .unwrap();
    let mut driver = UnfoldingDriver::builder()
        .parameters(&strict)
        .crystal(&crystal)
        .band_structure(&bs)
        .build()
        .unwrap();
    let err = driver.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UnfoldingError>(),
        Some(UnfoldingError::StructuralMismatch(_))
    ));

    let lenient = UnfoldingParams::builder()
        .translation_generators(&tgens(&["1/2,0,0"]))
        .build()
        .unwrap();
    let mut driver = UnfoldingDriver::builder()
        .parameters(&lenient)
        .crystal(&crystal)
        .band_structure(&bs)
        .build()
        .unwrap();
    driver.run().unwrap();
    assert_eq!(driver.result().unwrap().unfolded.len(), 1);
}
