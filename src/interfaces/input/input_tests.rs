use std::fs;
use std::path::PathBuf;

use clap::Parser;

use crate::group::FractionalTranslation;
use crate::interfaces::cli::Cli;
use crate::interfaces::vasp::read_procar;
use crate::io::{read_unfold_yaml, write_unfold_yaml};

use super::Input;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_interfaces_input_yaml() {
    let name = format!("{ROOT}/tests/data/input.yml");
    let inp = read_unfold_yaml::<Input, _>(&name).unwrap();
    assert_eq!(inp.poscar, PathBuf::from("tests/data/POSCAR"));
    assert_eq!(inp.procar, PathBuf::from("tests/data/PROCAR"));
    assert_eq!(inp.output_prefix(), PathBuf::from("target/unfold/PROCAR"));
    assert_eq!(
        inp.parameters.translation_generators,
        vec!["1/2,0,0".parse::<FractionalTranslation>().unwrap()]
    );
    assert_eq!(inp.parameters.distance_threshold, 1e-5);
    assert!(inp.parameters.all_irreps);
    assert!(!inp.parameters.check_mapping);
    assert_eq!(inp.parameters.phase_regulariser, 1e-4);
}

#[test]
fn test_interfaces_input_yaml_round_trip() {
    let dir = std::env::temp_dir().join("bandunfold_input_yaml_round_trip");
    fs::create_dir_all(&dir).unwrap();
    let name = dir.join("input");
    let mut inp = Input::default();
    inp.parameters.translation_generators = vec![
        "1/2,0,0".parse().unwrap(),
        "0,1/3,0".parse().unwrap(),
    ];
    inp.parameters.check_mapping = true;
    write_unfold_yaml(&name, &inp).unwrap();

    let read = read_unfold_yaml::<Input, _>(dir.join("input.yml")).unwrap();
    assert_eq!(read.poscar, inp.poscar);
    assert_eq!(read.output, None);
    assert_eq!(read.output_prefix(), PathBuf::from("PROCAR"));
    assert_eq!(
        read.parameters.translation_generators,
        inp.parameters.translation_generators
    );
    assert!(read.parameters.check_mapping);
}

#[test]
fn test_interfaces_input_from_cli() {
    let cli = Cli::parse_from([
        "bandunfold",
        "POSCAR",
        "PROCAR",
        "--tgen",
        "1/2,0,0",
        "--tgen",
        "0,1/2,0",
        "--eps",
        "1e-4",
        "--all-irreps",
        "--out",
        "unfolded",
    ]);
    let inp = Input::from_cli(&cli).unwrap();
    assert_eq!(inp.poscar, PathBuf::from("POSCAR"));
    assert_eq!(inp.output_prefix(), PathBuf::from("unfolded"));
    assert_eq!(inp.parameters.translation_generators.len(), 2);
    assert_eq!(inp.parameters.distance_threshold, 1e-4);
    assert!(inp.parameters.all_irreps);
    assert!(!inp.parameters.check_mapping);

    let config = format!("{ROOT}/tests/data/input.yml");
    let cli = Cli::parse_from(["bandunfold", "-c", config.as_str()]);
    let inp = Input::from_cli(&cli).unwrap();
    assert!(inp.parameters.all_irreps);

    assert!(Cli::try_parse_from(["bandunfold", "POSCAR", "PROCAR", "--tgen", "2/3,0,0"]).is_err());
    assert!(Cli::try_parse_from(["bandunfold", "POSCAR"]).is_err());
    assert!(Cli::try_parse_from(["bandunfold", "-c", "input.yml", "--all-irreps"]).is_err());

    let cli = Cli::parse_from([
        "bandunfold",
        "POSCAR",
        "PROCAR",
        "--tgen",
        "1/2,0,0",
        "--tgen",
        "0,1/2,0",
        "--tgen",
        "0,0,1/2",
        "--tgen",
        "1/2,1/2,0",
    ]);
    assert!(Input::from_cli(&cli).is_err());
}

#[test]
fn test_interfaces_input_unfold() {
    let dir = std::env::temp_dir().join("bandunfold_input_unfold");
    fs::create_dir_all(&dir).unwrap();
    let mut inp = Input {
        poscar: PathBuf::from(format!("{ROOT}/tests/data/POSCAR")),
        procar: PathBuf::from(format!("{ROOT}/tests/data/PROCAR")),
        output: Some(dir.join("PROCAR")),
        ..Input::default()
    };
    inp.parameters.translation_generators = vec!["1/2,0,0".parse().unwrap()];
    inp.parameters.all_irreps = true;

    let paths = inp.unfold().unwrap();
    assert_eq!(paths, vec![dir.join("PROCAR.irrep.0"), dir.join("PROCAR.irrep.1")]);
    for path in paths.iter() {
        let bs = read_procar(path).unwrap();
        assert_eq!(bs.nions(), 2);
        assert!(bs.has_phases());
    }

    inp.procar = PathBuf::from(format!("{ROOT}/tests/data/PROCAR_spin"));
    assert!(inp.unfold().is_err());
}

#[test]
fn test_interfaces_input_unfold_malformed_procar() {
    let dir = std::env::temp_dir().join("bandunfold_input_malformed_procar");
    fs::create_dir_all(&dir).unwrap();
    let procar = fs::read_to_string(format!("{ROOT}/tests/data/PROCAR"))
        .unwrap()
        .replacen("0.010", "*****", 1);
    fs::write(dir.join("PROCAR"), procar).unwrap();

    let inp = Input {
        poscar: PathBuf::from(format!("{ROOT}/tests/data/POSCAR")),
        procar: dir.join("PROCAR"),
        output: Some(dir.join("unfolded")),
        ..Input::default()
    };
    let message = format!("{:#}", inp.unfold().unwrap_err());
    assert!(message.contains("Unable to parse the input PROCAR file"));
    assert!(message.contains("asterisks"));
    assert!(message.contains("*****"));
    assert!(!message.contains("same crystal"));
}
