//! Reader and writer for VASP `PROCAR` files carrying orbital weights and, optionally, orbital
//! phases.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{self, bail, ensure, format_err, Context};
use itertools::Itertools;
use lazy_static::lazy_static;
use log;
use ndarray::{Array1, Array2, Array3, Array4, Array5};
use num_complex::Complex;
use regex::Regex;

use crate::target::band_structure::BandStructure;

#[cfg(test)]
#[path = "procar_tests.rs"]
mod procar_tests;

lazy_static! {
    static ref FLOAT_RE: Regex =
        Regex::new(r"-?\d+\.\d+(?:[eE][-+]?\d+)?").expect("Regex pattern invalid.");
}

// ==================
// Struct definitions
// ==================

/// An enumerated type for the layouts of the absolute orbital-weight blocks of a band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightBlockKind {
    /// Variant for collinear calculations: one weight block per band.
    Collinear,

    /// Variant for non-collinear calculations: four weight blocks per band (total, $`m_x`$,
    /// $`m_y`$, $`m_z`$).
    NonCollinear,
}

impl WeightBlockKind {
    /// The number of weight blocks per band.
    pub fn nblocks(&self) -> usize {
        match self {
            WeightBlockKind::Collinear => 1,
            WeightBlockKind::NonCollinear => 4,
        }
    }

    fn from_nblocks(nblocks: usize) -> Result<Self, anyhow::Error> {
        match nblocks {
            1 => Ok(WeightBlockKind::Collinear),
            4 => Ok(WeightBlockKind::NonCollinear),
            _ => Err(format_err!(
                "Found {nblocks} orbital-weight blocks per band; only 1 (collinear) or 4 \
                (non-collinear) are supported."
            )),
        }
    }
}

impl fmt::Display for WeightBlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightBlockKind::Collinear => write!(f, "collinear"),
            WeightBlockKind::NonCollinear => write!(f, "non-collinear"),
        }
    }
}

/// The layout of a `PROCAR` file, resolved once from its header and first band block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcarLayout {
    /// The number of k-points.
    pub npoints: usize,

    /// The number of bands.
    pub nbands: usize,

    /// The number of ions.
    pub nions: usize,

    /// The labels of the orbitals on every ion.
    pub orbitals: Vec<String>,

    /// The number of spin channels, *i.e.* the number of `# of k-points` sections.
    pub nspin: usize,

    /// The layout of the absolute orbital-weight blocks.
    pub weight_kind: WeightBlockKind,

    /// Boolean indicating if orbital phases follow the absolute weights of every band.
    pub has_phase: bool,
}

impl ProcarLayout {
    /// Resolves the layout from the non-empty lines of a `PROCAR` file.
    fn resolve(lines: &[&str]) -> Result<Self, anyhow::Error> {
        ensure!(lines.len() >= 5, "The PROCAR file is too short.");
        let has_phase = lines[0].contains("+ phase");
        let (npoints, nbands, nions) = parse_section_header(lines[1])?;

        let orbital_line = lines[4].split_whitespace().collect_vec();
        ensure!(
            orbital_line.len() >= 3 && orbital_line[0] == "ion",
            "Unable to locate the orbital labels in `{}`.",
            lines[4]
        );
        let orbitals = orbital_line[1..orbital_line.len() - 1]
            .iter()
            .map(|o| o.to_string())
            .collect_vec();

        let nblocks = lines[5..]
            .iter()
            .take_while(|line| {
                !is_band_line(line) && !is_kpoint_line(line) && !is_section_header(line)
            })
            .filter(|line| line.starts_with("tot"))
            .count();
        let weight_kind = WeightBlockKind::from_nblocks(nblocks)?;

        let nspin = lines.iter().filter(|line| is_section_header(line)).count();
        ensure!(
            (1..=2).contains(&nspin),
            "Found {nspin} spin sections; only one or two are supported."
        );

        Ok(Self {
            npoints,
            nbands,
            nions,
            orbitals,
            nspin,
            weight_kind,
            has_phase,
        })
    }

    /// The number of orbitals on every ion.
    pub fn norbitals(&self) -> usize {
        self.orbitals.len()
    }
}

impl fmt::Display for ProcarLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PROCAR layout:")?;
        writeln!(f, "  K-points: {}", self.npoints)?;
        writeln!(f, "  Bands: {}", self.nbands)?;
        writeln!(f, "  Ions: {}", self.nions)?;
        writeln!(f, "  Orbitals: {}", self.orbitals.join(", "))?;
        writeln!(f, "  Spin channels: {}", self.nspin)?;
        writeln!(f, "  Orbital weights: {}", self.weight_kind)?;
        writeln!(
            f,
            "  Orbital phases: {}",
            if self.has_phase { "present" } else { "absent" }
        )
    }
}

/// A cursor over the non-empty lines of a file.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn next(&mut self, what: &str) -> Result<&'a str, anyhow::Error> {
        let line = self.lines.get(self.pos).copied().ok_or_else(|| {
            format_err!(
                "Unexpected end of file while reading the {what} (after {} non-empty lines).",
                self.pos
            )
        })?;
        self.pos += 1;
        Ok(line)
    }
}

// =======
// Reading
// =======

/// Reads a band structure from a `PROCAR` file.
///
/// # Arguments
///
/// * `path` - The path to the `PROCAR` file.
///
/// # Returns
///
/// The band structure, with orbital phases if the file contains them.
pub fn read_procar<P: AsRef<Path>>(path: P) -> Result<BandStructure, anyhow::Error> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Unable to open `{}` for reading.", path.display()))?;
    parse_procar(&contents).with_context(|| {
        format!(
            "Unable to parse the PROCAR file `{}`. Please check that it is formatted properly.",
            path.display()
        )
    })
}

/// Parses the contents of a `PROCAR` file.
pub fn parse_procar(contents: &str) -> Result<BandStructure, anyhow::Error> {
    let lines = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect_vec();
    let layout = ProcarLayout::resolve(&lines)?;
    log::debug!("Resolved {layout}");

    let ProcarLayout {
        npoints,
        nbands,
        nions,
        nspin,
        ..
    } = layout;
    let norb = layout.norbitals();
    let ndim = layout.weight_kind.nblocks();
    let nsiteorbs = nions * norb;

    let mut kpoints = Array2::<f64>::zeros((npoints, 3));
    let mut kweights = Array1::<f64>::zeros(npoints);
    let mut energies = Array3::<f64>::zeros((npoints, nbands, nspin));
    let mut occupancies = Array3::<f64>::zeros((npoints, nbands, nspin));
    let mut weights = Array5::<f64>::zeros((npoints, nsiteorbs, nbands, ndim, nspin));
    let mut phases = if layout.has_phase {
        Some(Array4::<Complex<f64>>::zeros((npoints, nsiteorbs, nbands, nspin)))
    } else {
        None
    };

    let mut cursor = LineCursor { lines, pos: 1 };
    for ispin in 0..nspin {
        let header = cursor.next("spin-section header")?;
        ensure!(
            parse_section_header(header)? == (npoints, nbands, nions),
            "The header `{header}` of spin section {} disagrees with the first header.",
            ispin + 1
        );
        for ipoint in 0..npoints {
            let (kpoint, kweight) = parse_kpoint_line(cursor.next("k-point line")?)?;
            if ispin == 0 {
                kpoints
                    .row_mut(ipoint)
                    .iter_mut()
                    .zip(kpoint.iter())
                    .for_each(|(k, x)| *k = *x);
                kweights[ipoint] = kweight;
            }
            for iband in 0..nbands {
                let (energy, occupancy) = parse_band_line(cursor.next("band line")?)?;
                energies[(ipoint, iband, ispin)] = energy;
                occupancies[(ipoint, iband, ispin)] = occupancy;

                // Absolute weights: one orbital title, then `ndim` blocks each closed by a
                // `tot` line.
                cursor.next("orbital title line")?;
                for idim in 0..ndim {
                    for ion in 0..nions {
                        let row = parse_row(cursor.next("orbital-weight row")?, norb, norb + 2)?;
                        for (l, w) in row.into_iter().enumerate() {
                            weights[(ipoint, ion * norb + l, iband, idim, ispin)] = w;
                        }
                    }
                    let tot = cursor.next("orbital-weight total")?;
                    ensure!(
                        tot.starts_with("tot"),
                        "Expected a `tot` line but found `{tot}`."
                    );
                }

                // Phases: one orbital title, then a real row and an imaginary row per ion.
                if let Some(phases) = phases.as_mut() {
                    cursor.next("phase title line")?;
                    for ion in 0..nions {
                        let re = parse_row(cursor.next("phase row")?, norb, norb + 1)?;
                        let im = parse_row(cursor.next("phase row")?, norb, norb + 1)?;
                        for (l, (x, y)) in re.into_iter().zip(im).enumerate() {
                            phases[(ipoint, ion * norb + l, iband, ispin)] = Complex::new(x, y);
                        }
                    }
                }
            }
        }
    }

    BandStructure::builder()
        .orbitals(layout.orbitals)
        .kpoints(kpoints)
        .kweights(kweights)
        .energies(energies)
        .occupancies(occupancies)
        .weights(weights)
        .phases(phases)
        .build()
        .map_err(|err| format_err!(err))
}

fn is_section_header(line: &str) -> bool {
    line.starts_with("# of k-points")
}

fn is_kpoint_line(line: &str) -> bool {
    line.starts_with("k-point")
}

fn is_band_line(line: &str) -> bool {
    line.starts_with("band")
}

/// Parses a number, rejecting the asterisks written for values that overflow their field.
fn parse_number(token: &str) -> Result<f64, anyhow::Error> {
    if token.contains('*') {
        bail!(
            "Found the overflowed field `{token}`. The upstream calculation wrote values too \
            large for their fixed-width fields; this file cannot be unfolded reliably."
        );
    }
    token
        .parse::<f64>()
        .map_err(|err| format_err!("Unable to parse `{token}` as a number: {err}."))
}

/// Parses `# of k-points: N  # of bands: M  # of ions: K`.
fn parse_section_header(line: &str) -> Result<(usize, usize, usize), anyhow::Error> {
    ensure!(
        is_section_header(line),
        "Expected a `# of k-points` header but found `{line}`."
    );
    let tokens = line.split_whitespace().collect_vec();
    ensure!(tokens.len() >= 9, "The header `{line}` is incomplete.");
    let parse_count = |token: &str| {
        token
            .parse::<usize>()
            .map_err(|err| format_err!("Unable to parse `{token}` in `{line}`: {err}."))
    };
    Ok((
        parse_count(tokens[3])?,
        parse_count(tokens[7])?,
        parse_count(tokens[tokens.len() - 1])?,
    ))
}

/// Parses a k-point line into its coordinates and weight. The coordinates are located by
/// pattern, as adjacent negative values may not be separated by whitespace.
fn parse_kpoint_line(line: &str) -> Result<([f64; 3], f64), anyhow::Error> {
    ensure!(is_kpoint_line(line), "Expected a k-point line but found `{line}`.");
    if line.contains('*') {
        bail!("Found overflowed fields in the k-point line `{line}`.");
    }
    let (coords, weight) = line
        .split_once(':')
        .and_then(|(_, rest)| rest.split_once("weight"))
        .ok_or_else(|| format_err!("Unable to locate the coordinates in `{line}`."))?;
    let coords = FLOAT_RE
        .find_iter(coords)
        .map(|m| parse_number(m.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let coords: [f64; 3] = coords.try_into().map_err(|coords: Vec<f64>| {
        format_err!(
            "Expected three k-point coordinates but found {} in `{line}`.",
            coords.len()
        )
    })?;
    let weight = weight
        .split_whitespace()
        .last()
        .ok_or_else(|| format_err!("Unable to locate the k-point weight in `{line}`."))
        .and_then(parse_number)?;
    Ok((coords, weight))
}

/// Parses a band line into the band energy and occupancy.
fn parse_band_line(line: &str) -> Result<(f64, f64), anyhow::Error> {
    ensure!(is_band_line(line), "Expected a band line but found `{line}`.");
    let tokens = line.split_whitespace().collect_vec();
    ensure!(tokens.len() >= 6, "The band line `{line}` is incomplete.");
    Ok((parse_number(tokens[4])?, parse_number(tokens[tokens.len() - 1])?))
}

/// Parses the `n` values following the ion index of a row with `ntokens` tokens in total.
fn parse_row(line: &str, n: usize, ntokens: usize) -> Result<Vec<f64>, anyhow::Error> {
    let tokens = line.split_whitespace().collect_vec();
    if tokens.len() != ntokens {
        if let Some(token) = tokens.iter().find(|token| token.contains('*')) {
            parse_number(token)?;
        }
        bail!("Expected {ntokens} fields but found {} in `{line}`.", tokens.len());
    }
    tokens[1..=n].iter().map(|token| parse_number(token)).collect()
}

// =======
// Writing
// =======

/// Writes a band structure to a `PROCAR` file.
///
/// Weights and phases are written with three decimal places, as the upstream program does.
///
/// # Arguments
///
/// * `path` - The path to the file to be written.
/// * `band_structure` - The band structure to write.
pub fn write_procar<P: AsRef<Path>>(
    path: P,
    band_structure: &BandStructure,
) -> Result<(), anyhow::Error> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Unable to open `{}` for writing.", path.display()))?;
    let mut writer = BufWriter::new(file);
    format_procar(&mut writer, band_structure)?;
    writer.flush()?;
    Ok(())
}

/// Formats a band structure in the `PROCAR` layout.
pub fn format_procar<W: Write>(
    writer: &mut W,
    band_structure: &BandStructure,
) -> Result<(), anyhow::Error> {
    let bs = band_structure;
    let norb = bs.norbitals();
    let nions = bs.nions();

    if bs.has_phases() {
        writeln!(writer, "PROCAR lm decomposed + phase")?;
    } else {
        writeln!(writer, "PROCAR lm decomposed")?;
    }
    let orbital_labels = bs
        .orbitals()
        .iter()
        .map(|label| format!("{label:>6} "))
        .join("");
    let weight_title = format!("ion {orbital_labels}{:>6}", "tot");
    let phase_title = format!("ion {orbital_labels}");

    for ispin in 0..bs.nspin() {
        writeln!(
            writer,
            "# of k-points:  {}         # of bands:  {}         # of ions:   {}\n",
            bs.npoints(),
            bs.nbands(),
            nions
        )?;
        for ipoint in 0..bs.npoints() {
            let k = bs.kpoints().row(ipoint);
            writeln!(
                writer,
                " k-point {:>4} :    {:.8} {:.8} {:.8}     weight = {:.8}\n",
                ipoint + 1,
                k[0],
                k[1],
                k[2],
                bs.kweights()[ipoint]
            )?;
            for iband in 0..bs.nbands() {
                writeln!(
                    writer,
                    "band {:>4} # energy {:>13.8} # occ. {:>11.8}\n",
                    iband + 1,
                    bs.energies()[(ipoint, iband, ispin)],
                    bs.occupancies()[(ipoint, iband, ispin)]
                )?;

                writeln!(writer, "{weight_title}")?;
                for idim in 0..bs.ndim() {
                    let mut orbital_totals = vec![0.0; norb];
                    for ion in 0..nions {
                        let row = (0..norb)
                            .map(|l| bs.weights()[(ipoint, ion * norb + l, iband, idim, ispin)])
                            .collect_vec();
                        orbital_totals
                            .iter_mut()
                            .zip(row.iter())
                            .for_each(|(t, w)| *t += w);
                        writeln!(
                            writer,
                            "{:>3} {}{:>6.3}",
                            ion + 1,
                            row.iter().map(|w| format!("{w:>6.3} ")).join(""),
                            row.iter().sum::<f64>()
                        )?;
                    }
                    writeln!(
                        writer,
                        "tot {}{:>6.3}",
                        orbital_totals.iter().map(|w| format!("{w:>6.3} ")).join(""),
                        orbital_totals.iter().sum::<f64>()
                    )?;
                }

                if let Some(phases) = bs.phases() {
                    writeln!(writer, "{phase_title}")?;
                    for ion in 0..nions {
                        let row = (0..norb)
                            .map(|l| phases[(ipoint, ion * norb + l, iband, ispin)])
                            .collect_vec();
                        writeln!(
                            writer,
                            "{:>3} {}",
                            ion + 1,
                            row.iter().map(|c| format!("{:>6.3} ", c.re)).join("")
                        )?;
                        writeln!(
                            writer,
                            "{:>3} {}",
                            ion + 1,
                            row.iter().map(|c| format!("{:>6.3} ", c.im)).join("")
                        )?;
                    }
                    writeln!(writer)?;
                }
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// The path `<prefix>.irrep.<irrep>` of the file holding the band structure unfolded onto
/// irrep `irrep`.
pub fn irrep_output_path<P: AsRef<Path>>(prefix: P, irrep: usize) -> std::path::PathBuf {
    let mut name = prefix.as_ref().as_os_str().to_os_string();
    name.push(format!(".irrep.{irrep}"));
    name.into()
}
