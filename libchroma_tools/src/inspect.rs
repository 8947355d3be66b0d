//! The interactive inspector: print run parameters, let the user pick keys, and dump them.
use ndarray::{ArrayD, ArrayViewD, Axis};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::constants::FLAGS_KEY;
use super::error::InspectError;
use super::flags::tally_flags;
use super::prompt::{EntryCount, Prompt};
use super::sim_file::{DatasetInfo, DatasetValues, SimulationFile};
use super::summary::RunSummary;

/// One dataset pulled out of the file
#[derive(Debug, Clone)]
pub struct ExtractedKey {
    pub key: String,
    pub info: DatasetInfo,
    pub values: DatasetValues,
}

/// Run the inspector. If path is None the user is asked for one.
///
/// `progress` is called with (keys done, keys total) while extracting.
pub fn inspect(
    prompter: &mut dyn Prompt,
    path: Option<PathBuf>,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<(), InspectError> {
    let path = match path {
        Some(p) => p,
        None => PathBuf::from(prompter.ask("Enter path of file to visualize")?),
    };
    let sim = SimulationFile::open(&path)?;
    log::info!(
        "File size: {}",
        human_bytes::human_bytes(sim.size_bytes() as f64)
    );

    let summary = RunSummary::from_file(&sim)?;
    writeln!(prompter.output(), "{summary}")?;

    let keys = sim.keys()?;
    let selected = prompter.select_keys(&keys)?;
    let extracted = extract_keys(&sim, &selected, progress)?;

    if let Some(flags) = extracted.get(FLAGS_KEY) {
        print_flag_descriptions(prompter, flags, summary.total_photons)?;
    }

    let wants_contents =
        prompter.ask_yes_no("Do you wish to print the arrays and their contents?")?;
    let count = if wants_contents {
        Some(prompter.ask_entry_count(
            "How many array entries do you wish to see? (Enter an integer or * to print all)",
        )?)
    } else {
        None
    };

    for key in selected.iter() {
        if let Some(entry) = extracted.get(key) {
            write_key_report(prompter.output(), entry, count)?;
        }
    }
    Ok(())
}

/// Read the selected keys, reporting progress after each one
pub fn extract_keys(
    sim: &SimulationFile,
    keys: &[String],
    progress: &mut dyn FnMut(usize, usize),
) -> Result<BTreeMap<String, ExtractedKey>, InspectError> {
    let mut extracted = BTreeMap::new();
    for (idx, key) in keys.iter().enumerate() {
        progress(idx, keys.len());
        if extracted.contains_key(key) {
            continue;
        }
        let entry = ExtractedKey {
            key: key.clone(),
            info: sim.dataset_info(key)?,
            values: sim.read_values(key)?,
        };
        extracted.insert(key.clone(), entry);
    }
    progress(keys.len(), keys.len());
    Ok(extracted)
}

fn print_flag_descriptions(
    prompter: &mut dyn Prompt,
    flags: &ExtractedKey,
    total_photons: u64,
) -> Result<(), InspectError> {
    if !prompter.ask_yes_no("Do you wish to print all relevant flag descriptions?")? {
        return Ok(());
    }
    let values: Vec<i64> = match &flags.values {
        DatasetValues::UInt(a) => a.iter().map(|v| *v as i64).collect(),
        DatasetValues::Int(a) => a.iter().copied().collect(),
        _ => {
            log::warn!("Flags dataset is not an integer array; cannot decode it");
            return Ok(());
        }
    };
    let out = prompter.output();
    writeln!(out)?;
    writeln!(out, "###{}###", FLAGS_KEY)?;
    writeln!(out, "type: {}", flags.info.kind)?;
    writeln!(out, "shape: {}", flags.info.shape_string())?;
    for tally in tally_flags(&values, total_photons) {
        writeln!(
            out,
            "{}: {} (Percentage: {})",
            tally.flag, tally.description, tally.percentage
        )?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the header (and optionally the leading entries) of one extracted key
pub fn write_key_report<W: Write + ?Sized>(
    out: &mut W,
    entry: &ExtractedKey,
    count: Option<EntryCount>,
) -> Result<(), InspectError> {
    writeln!(out, "###{}###", entry.key)?;
    writeln!(out, "type: {}", entry.info.kind)?;
    writeln!(out, "shape: {}", entry.info.shape_string())?;
    if let Some(count) = count {
        let body = match &entry.values {
            DatasetValues::Int(a) => format_entries(a, count),
            DatasetValues::UInt(a) => format_entries(a, count),
            DatasetValues::Float(a) => format_entries(a, count),
            DatasetValues::Bool(a) => format_entries(a, count),
            DatasetValues::Text(a) => format_entries(a, count),
            DatasetValues::Unsupported(desc) => format!("<cannot print elements of type {desc}>"),
        };
        writeln!(out, "array: ")?;
        writeln!(out, "{body}")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Format the leading entries along the first axis, e.g. `[[0 0 1], [2 0 1]]`
pub fn format_entries<T: Display>(array: &ArrayD<T>, count: EntryCount) -> String {
    if array.ndim() == 0 {
        return array
            .first()
            .map(|v| v.to_string())
            .unwrap_or_default();
    }
    let n = count.limit(array.len_of(Axis(0)));
    let entries: Vec<String> = array
        .outer_iter()
        .take(n)
        .map(|entry| format_nested(&entry))
        .collect();
    format!("[{}]", entries.join(", "))
}

fn format_nested<T: Display>(view: &ArrayViewD<T>) -> String {
    if view.ndim() == 0 {
        return view.first().map(|v| v.to_string()).unwrap_or_default();
    }
    let inner: Vec<String> = view.outer_iter().map(|sub| format_nested(&sub)).collect();
    format!("[{}]", inner.join(" "))
}

/// Non-interactive variant: print the header of every key of a file
pub fn list_keys<W: Write>(out: &mut W, path: &Path) -> Result<(), InspectError> {
    let sim = SimulationFile::open(path)?;
    for key in sim.keys()? {
        let info = sim.dataset_info(&key)?;
        writeln!(out, "{key}: {} {}", info.kind, info.shape_string())?;
    }
    Ok(())
}
