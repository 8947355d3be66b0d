//! Decoding of the photon history bitmask chroma stores in the Flags dataset.
//!
//! Every bit of a flag marks one interaction the photon went through. A flag is decoded
//! by collecting its set bits and naming them.
use bitvec::prelude::*;
use fxhash::FxHashMap;

/// Flag of a photon that was specularly reflected and then detected
/// (SURFACE_DETECT + REFLECT_SPECULAR)
pub const SPECULAR_DETECT_FLAG: u32 = 68;

/// Named interaction bits
const FLAG_NAMES: [(usize, &str); 12] = [
    (0, "NO_HIT"),
    (1, "BULK_ABSORB"),
    (2, "SURFACE_DETECT"),
    (3, "SURFACE_ABSORB"),
    (4, "RAYLEIGH_SCATTER"),
    (5, "REFLECT_DIFFUSE"),
    (6, "REFLECT_SPECULAR"),
    (7, "SURFACE_REEMIT"),
    (8, "SURFACE_TRANSMIT"),
    (9, "BULK_REEMIT"),
    (10, "MATERIAL_REFL"),
    (31, "NAN_ABORT"),
];

/// Name of a single interaction bit. Bits chroma does not define are named BIT_n
pub fn bit_name(bit: usize) -> String {
    FLAG_NAMES
        .iter()
        .find(|(b, _)| *b == bit)
        .map(|(_, name)| String::from(*name))
        .unwrap_or_else(|| format!("BIT_{bit}"))
}

/// Positions of the set bits of a flag, lowest first
pub fn set_bits(flag: u32) -> Vec<usize> {
    flag.view_bits::<Lsb0>().iter_ones().collect()
}

/// Human-readable description of a flag, e.g. "SURFACE_DETECT + REFLECT_SPECULAR"
pub fn describe_flag(flag: u32) -> String {
    set_bits(flag)
        .into_iter()
        .map(bit_name)
        .collect::<Vec<String>>()
        .join(" + ")
}

/// One distinct flag value seen in a run
#[derive(Debug, Clone, PartialEq)]
pub struct FlagTally {
    /// The value as stored in the file, which may be a signed integer
    pub flag: i64,
    pub description: String,
    pub count: u64,
    pub percentage: f64,
}

/// Count how often each distinct stored flag occurs. Flags are decoded from their low 32
/// bits. Percentages are relative to total_photons and rounded to two decimals. Sorted by
/// stored value.
pub fn tally_flags(flags: &[i64], total_photons: u64) -> Vec<FlagTally> {
    let mut counts: FxHashMap<i64, u64> = FxHashMap::default();
    for flag in flags {
        *counts.entry(*flag).or_insert(0) += 1;
    }

    let mut tallies: Vec<FlagTally> = counts
        .into_iter()
        .map(|(flag, count)| FlagTally {
            flag,
            description: describe_flag(flag as u32),
            count,
            percentage: percentage(count, total_photons),
        })
        .collect();
    tallies.sort_by_key(|t| t.flag);
    tallies
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

/// Count the photons of each source whose flag matches target exactly
pub fn count_matching_per_source(
    flags: &[u32],
    photons_per_source: usize,
    target: u32,
) -> Vec<u64> {
    if photons_per_source == 0 {
        return Vec::new();
    }
    flags
        .chunks(photons_per_source)
        .map(|source| source.iter().filter(|f| **f == target).count() as u64)
        .collect()
}
