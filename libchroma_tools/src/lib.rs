//! # chroma_tools
//!
//! chroma_tools is a set of inspection and plotting utilities for the HDF5 output of
//! chroma optical-photon simulations, written in Rust. It can summarize and dump the
//! contents of a simulation file, decode photon interaction flags, render detector
//! light maps and geometry views, compare simulated reflectivity with the Fresnel
//! prediction, and convert tabulated optical properties from CSV into the YAML dialect
//! chroma reads.
//!
//! ## Installation
//!
//! The only method of install is from source.
//!
//! ### Rust
//!
//! If you have not used Rust before, you will most likely need to install the Rust tool
//! chain. See the [Rust docs](https://www.rust-lang.org/tools/install) for installation
//! instructions.
//!
//! ### HDF5
//!
//! HDF5 must be installed before building. Typically this will be installed using a
//! package manager (homebrew, apt, etc), and the Rust libraries will auto detect the
//! location of the HDF install. If HDF5 lives in a custom location, write the following
//! snippet into `.cargo/config.toml` at the top of the repository:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//!
//! [build]
//! rustflags="-C link-args=-Wl,-rpath,/path/to/my/hdf5/install/lib"
//! ```
//!
//! ### Fonts
//!
//! Charts are rendered to PNG with plotters, which loads a system sans-serif font for
//! titles and labels. Any desktop Linux or MacOS install has one.
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./chroma_tools_cli` from the top
//! level repository. The binary is installed to your cargo install location (typically
//! `~/.cargo/bin/`).
//!
//! ## Configuration
//!
//! Every tool works without a configuration file. Detector dimensions and the paths of the
//! geometry cards can be changed with a YAML file passed through `--config`; a template
//! holding the defaults is written by `chroma_tools_cli new -p config.yml`:
//!
//! ```yml
//! cylinder_radius: 760.0
//! cube_half_length: 20.9
//! light_map_extent: 25.0
//! light_map_bins: 350
//! sphere_radius: 152.6
//! reflected_flag: 68
//! channel_count: 720
//! hidden_components:
//! - Tube
//! - Cage
//! geometry_card: null
//! reflectivity_card: null
//! output_dir: .
//! ```
//!
//! Missing fields take their default value. Lengths are in mm.
//!
//! ## Simulation File Format
//!
//! chroma writes every key as a group holding a dataset of the same name. Run metadata is
//! stored as root attributes:
//!
//! ```text
//! simulation.h5 - Generator, PhotonLocation, NumberOfSources, NumberOfRuns
//! |---- Flags
//! |    |---- Flags(dset)
//! |---- NumDetected
//! |    |---- NumDetected(dset)
//! |---- DetectedPos
//! |    |---- DetectedPos(dset)
//! |---- Origin
//! |    |---- Origin(dset)
//! ...
//! ```
//!
//! Files whose datasets sit directly at the root are read as well.
pub mod channel_counts;
pub mod config;
pub mod constants;
pub mod csv_convert;
pub mod error;
pub mod flags;
pub mod fresnel;
pub mod geometry;
pub mod histogram;
pub mod inspect;
pub mod optical;
pub mod plot;
pub mod process;
pub mod projection;
pub mod prompt;
pub mod reflectivity;
pub mod sim_file;
pub mod stats;
pub mod stl_mesh;
pub mod summary;
