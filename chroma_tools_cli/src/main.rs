use clap::{Arg, ArgAction, ArgMatches, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::error::Error;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use libchroma_tools::config::Config;
use libchroma_tools::csv_convert::YamlDialect;
use libchroma_tools::fresnel::RefractiveIndex;
use libchroma_tools::inspect::{inspect, list_keys};
use libchroma_tools::plot::LightMapStyle;
use libchroma_tools::process::{
    process_channel_counts, process_csv_to_yaml, process_detected_photons, process_histogram,
    process_light_map, process_plot3d, process_reflectivity,
};
use libchroma_tools::prompt::{LinePrompter, Prompt, TerminalPrompter};

fn make_template_config(path: &Path) -> Result<(), Box<dyn Error>> {
    let config = Config::default();
    config.write_config_file(path)?;
    Ok(())
}

/// Parse a complex refractive index given as `n,k`
fn parse_index(value: &str) -> Result<RefractiveIndex, String> {
    let (n, k) = value
        .split_once(',')
        .ok_or_else(|| format!("expected n,k but got {value:?}"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad index component {part:?}: {e}"))
    };
    Ok(RefractiveIndex::new(parse(n)?, parse(k)?))
}

/// Terminal prompts when a user is attached, plain line reads when input is piped
fn make_prompter() -> Box<dyn Prompt> {
    if std::io::stdin().is_terminal() {
        Box::new(TerminalPrompter::new())
    } else {
        Box::new(LinePrompter::new(std::io::stdin().lock(), std::io::stdout()))
    }
}

/// A path given on the command line, or one asked for on the terminal
fn path_or_prompt(
    matches: &ArgMatches,
    id: &str,
    question: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(path) = matches.get_one::<String>(id) {
        return Ok(PathBuf::from(path));
    }
    Ok(PathBuf::from(make_prompter().ask(question)?))
}

fn optional_path(matches: &ArgMatches, id: &str) -> Option<PathBuf> {
    matches.get_one::<String>(id).map(PathBuf::from)
}

fn file_arg(required: bool) -> Arg {
    Arg::new("file")
        .help("Path to the simulation HDF5 file")
        .required(required)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .help("Path of the PNG to write")
}

fn card_arg() -> Arg {
    Arg::new("card")
        .long("card")
        .help("Path to the geometry card (overrides the configuration)")
}

fn build_cli() -> Command {
    Command::new("chroma_tools_cli")
        .about("Inspect and plot chroma simulation output")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .help("Path to a configuration file"),
        )
        .subcommand(
            Command::new("new")
                .about("Make a template configuration yaml file")
                .arg(
                    Arg::new("path")
                        .short('p')
                        .long("path")
                        .required(true)
                        .help("Path to the file"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the run summary and the contents of selected keys")
                .arg(file_arg(false))
                .arg(
                    Arg::new("list")
                        .long("list")
                        .action(ArgAction::SetTrue)
                        .help("Only list the keys with their type and shape"),
                ),
        )
        .subcommand(
            Command::new("channel-counts")
                .about("Bar chart of the charge collected by each channel")
                .arg(file_arg(true))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("detected-photons")
                .about("Heatmap of detected photons on the unrolled detector cylinder")
                .arg(file_arg(true))
                .arg(
                    Arg::new("bins")
                        .required(true)
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of bins on each axis"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("histogram")
                .about("Histogram of the number of photons detected per event")
                .arg(file_arg(true))
                .arg(
                    Arg::new("bins")
                        .short('b')
                        .long("bins")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of bins (default: Freedman-Diaconis rule)"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("light-map")
                .about("Light map of the six faces of the sensor cube")
                .arg(file_arg(false))
                .arg(
                    Arg::new("style")
                        .long("style")
                        .default_value("histogram")
                        .value_parser(LightMapStyle::from_str)
                        .help("histogram or contour"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("plot3d")
                .about("3D view of photon origins and detector meshes")
                .arg(file_arg(false))
                .arg(card_arg())
                .arg(
                    Arg::new("final-positions")
                        .long("final-positions")
                        .action(ArgAction::SetTrue)
                        .help("Also draw photon final positions by emission order"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("reflectivity")
                .about("Compare simulated reflectivity with the Fresnel equations")
                .arg(file_arg(false))
                .arg(card_arg())
                .arg(
                    Arg::new("component")
                        .long("component")
                        .default_value("Sheet")
                        .help("Reflecting component of the geometry card"),
                )
                .arg(
                    Arg::new("surface-index")
                        .long("surface-index")
                        .value_parser(parse_index)
                        .help("Surface refractive index as n,k (overrides the optical table)"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("csv-to-yaml")
                .about("Convert a directory of optical property CSVs to a chroma YAML file")
                .arg(Arg::new("directory").help("Directory holding the CSV files"))
                .arg(Arg::new("output").help("Path of the YAML file to write"))
                .arg(
                    Arg::new("index-only")
                        .long("index-only")
                        .visible_alias("plain")
                        .action(ArgAction::SetTrue)
                        .help("Write every CSV as a refractive index table with plain numbers"),
                ),
        )
}

fn run(matches: &ArgMatches, pb_manager: &MultiProgress) -> Result<(), Box<dyn Error>> {
    if let Some(("new", sub)) = matches.subcommand() {
        let config_path = PathBuf::from(sub.get_one::<String>("path").ok_or("We require a path")?);
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        make_template_config(&config_path)?;
        log::info!("Done.");
        return Ok(());
    }

    // Load our config
    let config = match matches.get_one::<String>("config") {
        Some(path) => {
            log::info!("Loading config from {path}...");
            let config = Config::read_config_file(Path::new(path))?;
            log::info!("Config successfully loaded.");
            config
        }
        None => Config::default(),
    };

    match matches.subcommand() {
        Some(("inspect", sub)) => {
            if sub.get_flag("list") {
                let path = path_or_prompt(sub, "file", "Enter path of file to visualize")?;
                list_keys(&mut std::io::stdout(), &path)?;
                return Ok(());
            }
            let pb = pb_manager.add(ProgressBar::new(0));
            let mut prompter = make_prompter();
            inspect(prompter.as_mut(), optional_path(sub, "file"), &mut |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })?;
            pb.finish();
        }
        Some(("channel-counts", sub)) => {
            let input = path_or_prompt(sub, "file", "Enter simulation file")?;
            let output = optional_path(sub, "output");
            let written = process_channel_counts(&config, &input, output.as_deref())?;
            log::info!("Wrote {}", written.to_string_lossy());
        }
        Some(("detected-photons", sub)) => {
            let input = path_or_prompt(sub, "file", "Enter simulation file")?;
            let bins = *sub.get_one::<usize>("bins").ok_or("We require a bin count")?;
            let output = optional_path(sub, "output");
            let written = process_detected_photons(&config, &input, bins, output.as_deref())?;
            log::info!("Wrote {}", written.to_string_lossy());
        }
        Some(("histogram", sub)) => {
            let input = path_or_prompt(sub, "file", "Enter simulation file")?;
            let bins = sub.get_one::<usize>("bins").copied();
            let output = optional_path(sub, "output");
            let written = process_histogram(&config, &input, bins, output.as_deref())?;
            log::info!("Wrote {}", written.to_string_lossy());
        }
        Some(("light-map", sub)) => {
            let input = path_or_prompt(sub, "file", "Enter file")?;
            let style = sub
                .get_one::<LightMapStyle>("style")
                .copied()
                .unwrap_or_default();
            let output = optional_path(sub, "output");
            let written = process_light_map(&config, &input, style, output.as_deref())?;
            log::info!("Wrote {}", written.to_string_lossy());
        }
        Some(("plot3d", sub)) => {
            let input = path_or_prompt(sub, "file", "Enter simulation file")?;
            let card = optional_path(sub, "card");
            let output = optional_path(sub, "output");
            let written = process_plot3d(
                &config,
                &input,
                card.as_deref(),
                sub.get_flag("final-positions"),
                output.as_deref(),
            )?;
            log::info!("Wrote {}", written.to_string_lossy());
        }
        Some(("reflectivity", sub)) => {
            let input = path_or_prompt(sub, "file", "Enter simulation file")?;
            let card = optional_path(sub, "card");
            let component = sub
                .get_one::<String>("component")
                .map(String::as_str)
                .unwrap_or("Sheet");
            let surface = sub.get_one::<RefractiveIndex>("surface-index").copied();
            let output = optional_path(sub, "output");
            let written = process_reflectivity(
                &config,
                &input,
                card.as_deref(),
                component,
                surface,
                output.as_deref(),
            )?;
            log::info!("Wrote {}", written.to_string_lossy());
        }
        Some(("csv-to-yaml", sub)) => {
            let directory =
                path_or_prompt(sub, "directory", "Enter the folder path containing CSV files")?;
            let output = path_or_prompt(sub, "output", "Enter the output YAML file path/name")?;
            let dialect = if sub.get_flag("index-only") {
                YamlDialect::IndexTuple
            } else {
                YamlDialect::Properties
            };
            process_csv_to_yaml(&directory, &output, dialect)?;
        }
        _ => (),
    }
    Ok(())
}

fn main() {
    // Create a cli
    let matches = build_cli().get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    if let Err(e) = run(&matches, &pb_manager) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
