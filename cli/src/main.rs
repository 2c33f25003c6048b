use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sil2cast_core::lower::InstBreakdown;
use sil2cast_core::{
    EngineConfig, EngineRegistry, LowerOptions, SilModule, expand_inputs, load_module_file, lower_and_submit,
    lower_module,
};

mod logger;
mod output;

use output::FormatStyle;

fn main() -> ExitCode {
    let cli = Command::new("sil2cast")
        .version("0.1.0")
        .about("Lowers SIL-style SSA modules into generic ASTs for static-analysis engines")
        .arg(
            Arg::new("verbose")
                .help("Increase log verbosity (-v info, -vv debug)")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true),
        );

    let cli = setup_cli(cli);
    let matches = cli.get_matches();

    let verbosity = matches.get_count("verbose");
    logger::init(logger::level_from(verbosity, std::env::var(logger::ENV_LOG).ok()));

    dispatch_commands(&matches)
}

/// Sets up the CLI with subcommands and arguments.
fn setup_cli(cli: Command) -> Command {
    cli.subcommand(
        Command::new("lower")
            .about("Lower module documents and optionally hand them to an engine")
            .arg(
                Arg::new("inputs")
                    .help("Module documents (JSON) or glob patterns")
                    .required(true)
                    .num_args(1..)
                    .index(1),
            )
            .arg(
                Arg::new("dump-dir")
                    .help("Directory receiving one debug dump per module")
                    .long("dump-dir")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("DIR"),
            )
            .arg(
                Arg::new("print")
                    .help("Log the per-instruction breakdown")
                    .long("print")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("drop-lifetime-markers")
                    .help("Emit no placeholder nodes for reference-counting instructions")
                    .long("drop-lifetime-markers")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("engine")
                    .help("Name of the analysis engine receiving each module")
                    .short('e')
                    .long("engine")
                    .value_parser(clap::value_parser!(String))
                    .value_name("NAME"),
            )
            .arg(engine_dir_arg())
            .arg(
                Arg::new("output")
                    .help("Write the lowered graph as JSON")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            ),
    )
    .subcommand(
        Command::new("inspect")
            .about("Print the textual IR and the per-instruction breakdown of a module")
            .arg(
                Arg::new("input")
                    .help("Module document (JSON)")
                    .required(true)
                    .index(1),
            ),
    )
    .subcommand(
        Command::new("engines")
            .about("List the analysis engines found in the engine directory")
            .arg(engine_dir_arg()),
    )
}

fn engine_dir_arg() -> Arg {
    Arg::new("engine-dir")
        .help("Directory holding engine subdirectories with manifest.json")
        .long("engine-dir")
        .value_parser(clap::value_parser!(PathBuf))
        .value_name("DIR")
}

/// Dispatches the command based on the parsed arguments.
fn dispatch_commands(matches: &ArgMatches) -> ExitCode {
    let style = FormatStyle::default();
    match matches.subcommand() {
        Some(("lower", sub_m)) => run_lower(sub_m, &style),
        Some(("inspect", sub_m)) => run_inspect(sub_m, &style),
        Some(("engines", sub_m)) => run_engines(sub_m, &style),
        _ => {
            println!("No valid subcommand was used. Use --help for more information.");
            ExitCode::FAILURE
        }
    }
}

fn engine_config(sub_m: &ArgMatches) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(dir) = sub_m.get_one::<PathBuf>("engine-dir") {
        config.engine_dir = dir.clone();
    }
    config
}

fn run_lower(sub_m: &ArgMatches, style: &FormatStyle) -> ExitCode {
    let patterns: Vec<String> = sub_m.get_many::<String>("inputs").into_iter().flatten().cloned().collect();

    let mut options = LowerOptions::from_env();
    if let Some(dir) = sub_m.get_one::<PathBuf>("dump-dir") {
        options.dump_dir = Some(dir.clone());
    }
    options.print |= sub_m.get_flag("print");
    options.drop_lifetime_markers |= sub_m.get_flag("drop-lifetime-markers");

    let engine = match sub_m.get_one::<String>("engine") {
        Some(name) => {
            let config = engine_config(sub_m);
            let mut registry = EngineRegistry::new();
            if let Err(e) = registry.discover(&config.engine_dir) {
                eprintln!("{} {}", style.error.apply_to("engine discovery failed:"), e);
                return ExitCode::FAILURE;
            }
            match registry.get(name) {
                Some(engine) => Some(engine),
                None => {
                    eprintln!(
                        "{} no engine named '{}' in {}",
                        style.error.apply_to("error:"),
                        name,
                        config.engine_dir.display()
                    );
                    return ExitCode::FAILURE;
                }
            }
        }
        None => None,
    };

    let inputs = match expand_inputs(&patterns) {
        Ok(inputs) => inputs,
        Err(e) => {
            output::report_error(style, "input", &e);
            return ExitCode::FAILURE;
        }
    };

    let output_base = sub_m.get_one::<PathBuf>("output");
    let progress = output::module_progress(inputs.len());
    let mut failures = 0usize;

    for (index, path) in inputs.iter().enumerate() {
        progress.set_message(path.display().to_string());
        let module = match load_module_file(path) {
            Ok(module) => module,
            Err(e) => {
                progress.suspend(|| output::report_error(style, &path.display().to_string(), &e));
                failures += 1;
                progress.inc(1);
                continue;
            }
        };

        let result = match &engine {
            Some(engine) => lower_and_submit(&module, &options, engine.as_ref()).map(|(l, r)| (l, Some(r))),
            None => lower_module(&module, &options).map(|l| (l, None)),
        };

        match result {
            Ok((lowered, receipt)) => {
                progress.suspend(|| {
                    output::report_diagnostics(style, &lowered.diagnostics);
                    println!("{}", output::summary_table(&module.name, &lowered.stats, receipt.as_ref()));
                });
                if let Some(base) = output_base {
                    let target = output_path(base, index, inputs.len());
                    if let Err(e) = write_graph(&target, &lowered.graph) {
                        progress.suspend(|| eprintln!("{} {}", style.error.apply_to("write failed:"), e));
                        failures += 1;
                    }
                }
            }
            Err(e) => {
                progress.suspend(|| output::report_error(style, &format!("module '{}'", module.name), e.as_ref()));
                failures += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if failures > 0 {
        eprintln!("{}", style.error.apply_to(format!("{} of {} module(s) failed", failures, inputs.len())));
        ExitCode::FAILURE
    } else {
        println!("{}", style.success.apply_to(format!("lowered {} module(s)", inputs.len())));
        ExitCode::SUCCESS
    }
}

/// `out.json` for a single module, `out_0.json`, `out_1.json`, ... otherwise.
fn output_path(base: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return base.to_path_buf();
    }
    let stem = base.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    base.with_file_name(name)
}

fn write_graph(target: &Path, graph: &sil2cast_core::CAstGraph) -> Result<(), String> {
    let json = serde_json::to_string_pretty(graph).map_err(|e| format!("serialize graph: {}", e))?;
    std::fs::write(target, json).map_err(|e| format!("{}: {}", target.display(), e))
}

fn run_inspect(sub_m: &ArgMatches, style: &FormatStyle) -> ExitCode {
    let Some(input) = sub_m.get_one::<String>("input") else {
        return ExitCode::FAILURE;
    };
    let module = match load_module_file(input) {
        Ok(module) => module,
        Err(e) => {
            output::report_error(style, input, &e);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", style.title.apply_to(format!("module {}", module.name)));
    println!("{}", module);
    println!("{}", output::breakdown_table(&breakdown(&module)));
    ExitCode::SUCCESS
}

fn breakdown(module: &SilModule) -> Vec<InstBreakdown> {
    let mut entries = Vec::new();
    for fid in module.function_ids() {
        let Some(function) = module.function(fid) else {
            continue;
        };
        for (pos, block) in function.blocks.iter().enumerate() {
            let Some(data) = module.block(*block) else {
                continue;
            };
            let label = format!("bb{}", pos);
            for (index, inst) in data.insts.iter().enumerate() {
                if let Some(inst) = module.inst(*inst) {
                    entries.push(InstBreakdown::new(module, &function.name, &label, index, inst));
                }
            }
        }
    }
    entries
}

fn run_engines(sub_m: &ArgMatches, style: &FormatStyle) -> ExitCode {
    let config = engine_config(sub_m);
    let mut registry = EngineRegistry::new();
    if let Err(e) = registry.discover(&config.engine_dir) {
        eprintln!("{} {}", style.error.apply_to("engine discovery failed:"), e);
        return ExitCode::FAILURE;
    }
    let descriptors = registry.descriptors();
    if descriptors.is_empty() {
        println!("{}", style.info.apply_to(format!("no engines found in {}", config.engine_dir.display())));
        return ExitCode::SUCCESS;
    }
    println!("{}", output::engines_table(&descriptors, &registry.registered_names()));
    ExitCode::SUCCESS
}
