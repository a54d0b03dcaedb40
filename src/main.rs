use std::{env, fs, path::PathBuf, process};

use anyhow::Context;
use meshport::convert::{convert_asset_file, write_porting_checklist};
use meshport::init_logging;
use meshport::project::{ConversionPaths, ProjectSettings, load_project_settings};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let (positional, settings_path) = match args.len() {
        2 => (&args[1..1], Some(&args[1])),
        4 => (&args[1..4], None),
        5 => (&args[1..4], Some(&args[4])),
        _ => {
            eprintln!(
                "Usage: meshport <source.json> <catalog.json> <output.json> [settings.json]\n       meshport <settings.json>"
            );
            process::exit(2);
        }
    };

    let settings = match settings_path {
        Some(path) => load_project_settings(&PathBuf::from(path))?,
        None => ProjectSettings::default(),
    };
    let arg = |index: usize| positional.get(index).map(String::as_str);
    let ConversionPaths {
        input,
        catalog,
        output,
    } = settings.conversion_paths(arg(0), arg(1), arg(2))?;

    let log_path = output.with_extension("log.jsonl");
    let log_file = fs::File::create(&log_path)
        .with_context(|| format!("failed to create log file: {}", log_path.display()))?;
    init_logging(Box::new(log_file));

    let options = settings.effective_options()?;

    let report = convert_asset_file(&input, &catalog, &output, &options)?;

    let checklist = output.with_extension("checklist.md");
    write_porting_checklist(&checklist, &input, &output, &report)?;

    println!("Model: {} ({:?})", report.model_name, report.asset_type);
    println!(
        "Meshes: {}, Materials: {}, Nodes: {}",
        report.mesh_count, report.material_count, report.node_count
    );
    println!(
        "Layouts: {}, Padded vertices: {}",
        report.layout_count, report.padded_vertices
    );
    if report.bounds_recalculated {
        println!(
            "Bounds recalculated: {} node(s) enabled, {} invalid joint reference(s)",
            report.nodes_enabled, report.invalid_joint_references
        );
    }
    if !report.meshes_without_material.is_empty() {
        println!(
            "Meshes without material: {:?}",
            report.meshes_without_material
        );
    }
    println!(
        "Unassigned materials: {}",
        if report.unassigned_materials.is_empty() {
            "none".to_string()
        } else {
            report.unassigned_materials.join(", ")
        }
    );
    for issue in &report.issues {
        println!("[{:?}] {}", issue.severity, issue.message);
    }

    Ok(())
}
