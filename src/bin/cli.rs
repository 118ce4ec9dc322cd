use ledmap::testing::{grid_layout, SimulatedRig};
use ledmap::types::Point;
use ledmap::{output, pattern, CalibrationSession, MapperConfig, MappingMethod, ThresholdDetector};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    ledmap::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: ledmap-cli <command> [args]");
        eprintln!("Commands: patterns, simulate");
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "patterns" => cmd_patterns(&args),
        "simulate" => cmd_simulate(&args),
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

/// Print the binary pattern schedule for a strand size.
fn cmd_patterns(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if args.len() < 3 {
        eprintln!("Usage: ledmap-cli patterns <light_count> [--json]");
        std::process::exit(1);
    }
    let light_count: usize = args[2].parse()?;
    let width = pattern::bit_width(light_count);
    let json = args.contains(&"--json".to_string());

    if json {
        let schedule: Vec<Vec<bool>> = (0..width)
            .map(|bit| pattern::bit_pattern(light_count, bit).bits().to_vec())
            .collect();
        println!("{}", serde_json::to_string(&schedule)?);
    } else {
        println!("{} lights, {} pattern frames", light_count, width);
        for bit in 0..width {
            let p = pattern::bit_pattern(light_count, bit);
            let bits: String = p.bits().iter().map(|b| if *b { '1' } else { '0' }).collect();
            println!("bit {}: {}", bit, bits);
        }
    }
    Ok(())
}

/// Run a full mapping session against the simulated rig.
fn cmd_simulate(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if args.len() < 3 {
        eprintln!(
            "Usage: ledmap-cli simulate <light_count> [--method binary|linear] \
             [--columns <n>] [--out <dir>] [--json]"
        );
        std::process::exit(1);
    }
    let light_count: usize = args[2].parse()?;
    let mut method = MappingMethod::Binary;
    let mut columns = (light_count as f64).sqrt().ceil() as usize;
    let mut out_dir: Option<String> = None;
    let mut json = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--method" => {
                i += 1;
                method = match args[i].as_str() {
                    "binary" => MappingMethod::Binary,
                    "linear" => MappingMethod::Linear,
                    other => {
                        eprintln!("Unknown method: {}", other);
                        std::process::exit(1);
                    }
                };
            }
            "--columns" => {
                i += 1;
                columns = args[i].parse()?;
            }
            "--out" => {
                i += 1;
                out_dir = Some(args[i].clone());
            }
            "--json" => json = true,
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let spacing = 20;
    let columns = columns.max(1);
    let rows = light_count.div_ceil(columns);
    let layout = grid_layout(light_count, columns, spacing, Point::new(20, 20));
    let width = (columns as u32 + 1) * spacing as u32 + 20;
    let height = (rows as u32 + 1) * spacing as u32 + 20;

    let mut config = MapperConfig::default();
    config.mapping.method = method;
    config.mapping.settle_delay_ms = 0;
    config.camera.warmup_frames = 0;
    if let Some(dir) = &out_dir {
        config.output.directory = dir.clone();
    }

    let rig = SimulatedRig::new(layout, width, height);
    let (camera, lights) = rig.split();
    let detector = ThresholdDetector::new(config.detection.erosion_size);
    let mut session = CalibrationSession::open(camera, lights, detector, config.clone())?;
    let report = session.run()?;

    if json {
        println!("{}", serde_json::to_string(&output::to_triples(report.map()))?);
    } else {
        println!(
            "Mapped {}/{} lights in {} frames ({:?})",
            report.map().mapped_count(),
            report.light_count,
            report.frames_captured,
            report.method
        );
        for (index, slot) in report.map().slots().iter().enumerate() {
            match slot {
                Some(point) => println!("{:4}  {}", index, point),
                None => println!("{:4}  unmapped", index),
            }
        }
    }

    if out_dir.is_some() {
        let json_path = output::write_artifacts(&report, &config.output)?;
        eprintln!("Artifacts written to {:?}", json_path.parent().unwrap_or(json_path.as_path()));
    }
    Ok(())
}
