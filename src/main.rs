use std::env;
use std::fs;
use std::process;

use chordsheet::{reconstruct_with_options, transpose_sheet, ReconstructOptions};

fn usage() -> ! {
    eprintln!("Usage: chordsheet <input.txt> [output.json]");
    eprintln!("       chordsheet --transpose <semitones> <input.txt> [output.json]");
    eprintln!("       chordsheet --options <options.yaml> <input.txt> [output.json]");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut transpose: i32 = 0;
    let mut options_path: Option<&String> = None;
    let mut input_path: Option<&String> = None;
    let mut output_path: Option<&String> = None;

    // Parse flags
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--transpose" => {
                i += 1;
                let Some(value) = args.get(i) else { usage() };
                transpose = match value.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("Invalid semitone count '{}'", value);
                        process::exit(1);
                    }
                };
            }
            "--options" => {
                i += 1;
                let Some(path) = args.get(i) else { usage() };
                options_path = Some(path);
            }
            arg if arg.starts_with("--") => usage(),
            _ if input_path.is_none() => input_path = Some(&args[i]),
            _ if output_path.is_none() => output_path = Some(&args[i]),
            _ => usage(),
        }
        i += 1;
    }

    let Some(input_path) = input_path else { usage() };

    let options = match options_path {
        Some(path) => {
            let source = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading options file '{}': {}", path, e);
                    process::exit(1);
                }
            };
            match ReconstructOptions::from_yaml(&source) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Error in options file '{}': {}", path, e);
                    process::exit(1);
                }
            }
        }
        None => ReconstructOptions::default(),
    };

    // Read input file
    let text = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    // Reconstruct
    let mut sheet = reconstruct_with_options(&text, &options);
    if transpose != 0 {
        sheet = transpose_sheet(&sheet, transpose);
    }

    let json = match serde_json::to_string_pretty(&sheet) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing document: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote chord sheet to {}", path);
        }
        None => {
            println!("{}", json);
        }
    }
}
