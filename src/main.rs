use std::{env, fs, process};

use fol_verifier::{verify_source, Config};

#[macro_use] extern crate log;

fn main() {
    pretty_env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: fol-verifier <file>");
            process::exit(2);
        }
    };
    let config = match Config::discover() {
        Ok(config) => config,
        Err(why) => {
            eprintln!("invalid configuration: {}", why);
            process::exit(2);
        }
    };
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(why) => {
            eprintln!("could not read {}: {}", path, why);
            process::exit(1);
        }
    };
    info!("verifying {}", path);
    let report = match verify_source(&source, &config) {
        Ok(report) => report,
        Err(why) => {
            eprintln!("{}", why);
            process::exit(1);
        }
    };
    if config.print_checks {
        for check in &report.checks {
            println!("{}", check);
        }
    }
    for entry in &report.entries {
        println!("{}", entry);
    }
}
