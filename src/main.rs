use clap::Parser;
use pbquery::cli::{CliArgs, read_input, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    match read_input(&args).and_then(|input| run(&args, &input)) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("pbquery: {}", e);
            ExitCode::FAILURE
        }
    }
}
