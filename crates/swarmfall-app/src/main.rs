use std::error::Error;

use swarmfall_app::game_loop::{self, RunOptions};
use swarmfall_core::balance::BalanceTable;

const USAGE: &str = "usage: swarmfall-headless [--seed N] [--seconds S] [--fps F] [--balance FILE] [--realtime]";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let options = parse_args(std::env::args().skip(1))?;
    let summary = game_loop::run(&options)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<RunOptions, Box<dyn Error>> {
    let mut options = RunOptions::default();
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => options.seed = value(&mut args, "--seed")?.parse()?,
            "--seconds" => options.seconds = value(&mut args, "--seconds")?.parse()?,
            "--fps" => options.fps = value(&mut args, "--fps")?.parse()?,
            "--balance" => {
                let path = value(&mut args, "--balance")?;
                let json = std::fs::read_to_string(&path)
                    .map_err(|err| format!("cannot read balance file {path}: {err}"))?;
                options.balance = BalanceTable::from_json_str(&json)?;
            }
            "--realtime" => options.realtime = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument `{other}`\n{USAGE}").into()),
        }
    }
    Ok(options)
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, Box<dyn Error>> {
    args.next()
        .ok_or_else(|| format!("{flag} needs a value\n{USAGE}").into())
}
