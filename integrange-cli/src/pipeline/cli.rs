use clap::{Command, arg};

pub const PIPELINE_CMD: &str = "pipeline";

pub fn create_pipeline_cli() -> Command {
    Command::new(PIPELINE_CMD)
        .about("Run the DE/DA integration workflow described by a TOML config.")
        .arg_required_else_help(true)
        .arg(arg!(-c --config <TOML> "Pipeline config file").required(true))
}
