use clap::{Arg, Command};

pub const CACHE_CMD: &str = "cache";
pub const CACHE_FETCH: &str = "fetch";
pub const CACHE_SEEK: &str = "seek";
pub const CACHE_LIST: &str = "list";
pub const CACHE_REMOVE: &str = "rm";

fn cache_folder_arg() -> Arg {
    Arg::new("cache-folder")
        .long("cache-folder")
        .short('f')
        .help("Cache folder path")
}

fn name_arg() -> Arg {
    Arg::new("name")
        .long("name")
        .short('n')
        .required(true)
        .help("Dataset name")
}

pub fn create_cache_cli() -> Command {
    Command::new(CACHE_CMD)
        .about("Download, combine and cache datasets described by recipes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CACHE_FETCH)
                .about("Build a dataset from its recipe unless it is already cached")
                .arg(name_arg())
                .arg(
                    Arg::new("recipes")
                        .long("recipes")
                        .short('r')
                        .required(true)
                        .help("TOML file with [[dataset]] recipes"),
                )
                .arg(cache_folder_arg()),
        )
        .subcommand(
            Command::new(CACHE_SEEK)
                .about("Print the path of a cached dataset")
                .arg(name_arg())
                .arg(cache_folder_arg()),
        )
        .subcommand(
            Command::new(CACHE_LIST)
                .about("List the cached datasets")
                .arg(cache_folder_arg()),
        )
        .subcommand(
            Command::new(CACHE_REMOVE)
                .about("Remove a dataset from the cache")
                .arg(name_arg())
                .arg(cache_folder_arg()),
        )
}
