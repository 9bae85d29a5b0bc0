use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use clap::ArgMatches;
use tmplfmt::value::{merge_maps, ValueMap};
use tmplfmt::{Environment, Value};
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod output;

use crate::config::Config;
use crate::output::{Output, STDIN_STDOUT};

fn read_input(path: &Path, what: &str) -> Result<String, Error> {
    if path == Path::new(STDIN_STDOUT) {
        io::read_to_string(io::stdin()).with_context(|| format!("unable to read {what} from stdin"))
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("unable to read {what} file '{}'", path.display()))
    }
}

fn detect_format<'a>(format: &'a str, path: &Path) -> Result<&'a str, Error> {
    if format != "auto" {
        return Ok(format);
    }
    if path == Path::new(STDIN_STDOUT) {
        bail!("auto detection does not work with data from stdin");
    }
    Ok(match path.extension().and_then(|x| x.to_str()) {
        Some("json") => "json",
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => "yaml",
        #[cfg(feature = "toml")]
        Some("toml") => "toml",
        _ => bail!("cannot auto detect format from extension"),
    })
}

fn load_data(format: &str, path: &Path, selector: Option<&str>) -> Result<Value, Error> {
    let contents = read_input(path, "data")?;
    let format = detect_format(format, path)?;

    let mut data = match format {
        "json" => {
            Value::from_serialize(&serde_json::from_str::<serde_json::Value>(&contents)?)
        }
        #[cfg(feature = "yaml")]
        "yaml" => Value::from_serialize(&serde_yaml::from_str::<serde_yaml::Value>(&contents)?),
        #[cfg(feature = "toml")]
        "toml" => Value::from_serialize(&toml::from_str::<toml::Value>(&contents)?),
        other => bail!("unsupported format '{other}'"),
    };

    if let Some(selector) = selector {
        for part in selector.split('.') {
            let next = if let Ok(idx) = part.parse::<usize>() {
                data.get_index(idx)
            } else {
                data.get_attr(part)
            };
            if next.is_undefined() {
                bail!(
                    "unable to select {:?} in {:?} (value was {})",
                    part,
                    selector,
                    data.kind()
                );
            }
            data = next;
        }
    }

    if data.as_map().is_none() {
        bail!("failed to interpret input data as object (got {})", data.kind());
    }
    tracing::debug!(format, "loaded data file");
    Ok(data)
}

fn load_config(matches: &ArgMatches) -> Result<Config, Error> {
    #[cfg(feature = "toml")]
    let mut config = {
        let explicit = matches
            .get_one::<PathBuf>("config-file")
            .cloned()
            .or_else(|| std::env::var_os("TMPLFMT_CONFIG_FILE").map(PathBuf::from));
        match explicit {
            Some(path) => Config::load_from_toml(&path)?,
            None => match home::home_dir().map(|x| x.join(".tmplfmt.toml")) {
                Some(path) if path.is_file() => Config::load_from_toml(&path)?,
                _ => Config::default(),
            },
        }
    };
    #[cfg(not(feature = "toml"))]
    let mut config = Config::default();

    config.update_from_env()?;
    config.update_from_matches(matches)?;
    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TMPLFMT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

async fn execute() -> Result<i32, Error> {
    let matches = command::make_command().get_matches();
    let config = load_config(&matches)?;

    if matches.get_flag("print-config") {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(0);
    }

    let data_file = matches.get_one::<PathBuf>("data_file");
    let template_file = matches
        .get_one::<String>("template_file")
        .map(|x| x.as_str())
        .filter(|x| !x.is_empty());
    let source = match (matches.get_one::<String>("template"), template_file) {
        (Some(source), None) => source.clone(),
        (Some(_), Some(_)) => bail!("cannot combine --template with a template file"),
        (None, Some(path)) => {
            if path == STDIN_STDOUT && data_file.is_some_and(|x| x == Path::new(STDIN_STDOUT)) {
                bail!("cannot load template from stdin when data is from stdin");
            }
            read_input(Path::new(path), "template")?
        }
        (None, None) => bail!("no template given"),
    };

    let base = match data_file {
        Some(path) => load_data(
            config.format(),
            path,
            matches.get_one::<String>("select").map(|x| x.as_str()),
        )?,
        None => Value::from(ValueMap::new()),
    };
    let ctx = merge_maps([base, config.extra_context()]);

    let env = Environment::new();
    let mut output = Output::new(matches.get_one::<PathBuf>("output").map_or(
        Path::new(STDIN_STDOUT),
        |x| x.as_path(),
    ))?;

    if let Some(dump) = matches.get_one::<String>("dump") {
        match dump.as_str() {
            "ast" => writeln!(&mut output, "{:#?}", env.parse_template(&source)?)?,
            other => bail!("unknown dump kind '{other}'"),
        }
    } else {
        let result = env
            .render_template_with_globals(&source, ctx, config.globals())
            .await?;
        if config.newline() {
            writeln!(&mut output, "{result}")?;
        } else {
            write!(&mut output, "{result}")?;
        }
    }

    output.commit()?;
    Ok(0)
}

pub fn print_error(err: &Error) {
    eprintln!("error: {err}");
    let mut source_opt = err.source();
    while let Some(source) = source_opt {
        eprintln!();
        eprintln!("caused by: {source}");
        source_opt = source.source();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    match execute().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            print_error(&err);
            std::process::exit(1);
        }
    }
}
