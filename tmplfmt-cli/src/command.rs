use std::path::PathBuf;

use clap::builder::ArgPredicate;
use clap::{arg, command, value_parser, ArgAction, Command};

const ADVANCED: &str = "Advanced";
const BEHAVIOR: &str = "Template Behavior";

/// Supported data formats with their detected file extensions.
pub static SUPPORTED_FORMATS: &[(&str, &str, &[&str])] = &[
    ("json", "JSON", &["json"]),
    #[cfg(feature = "toml")]
    ("toml", "TOML", &["toml"]),
    #[cfg(feature = "yaml")]
    ("yaml", "YAML", &["yaml", "yml"]),
];

fn format_formats(s: &str) -> String {
    use std::fmt::Write;
    let mut formats = String::new();

    for (fmt, title, exts) in SUPPORTED_FORMATS.iter() {
        write!(formats, "- {} ({}): ", fmt, title).ok();
        for (idx, ext) in exts.iter().enumerate() {
            if idx > 0 {
                formats.push_str(", ");
            }
            formats.push_str("*.");
            formats.push_str(ext);
        }
        formats.push('\n');
    }

    s.replace("###FORMATS###", &formats)
}

pub(super) fn make_command() -> Command {
    command!()
        .max_term_width(120)
        .args([
            #[cfg(feature = "toml")]
            arg!(--"config-file" <PATH> "Alternative path to the config file")
                .long_help("\
                    Sets an alternative path to the config file.  By default the config file \
                    is loaded from $HOME/.tmplfmt.toml if it exists.\n\n\
                    \
                    [env var: TMPLFMT_CONFIG_FILE]")
                .value_parser(value_parser!(PathBuf)),
            arg!(-f --format <FORMAT> "The format of the input data")
                .long_help(format_formats("\
                    Sets the format of the input data.\n\n\
                    \
                    The following formats are supported (and the default detected file extensions):\n\n\
                    - auto\n\
                    ###FORMATS###\n\
                    Auto detection (auto) is unavailable when stdin is used as input format.\n\n\
                    \
                    [env var: TMPLFMT_FORMAT]"))
                .value_parser([
                    "auto",
                    "json",
                    #[cfg(feature = "toml")]
                    "toml",
                    #[cfg(feature = "yaml")]
                    "yaml",
                ]),
            arg!(-D --define <EXPR> "Defines an input variable (key=value / key:=json_value)")
                .long_help("\
                    This defines an input variable for the template.  It supports three forms: \
                    key defines a single bool, key=value defines a string value, key:=json_value \
                    defines a JSON value.  Defines take precedence over the data file.\n\n\
                    \
                    Examples:\n\
                    -D name=Peter       defines a basic string\n\
                    -D user_id:=42      defines an integer\n\
                    -D is_active        shortform to define true boolean")
                .action(ArgAction::Append),
            arg!(--"no-globals" "Do not register the base functions")
                .long_help("\
                    Renders without the base functions (if, and, or, not, concat).  Only the \
                    data file, defines and ENV are visible to the template.\n\n\
                    \
                    [env var: TMPLFMT_GLOBALS]")
                .help_heading(BEHAVIOR),
            arg!(--env "Pass environment variables as ENV to the template")
                .long_help("\
                    Pass environment variables to the template and make them available under the ENV \
                    variable within the template.\n\n\
                    \
                    [env var: TMPLFMT_ENV]")
                .help_heading(BEHAVIOR),
            arg!(-n --"no-newline" "Do not output a trailing newline")
                .long_help("\
                    Do not output a trailing newline after rendering.\n\n\
                    \
                    [env var: TMPLFMT_NEWLINE]")
                .help_heading(BEHAVIOR),
            arg!(-t --template <TEMPLATE_STRING> "Render a string template")
                .long_help("\
                    Renders a template from a string instead of the file given.\n\n\
                    \
                    Example: tmplfmt-cli --template='Hello {name}' -Dname=World"),
            arg!(--dump <KIND> "Dump internals of a template")
                .long_help("\
                    Dump internals of a template to stdout.  'ast' prints the parse tree.")
                .value_parser(["ast"])
                .help_heading(ADVANCED),
            arg!(-o --output <FILENAME> "Path to the output file")
                .long_help("\
                    Path to the output file instead of stdout.  Files are written atomically: if \
                    rendering fails the original file remains.")
                .default_value("-")
                .value_parser(value_parser!(PathBuf)),
            arg!(--select <SELECTOR> "Select a subset of the input data")
                .long_help("\
                    Select a subset of the input data with a dotted path.\n\n\
                    \
                    For instance with --select=values the keys of the values section of the \
                    data file become top level variables.  Numeric parts index into lists \
                    (eg: --select=values.0.box)."),
            arg!(--"print-config" "Print out the loaded config"),
            arg!(template_file: [TEMPLATE_FILE] "Path to the input template")
                .long_help("\
                    This is the path to the input template.  If not provided this defaults \
                    to '-' which means the template is loaded from stdin.\n\n\
                    \
                    This argument can be set to an empty string when --template is provided \
                    to allow a data file to be supplied.")
                .default_value("-")
                .default_value_if("template", ArgPredicate::IsPresent, None),
            arg!(data_file: [DATA_FILE] "Path to the data file")
                .long_help("\
                    Path to the data file in the given format.  When data is read from stdin \
                    (by using '-' as file name), --format must be specified.")
                .value_parser(value_parser!(PathBuf)),
        ])
        .about("tmplfmt-cli renders injected-variable templates such as 'Hello {user.name}!'.")
        .after_help("Logging is controlled with the TMPLFMT_LOG environment variable (eg: TMPLFMT_LOG=debug).")
}
