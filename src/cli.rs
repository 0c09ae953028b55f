use pico_args::Arguments;

/// Parsed command-line options.
pub struct Args {
    /// Explicit config path, overriding RESOLVIT_CONFIG and the default.
    pub config: Option<String>,
}

pub fn print_help() {
    println!("resolvit {}\n", env!("CARGO_PKG_VERSION"));
    println!("Usage: resolvit [OPTIONS]\n");
    println!("OPTIONS:");
    println!("  -c, --config <file>   Configuration file path");
    println!("                        (default: RESOLVIT_CONFIG or /etc/resolvit/resolvit.conf)");
    println!("      --version         Print version and exit");
    println!("  -h, --help            Print this help message");
}

/// Parse CLI arguments using `pico-args`.
/// Returns `None` when help or version was printed and the caller should
/// exit with status 0.
pub fn parse_args() -> Option<Args> {
    let mut pargs = Arguments::from_env();

    if pargs.contains("--version") {
        println!("resolvit version {}", env!("CARGO_PKG_VERSION"));
        return None;
    }

    if pargs.contains(["-h", "--help"]) {
        print_help();
        return None;
    }

    let config = match pargs.opt_value_from_str(["-c", "--config"]) {
        Ok(value) => value,
        Err(_) => None,
    };

    Some(Args { config })
}
