//! Command-line flag parsing: a flat option table in the style of a
//! one-shot rendering tool, not a subcommand CLI.

use getopts::Options;

use crate::error::RenderError;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub scene_path: Option<String>,
    pub workers: u32,
    pub output: String,
    pub width: usize,
    pub height: usize,
    pub max_depth: usize,
    pub pixel_samples: u32,
    pub light_samples: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scene_path: None,
            workers: 1,
            output: "out/output.ppm".to_string(),
            width: 512,
            height: 512,
            max_depth: 5,
            pixel_samples: 2,
            light_samples: 3,
        }
    }
}

fn options() -> Options {
    let mut opts = Options::new();
    opts.optopt("s", "", "scene geometry file", "PATH");
    opts.optopt("t", "", "worker thread count", "N");
    opts.optopt("o", "", "output PPM path", "PATH");
    opts.optopt("", "wd", "image width in pixels", "PX");
    opts.optopt("", "ht", "image height in pixels", "PX");
    opts.optopt("", "rd", "max ray depth", "N");
    opts.optopt("", "ps", "pixel samples per side (total = n^2)", "N");
    opts.optopt("", "ls", "light samples per bounce", "N");
    opts.optflag("h", "help", "print this help menu");
    opts
}

/// `None` return means `--help` was requested and its usage text has
/// already been returned as `Ok` with the printed flag -- callers should
/// print it and exit 0.
pub enum ParseOutcome {
    Run(RenderConfig),
    Help(String),
}

pub fn parse(args: &[String]) -> Result<ParseOutcome, RenderError> {
    let opts = options();
    let program = args.first().cloned().unwrap_or_else(|| "aperture".to_string());
    let matches = opts
        .parse(&args[1.min(args.len())..])
        .map_err(|e| RenderError::SceneParse(format!("bad arguments: {e}")))?;

    if matches.opt_present("h") {
        let brief = format!("Usage: {program} [options]");
        return Ok(ParseOutcome::Help(opts.usage(&brief)));
    }

    let mut config = RenderConfig::default();
    config.scene_path = matches.opt_str("s");
    if let Some(v) = matches.opt_str("t") {
        config.workers = parse_field(&v, "t")?;
    }
    if let Some(v) = matches.opt_str("o") {
        config.output = v;
    }
    if let Some(v) = matches.opt_str("wd") {
        config.width = parse_field(&v, "wd")?;
    }
    if let Some(v) = matches.opt_str("ht") {
        config.height = parse_field(&v, "ht")?;
    }
    if let Some(v) = matches.opt_str("rd") {
        config.max_depth = parse_field(&v, "rd")?;
    }
    if let Some(v) = matches.opt_str("ps") {
        config.pixel_samples = parse_field(&v, "ps")?;
    }
    if let Some(v) = matches.opt_str("ls") {
        config.light_samples = parse_field(&v, "ls")?;
    }
    Ok(ParseOutcome::Run(config))
}

fn parse_field<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, RenderError> {
    value.parse().map_err(|_| RenderError::SceneParse(format!("invalid value for -{flag}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_args_yield_documented_defaults() {
        let outcome = parse(&["aperture".to_string()]).unwrap();
        match outcome {
            ParseOutcome::Run(cfg) => {
                assert_eq!(cfg.width, 512);
                assert_eq!(cfg.height, 512);
                assert_eq!(cfg.max_depth, 5);
                assert_eq!(cfg.pixel_samples, 2);
                assert_eq!(cfg.light_samples, 3);
                assert_eq!(cfg.workers, 1);
                assert_eq!(cfg.output, "out/output.ppm");
            }
            ParseOutcome::Help(_) => panic!("expected Run"),
        }
    }

    #[test]
    fn overrides_only_the_named_fields() {
        let args: Vec<String> = vec!["aperture", "-wd", "64", "-ht", "32"].into_iter().map(String::from).collect();
        let outcome = parse(&args).unwrap();
        match outcome {
            ParseOutcome::Run(cfg) => {
                assert_eq!(cfg.width, 64);
                assert_eq!(cfg.height, 32);
                assert_eq!(cfg.max_depth, 5);
            }
            ParseOutcome::Help(_) => panic!("expected Run"),
        }
    }

    #[test]
    fn help_flag_short_circuits_into_usage_text() {
        let args: Vec<String> = vec!["aperture", "--help"].into_iter().map(String::from).collect();
        match parse(&args).unwrap() {
            ParseOutcome::Help(text) => assert!(text.contains("Usage")),
            ParseOutcome::Run(_) => panic!("expected Help"),
        }
    }
}
