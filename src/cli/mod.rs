// FILE: src/cli/mod.rs

mod config;
mod handlers;

use crate::error::Result;
use crate::rules::Framework;
use crate::{EngineOptions, TieBreak};
use clap::{Arg, ArgAction, Command, ValueEnum};
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrameworkArg {
    ReactTailwind,
    ReactTailwindV4,
    HtmlCss,
    ReactInline,
}

impl From<FrameworkArg> for Framework {
    fn from(arg: FrameworkArg) -> Self {
        match arg {
            FrameworkArg::ReactTailwind => Framework::ReactTailwind,
            FrameworkArg::ReactTailwindV4 => Framework::ReactTailwindV4,
            FrameworkArg::HtmlCss => Framework::HtmlCss,
            FrameworkArg::ReactInline => Framework::ReactInline,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TieBreakArg {
    InputOrder,
    RuleId,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::InputOrder => TieBreak::InputOrder,
            TieBreakArg::RuleId => TieBreak::RuleId,
        }
    }
}

pub struct Cli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"))?;

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        let result = match matches.subcommand() {
            Some(("normalize", sub_matches)) => handlers::handle_normalize_command(self, sub_matches),
            Some(("match", sub_matches)) => handlers::handle_match_command(self, sub_matches),
            Some(("check-rules", sub_matches)) => handlers::handle_check_rules_command(sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        };

        log::debug!("Finished in {:.2}ms", self.start_time.elapsed().as_secs_f64() * 1000.0);
        result
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.toml or .json)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("normalize")
                    .about("Normalize a design-tool node tree and print it as JSON")
                    .arg(Arg::new("input").help("Source tree JSON file").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Write output to a file instead of stdout"))
                    .arg(Arg::new("variables").long("variables").value_name("FILE").help("Variable binding JSON file"))
                    .arg(Arg::new("stats").long("stats").help("Print tree statistics").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("match")
                    .about("Evaluate mapping rules against a normalized tree")
                    .arg(Arg::new("input").help("Source tree JSON file").required(true).index(1))
                    .arg(Arg::new("rules").short('r').long("rules").value_name("FILE").help("Rule set JSON file").required(true))
                    .arg(Arg::new("framework").short('f').long("framework").value_parser(clap::value_parser!(FrameworkArg)).help("Target framework"))
                    .arg(Arg::new("tie-break").long("tie-break").value_parser(clap::value_parser!(TieBreakArg)).help("Ordering for equal-priority matches"))
                    .arg(Arg::new("major").long("major").value_name("KEY").help("Contributed property whose overlap is a major conflict").action(ArgAction::Append))
                    .arg(Arg::new("include-disabled").long("include-disabled").help("Also evaluate disabled rules").action(ArgAction::SetTrue))
                    .arg(Arg::new("node").short('n').long("node").value_name("ID").help("Only report this node"))
                    .arg(Arg::new("variables").long("variables").value_name("FILE").help("Variable binding JSON file"))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Write output to a file instead of stdout")),
            )
            .subcommand(
                Command::new("check-rules")
                    .about("Validate a rule set file")
                    .arg(Arg::new("input").help("Rule set JSON file").required(true).index(1)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    /// Engine options from defaults, then the config file, then flags
    pub fn build_engine_options(&self, matches: &clap::ArgMatches) -> Result<EngineOptions> {
        let mut options = EngineOptions::default();

        if let Some(framework) = self.config.framework {
            options.framework = framework;
        }
        if let Some(tie_break) = self.config.tie_break {
            options.tie_break = tie_break;
        }
        if let Some(major) = &self.config.major_properties {
            options.major_properties = major.clone();
        }
        options.include_disabled = self.config.include_disabled.unwrap_or(false);

        if let Some(framework) = matches.get_one::<FrameworkArg>("framework") {
            options.framework = (*framework).into();
        }
        if let Some(tie_break) = matches.get_one::<TieBreakArg>("tie-break") {
            options.tie_break = (*tie_break).into();
        }
        if let Some(major) = matches.get_many::<String>("major") {
            options.major_properties = major.cloned().collect();
        }
        if matches.get_flag("include-disabled") {
            options.include_disabled = true;
        }

        log::debug!("Engine options: {:?}", options);
        Ok(options)
    }

    /// Variable file from the command line, falling back to the config file
    pub fn variables_path<'m>(&'m self, matches: &'m clap::ArgMatches) -> Option<&'m str> {
        matches
            .get_one::<String>("variables")
            .map(String::as_str)
            .or(self.config.variables.as_deref())
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_args(cli: &Cli, args: &[&str]) -> clap::ArgMatches {
        let mut argv = vec!["altrules", "match", "tree.json", "--rules", "rules.json"];
        argv.extend_from_slice(args);
        let matches = cli.build_cli().get_matches_from(argv);
        let (_, sub) = matches.subcommand().unwrap();
        sub.clone()
    }

    #[test]
    fn test_defaults_without_config_or_flags() {
        let cli = Cli::new();
        let options = cli.build_engine_options(&match_args(&cli, &[])).unwrap();
        assert_eq!(options, EngineOptions::default());
    }

    #[test]
    fn test_flags_override_config() {
        let mut cli = Cli::new();
        cli.config.framework = Some(Framework::HtmlCss);
        cli.config.tie_break = Some(TieBreak::RuleId);
        cli.config.include_disabled = Some(true);

        let options = cli.build_engine_options(&match_args(&cli, &[])).unwrap();
        assert_eq!(options.framework, Framework::HtmlCss);
        assert_eq!(options.tie_break, TieBreak::RuleId);
        assert!(options.include_disabled);

        let args = match_args(
            &cli,
            &["-f", "react-tailwind-v4", "--tie-break", "input-order", "--major", "display"],
        );
        let options = cli.build_engine_options(&args).unwrap();
        assert_eq!(options.framework, Framework::ReactTailwindV4);
        assert_eq!(options.tie_break, TieBreak::InputOrder);
        assert_eq!(options.major_properties, vec!["display".to_string()]);
    }

    #[test]
    fn test_variables_path_precedence() {
        let mut cli = Cli::new();
        cli.config.variables = Some("from-config.json".to_string());

        let args = match_args(&cli, &[]);
        assert_eq!(cli.variables_path(&args), Some("from-config.json"));

        let args = match_args(&cli, &["--variables", "cli.json"]);
        assert_eq!(cli.variables_path(&args), Some("cli.json"));
    }
}
