mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use keyward_game::{BuiltinContent, Content, ContentLoader};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{LogicTester, Scenario, ScenarioResult, resolve_seed_inputs, run_script};

#[derive(Debug, Parser)]
#[command(name = "keyward-tester", version = "0.1.0")]
#[command(about = "Headless scenario runner and command replayer for the Keyward engine")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, or `all`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Replay a file of typed commands against the first seed instead of running scenarios
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let content = BuiltinContent
        .load_content()
        .context("built-in content failed validation")?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;

    if let Some(path) = &args.script {
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let seed = seed_infos
            .first()
            .map_or_else(|| "1337".to_string(), |info| info.label.clone());
        return replay_script(&args, &seed, &script, &content);
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios)?;
    log::info!(
        "running {} scenario(s) over {} seed(s), {} iteration(s) each",
        scenarios.len(),
        seed_infos.len(),
        args.iterations
    );

    let tester = LogicTester::new(args.verbose, content);
    let results: Vec<ScenarioResult> = scenarios
        .iter()
        .flat_map(|scenario| tester.run_scenario(*scenario, &seed_infos, args.iterations))
        .collect();

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for scenario in Scenario::ALL {
        writeln!(
            output_target.writer(),
            "  {:15} - {}",
            scenario.as_str(),
            scenario.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Keyward Automated Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn expand_scenarios(scenarios_arg: &str) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for token in split_csv(scenarios_arg) {
        if token.eq_ignore_ascii_case("all") {
            scenarios.extend(Scenario::ALL);
        } else {
            scenarios.push(token.parse::<Scenario>()?);
        }
    }
    let mut unique = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        if !unique.contains(&scenario) {
            unique.push(scenario);
        }
    }
    Ok(unique)
}

fn replay_script(args: &Args, seed: &str, script: &str, content: &Content) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    for line in run_script(seed, script, content) {
        writeln!(output_target.writer(), "{line}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Keyward Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
            script: None,
        }
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: "1337".to_string(),
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            best_day: 2,
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("all,smoke").unwrap();
        assert_eq!(expanded, Scenario::ALL.to_vec());
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("siege, smoke").unwrap();
        assert_eq!(expanded, vec![Scenario::Siege, Scenario::Smoke]);
    }

    #[test]
    fn unknown_scenarios_are_rejected() {
        let err = expand_scenarios("smoke,warp").unwrap_err();
        assert!(err.to_string().contains("warp"));
    }

    #[test]
    fn split_csv_trims_and_filters() {
        assert_eq!(split_csv(" alpha, ,beta,  gamma "), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = std::env::temp_dir().join("keyward-scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("determinism"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let temp = std::env::temp_dir().join("keyward-report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = std::env::temp_dir().join("keyward-report-empty.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_failures() {
        let temp = std::env::temp_dir().join("keyward-report-console.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("failure"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn replay_script_writes_transcript() {
        let temp = std::env::temp_dir().join("keyward-script.txt");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        let content = Content::builtin();
        replay_script(&args, "1337", "explore\nend\n", content).unwrap();
        let text = std::fs::read_to_string(temp).unwrap();
        assert!(text.contains("> explore"));
        assert!(text.contains("> end"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
