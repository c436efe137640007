use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use docstep_diff::{RecreateOptions, Recreator};
use docstep_model::{Node, Schema, SchemaSpec};
use docstep_transform::{Step, StepJson};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Command::Diff(args) => cmd_diff(&args, cli.format)?,
        Command::Apply(args) => cmd_apply(&args)?,
        Command::Schema => cmd_schema()?,
    };
    println!("{output}");
    Ok(())
}

fn read_doc(schema: &Schema, path: &Path) -> anyhow::Result<Node> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    schema
        .parse_doc(&input)
        .with_context(|| format!("invalid document in {}", path.display()))
}

/// Options from the config file, if any, with command-line flags on top.
fn load_options(args: &DiffArgs) -> anyhow::Result<RecreateOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let input = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&input)
                .with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => RecreateOptions::default(),
    };
    if args.simple {
        options.detailed_steps = false;
    }
    if args.words {
        options.word_diffs = true;
    }
    if args.no_simplify {
        options.simplify = false;
    }
    Ok(options)
}

fn cmd_diff(args: &DiffArgs, format: OutputFormat) -> anyhow::Result<String> {
    let recreator = Recreator::new(load_options(args)?);
    debug!(options = ?recreator.options(), "recreating steps");
    let schema = Schema::basic();
    let from = read_doc(&schema, &args.from)?;
    let to = read_doc(&schema, &args.to)?;
    let tr = recreator.recreate(&from, &to).with_context(|| {
        format!(
            "failed to recreate steps from {} to {}",
            args.from.display(),
            args.to.display()
        )
    })?;

    match format {
        OutputFormat::Json => {
            let steps: Vec<StepJson> = tr.steps().iter().map(Step::to_json).collect();
            Ok(serde_json::to_string_pretty(&steps)?)
        }
        OutputFormat::Text => {
            if tr.steps().is_empty() {
                return Ok(format!("{} Documents are identical.", "✓".green().bold()));
            }
            let mut lines: Vec<String> = tr
                .steps()
                .iter()
                .enumerate()
                .map(|(i, step)| format!("{:>4}  {}", (i + 1).to_string().dimmed(), paint(step)))
                .collect();
            let mode = if recreator.options().detailed_steps { "detailed" } else { "simple" };
            lines.push(format!(
                "{} {} step(s), {} mode",
                "✓".green().bold(),
                tr.steps().len(),
                mode
            ));
            Ok(lines.join("\n"))
        }
    }
}

fn paint(step: &Step) -> ColoredString {
    let line = step.to_string();
    match step {
        Step::Replace { .. } => line.yellow(),
        Step::SetNodeMarkup { .. } => line.cyan(),
        Step::AddMark { .. } => line.green(),
        Step::RemoveMark { .. } => line.red(),
    }
}

fn cmd_apply(args: &ApplyArgs) -> anyhow::Result<String> {
    let schema = Schema::basic();
    let mut doc = read_doc(&schema, &args.doc)?;
    let input = fs::read_to_string(&args.steps)
        .with_context(|| format!("failed to read {}", args.steps.display()))?;
    let steps: Vec<StepJson> = serde_json::from_str(&input)
        .with_context(|| format!("invalid step list in {}", args.steps.display()))?;

    for (i, json) in steps.iter().enumerate() {
        let step = Step::from_json(&schema, json)
            .with_context(|| format!("invalid step {}", i + 1))?;
        doc = step
            .apply(&doc)
            .with_context(|| format!("step {} ({}) does not apply", i + 1, step.kind()))?;
    }
    Ok(serde_json::to_string_pretty(&doc.to_json())?)
}

fn cmd_schema() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&SchemaSpec::basic())?)
}
