//! Console front end for the 3-D RRT planner.
//!
//! Runs the planner once and prints the start, goal, and either the found
//! path or a failure notice. An optional first argument names a JSON file
//! with [`Config`] fields; anything it leaves out keeps its default.
//! Log verbosity follows `RUST_LOG`.

use anyhow::Context;
use rrt_core::{Config, Planner};
use std::{env, fs};

/// Parses a JSON configuration, filling missing fields from the defaults.
fn parse_config(text: &str) -> anyhow::Result<Config> {
    serde_json::from_str(text).context("malformed configuration")
}

/// Reads the configuration at `path`, or returns the defaults if none is given.
fn load_config(path: Option<&str>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    parse_config(&text).with_context(|| format!("parsing {path}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let path = env::args().nth(1);
    let cfg = load_config(path.as_deref())?;
    log::debug!("configuration: {cfg:?}");

    let mut planner = Planner::from_config(cfg).context("invalid configuration")?;
    let report = planner.run()?;

    print!("{report}");
    log::info!("tree holds {} nodes", report.nodes);
    Ok(())
}
