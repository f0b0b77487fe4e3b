use anyhow::Result;
use clap::Parser;
use embench::{random_agent::log_dir, EnvKind};
use std::path::PathBuf;

/// Runs an episode of uniformly random actions and logs the frames.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Environment name
    #[arg(long, default_value = "eb-teach")]
    env: String,

    /// The maximum number of steps
    #[arg(long, default_value_t = 30)]
    steps: usize,

    /// Root of the TEACh dataset
    #[arg(long = "data_dir", default_value = "teach/teach-dataset")]
    data_dir: PathBuf,

    /// Dataset split
    #[arg(long = "eval_set", default_value = "valid_seen")]
    eval_set: String,

    /// Side of zero frames
    #[arg(long, default_value_t = 300)]
    resolution: u32,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: i64,

    /// Root of the log directories
    #[arg(long = "log_root", default_value = "random_agent_logs")]
    log_root: PathBuf,
}

#[cfg(feature = "python")]
fn run_teach(args: &Args, dir: PathBuf) -> Result<()> {
    use embench::random_agent::run_random_agent;
    use embench_core::{Env, HEAD_RGB};
    use embench_teach_env::{PyTeachSimulator, TeachEnv, TeachEnvConfig};

    let config = TeachEnvConfig::default()
        .data_dir(args.data_dir.clone())
        .split(args.eval_set.clone())
        .resolution(args.resolution);
    let mut env = TeachEnv::<PyTeachSimulator>::build(&config, args.seed)?;
    let log = run_random_agent(
        &mut env,
        EnvKind::Teach.name(),
        args.steps,
        HEAD_RGB,
        &dir,
        args.seed as u64,
    )?;
    log::info!("Logged {} steps into {:?}", log.steps.len() - 1, dir);
    Ok(())
}

#[cfg(not(feature = "python"))]
fn run_teach(_args: &Args, _dir: PathBuf) -> Result<()> {
    anyhow::bail!("eb-teach needs the TEACh simulator; rebuild with `--features python`")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let kind: EnvKind = args.env.parse()?;
    let dir = log_dir(&args.log_root, kind.name());
    match kind {
        EnvKind::Teach => run_teach(&args, dir),
    }
}
