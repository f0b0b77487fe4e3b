use anyhow::Result;
use clap::Parser;
use embench::{cli::EvalArgs, EnvKind, EvalConfig};
use embench_core::record::{Record, RecordValue};
use log::{info, warn};

#[cfg(feature = "python")]
fn run_teach(config: EvalConfig) -> Result<Record> {
    use embench::TeachEvaluator;
    use embench_teach_env::PyTeachSimulator;
    TeachEvaluator::new(config).run_remote::<PyTeachSimulator>()
}

#[cfg(not(feature = "python"))]
fn run_teach(_config: EvalConfig) -> Result<Record> {
    anyhow::bail!("eb-teach needs the TEACh simulator; rebuild with `--features python`")
}

fn log_summary(record: &Record) {
    let mut keys: Vec<_> = record.keys().collect();
    keys.sort();
    for k in keys {
        match record.get(k) {
            Some(RecordValue::Scalar(v)) => info!("{}: {:.4}", k, v),
            Some(v) => info!("{}: {}", k, v.to_json()),
            None => {}
        }
    }
}

fn main() -> Result<()> {
    let args = EvalArgs::parse();
    let kind: EnvKind = args.env.parse()?;
    let (config, loaded) = args.load_config(kind)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();
    let path = args.config_path(kind);
    if loaded {
        info!("Loaded {:?}", path);
    } else {
        warn!("{:?} not found, using the default configuration", path);
    }
    info!("Evaluating environment: {}", kind);

    let summary = match kind {
        EnvKind::Teach => run_teach(config)?,
    };
    log_summary(&summary);
    info!("Evaluation completed");
    Ok(())
}
