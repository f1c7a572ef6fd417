use anyhow::Result;
use log::info;

use brownlow_votes::config::PipelineConfig;
use brownlow_votes::pipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = PipelineConfig::load()?;
    info!(
        "year={} data={} model={} db={}",
        config.year,
        config.data_path,
        config.model_path,
        config.db_path.display()
    );

    let outcome = pipeline::run(&config)?;
    println!("{outcome}");
    Ok(())
}
