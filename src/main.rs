use anyhow::Context;
use clap::Parser;
use dryland::adapters::build_geocoder;
use dryland::utils::{logger, validation::Validate};
use dryland::{
    BatchEngine, CliConfig, CoordinateValidator, CorrectionMode, CorrectionPipeline,
    CsvRecordStore, RegionConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let log_format = if config.json_logs {
        logger::LogFormat::Json
    } else {
        logger::LogFormat::Compact
    };
    logger::init_logger(log_format, config.verbose);

    tracing::info!("Starting dryland ({:?} mode)", config.mode);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    config.validate().context("invalid command line")?;

    let mut region_config = match &config.config {
        Some(path) => RegionConfig::from_file(path)
            .with_context(|| format!("failed to load region config '{}'", path))?,
        None => {
            tracing::info!("No region config given, using the built-in New Orleans table");
            RegionConfig::new_orleans()
        }
    };

    if config.provider.is_some() || config.api_key.is_some() {
        let mut geocoding = region_config.geocoding();
        if let Some(provider) = config.provider {
            geocoding.provider = Some(provider);
            geocoding.endpoint = None;
        }
        if let Some(api_key) = &config.api_key {
            geocoding.api_key = Some(api_key.clone());
        }
        region_config.geocoding = Some(geocoding);
    }

    region_config
        .validate()
        .context("region config validation failed")?;
    tracing::info!(
        "Region table: {} water regions, {} safe defaults",
        region_config.region.water_regions.len(),
        region_config.region.safe_defaults.len()
    );

    let store = CsvRecordStore::new(&config.input, &config.output);
    let validator = CoordinateValidator::new(region_config.region.clone());
    let mut pipeline = CorrectionPipeline::new(store, validator, config.mode);

    if config.mode == CorrectionMode::Geocode {
        let geocoding = region_config.geocoding();
        let geocoder = build_geocoder(&geocoding).context("failed to set up geocoder")?;
        tracing::info!(
            "Geocoding with {:?} at {} (min interval {:?})",
            geocoding.provider(),
            geocoding.endpoint(),
            geocoding.min_interval()
        );
        pipeline = pipeline.with_geocoder(geocoder, geocoding.retry_policy());
    }
    if let Some(seed) = config.seed {
        pipeline = pipeline.with_seed(seed);
    }

    let engine = BatchEngine::new(pipeline).dry_run(config.dry_run);
    let summary = engine.run().await.context("correction run failed")?;

    println!("{}", summary.report);
    match &summary.output {
        Some(output) => println!("Output saved to: {}", output),
        None => println!("Dry run, nothing written"),
    }
    tracing::info!("Finished in {:?}", summary.elapsed);

    Ok(())
}
