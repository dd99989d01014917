use crate::core::Pipeline;
use crate::domain::model::BatchReport;
use crate::utils::error::Result;
use std::time::{Duration, Instant};
use tracing::Instrument;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: BatchReport,
    /// Where the records were written; `None` on a dry run.
    pub output: Option<String>,
    pub elapsed: Duration,
}

pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
    dry_run: bool,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[tracing::instrument(name = "batch_run", skip(self), fields(dry_run = self.dry_run))]
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("Starting coordinate correction run");

        let records = self
            .pipeline
            .extract()
            .instrument(tracing::info_span!("extract"))
            .await?;
        tracing::info!("Extracted {} records", records.len());

        let outcome = self
            .pipeline
            .transform(records)
            .instrument(tracing::info_span!("transform"))
            .await?;
        tracing::info!("{}", outcome.report);

        let output = if self.dry_run {
            tracing::info!("Dry run, {} corrections not saved", outcome.report.corrected());
            None
        } else {
            let location = self
                .pipeline
                .load(&outcome)
                .instrument(tracing::info_span!("load"))
                .await?;
            tracing::info!("Output saved to: {}", location);
            Some(location)
        };

        Ok(RunSummary {
            report: outcome.report,
            output,
            elapsed: started.elapsed(),
        })
    }
}
