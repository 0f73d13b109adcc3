use crate::core::{NormalizedTable, Pipeline};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub table: NormalizedTable,
    pub output_path: Option<String>,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<EtlOutcome> {
        tracing::info!("Starting employee ETL");

        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} raw records", raw_data.len());

        let table = self.pipeline.transform(raw_data).await?;
        tracing::info!("Normalized {} records", table.len());

        let output_path = self.pipeline.load(&table).await?;
        if let Some(path) = &output_path {
            tracing::info!("Normalized table saved to: {}", path);
        }

        Ok(EtlOutcome { table, output_path })
    }
}
