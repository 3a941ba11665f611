use serde::Deserialize;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use super::{csv, format::ReportContext, pdf, xlsx, ReportError};
use crate::models::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// A rendered report ready to be downloaded or written to disk.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

pub fn export(
    format: ExportFormat,
    orders: &[Order],
    ctx: &ReportContext,
) -> Result<ReportArtifact, ReportError> {
    let bytes = match format {
        ExportFormat::Pdf => pdf::render(orders, ctx)?,
        ExportFormat::Xlsx => xlsx::render(orders, ctx)?,
        ExportFormat::Csv => csv::render(orders).into_bytes(),
    };

    Ok(ReportArtifact {
        format,
        file_name: ctx.file_name(format.extension()),
        bytes,
    })
}

/// Writes the artifact into `dir`, creating it if needed. A report generated
/// twice on the same day replaces the earlier file.
pub async fn persist(dir: &Path, artifact: &ReportArtifact) -> Result<PathBuf, ReportError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes).await?;

    tracing::info!(
        path = %path.display(),
        bytes = artifact.bytes.len(),
        "report saved"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> ReportContext {
        ReportContext::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    #[test]
    fn artifacts_are_named_by_date_and_format() {
        for format in [ExportFormat::Pdf, ExportFormat::Xlsx, ExportFormat::Csv] {
            let artifact = export(format, &[], &ctx()).unwrap();
            assert_eq!(
                artifact.file_name,
                format!("reporte_pedidos_2024-06-30.{}", format.extension())
            );
            assert!(!artifact.bytes.is_empty());
        }
    }

    #[test]
    fn format_parses_lowercase_names() {
        let format: ExportFormat = serde_json::from_str("\"xlsx\"").unwrap();
        assert_eq!(format, ExportFormat::Xlsx);
        assert_eq!(format.content_type(), "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet");
    }

    #[tokio::test]
    async fn persist_writes_into_reports_dir() {
        let dir = std::env::temp_dir().join(format!("gramy-reports-{}", std::process::id()));
        let artifact = export(ExportFormat::Csv, &[], &ctx()).unwrap();

        let path = persist(&dir, &artifact).await.unwrap();
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, artifact.bytes);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
