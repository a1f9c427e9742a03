//! Record export as CSV or JSON Lines

use anyhow::Context;
use rc_core::{ClauseRecord, OutputFormat, RcError, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Write records in the requested format, CSV with a header row
pub async fn write_records<W>(
    writer: W,
    records: &[ClauseRecord],
    format: OutputFormat,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    match format {
        OutputFormat::Csv => write_csv(writer, records, true).await,
        OutputFormat::Jsonl => write_jsonl(writer, records).await,
    }
}

/// Write records after existing output; CSV rows carry no header
pub async fn append_records<W>(
    writer: W,
    records: &[ClauseRecord],
    format: OutputFormat,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    match format {
        OutputFormat::Csv => write_csv(writer, records, false).await,
        OutputFormat::Jsonl => write_jsonl(writer, records).await,
    }
}

/// CSV, with a header row taken from the record fields when `header` is set
pub async fn write_csv<W>(writer: W, records: &[ClauseRecord], header: bool) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut serializer = csv_async::AsyncWriterBuilder::new()
        .has_headers(header)
        .create_serializer(writer);
    for record in records {
        serializer
            .serialize(record)
            .await
            .map_err(|e| RcError::Export(e.to_string()))?;
    }
    serializer
        .flush()
        .await
        .context("flushing CSV output")?;
    Ok(())
}

/// One JSON object per line
pub async fn write_jsonl<W>(mut writer: W, records: &[ClauseRecord]) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| RcError::Export(e.to_string()))?;
        writer
            .write_all(line.as_bytes())
            .await
            .context("writing JSON Lines output")?;
        writer.write_all(b"\n").await.context("writing JSON Lines output")?;
    }
    writer.flush().await.context("flushing JSON Lines output")?;
    Ok(())
}
