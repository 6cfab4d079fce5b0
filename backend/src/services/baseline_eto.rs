//! Baseline ETₒ lookup
//!
//! Reads the raster header and a single pixel per request. Byte sources use
//! absolute file offsets: the header is bytes 0-31 and pixel data follows.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::header::RANGE;
use reqwest::Client;
use shared::{round_to_significant, BaselineEToRasterMeta, DomainError, GeoCoordinates, HEADER_SIZE};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Random access to the raster file
#[axum::async_trait]
pub trait BaselineEToByteSource: Send + Sync {
    /// The 32 byte file header
    async fn read_header_bytes(&self) -> Result<[u8; HEADER_SIZE], DomainError>;

    /// One byte at an absolute file offset
    async fn read_byte(&self, offset: u64) -> Result<u8, DomainError>;
}

/// Raster stored on the local filesystem
#[derive(Debug, Clone)]
pub struct FileByteSource {
    path: PathBuf,
}

impl FileByteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), DomainError> {
        let unavailable = |e: std::io::Error| DomainError::DataUnavailable(e.to_string());

        let mut file = tokio::fs::File::open(&self.path).await.map_err(unavailable)?;
        file.seek(std::io::SeekFrom::Start(offset))
            .await
            .map_err(unavailable)?;
        file.read_exact(buf).await.map_err(unavailable)?;
        Ok(())
    }
}

#[axum::async_trait]
impl BaselineEToByteSource for FileByteSource {
    async fn read_header_bytes(&self) -> Result<[u8; HEADER_SIZE], DomainError> {
        let mut header = [0u8; HEADER_SIZE];
        self.read_exact_at(0, &mut header).await?;
        Ok(header)
    }

    async fn read_byte(&self, offset: u64) -> Result<u8, DomainError> {
        let mut byte = [0u8; 1];
        self.read_exact_at(offset, &mut byte).await?;
        Ok(byte[0])
    }
}

/// Raster served over HTTP with range request support
#[derive(Clone)]
pub struct HttpRangeByteSource {
    client: Client,
    url: String,
}

impl HttpRangeByteSource {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    async fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>, DomainError> {
        let last = offset + len as u64 - 1;
        let response = self
            .client
            .get(&self.url)
            .header(RANGE, format!("bytes={}-{}", offset, last))
            .send()
            .await
            .map_err(|e| DomainError::DataUnavailable(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::DataUnavailable(format!(
                "range request returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::DataUnavailable(e.without_url().to_string()))?;

        // A server that ignores the range header returns the whole file.
        let start = if bytes.len() > len { offset as usize } else { 0 };
        bytes
            .get(start..start + len)
            .map(|slice| slice.to_vec())
            .ok_or_else(|| DomainError::DataUnavailable("unexpected end of file".to_string()))
    }
}

#[axum::async_trait]
impl BaselineEToByteSource for HttpRangeByteSource {
    async fn read_header_bytes(&self) -> Result<[u8; HEADER_SIZE], DomainError> {
        let bytes = self.read_range(0, HEADER_SIZE).await?;
        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&bytes);
        Ok(header)
    }

    async fn read_byte(&self, offset: u64) -> Result<u8, DomainError> {
        Ok(self.read_range(offset, 1).await?[0])
    }
}

/// Pick a byte source for a configured path or URL
pub fn byte_source_for(location: &str) -> Arc<dyn BaselineEToByteSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpRangeByteSource::new(location.to_string()))
    } else {
        Arc::new(FileByteSource::new(location))
    }
}

/// Per-request reader over a byte source
pub struct BaselineEToReader {
    source: Arc<dyn BaselineEToByteSource>,
    meta: Option<BaselineEToRasterMeta>,
}

impl BaselineEToReader {
    pub fn new(source: Arc<dyn BaselineEToByteSource>) -> Self {
        Self { source, meta: None }
    }

    /// Read and validate the file header
    pub async fn read_header(&mut self) -> Result<&BaselineEToRasterMeta, DomainError> {
        let header = self.source.read_header_bytes().await?;
        let meta = BaselineEToRasterMeta::from_header(&header)?;
        tracing::debug!(
            version = meta.format_version,
            width = meta.width,
            height = meta.height,
            "Read baseline ETo header"
        );
        Ok(self.meta.insert(meta))
    }

    /// Average daily baseline ETₒ (mm/day), optionally rounded to `precision` significant digits
    pub async fn average_daily_eto(
        &self,
        coordinates: &GeoCoordinates,
        precision: Option<u32>,
    ) -> Result<f64, DomainError> {
        let meta = self.meta.as_ref().ok_or(DomainError::NotInitialized)?;
        let offset = meta.file_offset(coordinates)?;
        let pixel = self.source.read_byte(offset).await?;
        let eto = meta.daily_eto(pixel)?;

        Ok(match precision {
            Some(digits) => round_to_significant(eto, digits),
            None => eto,
        })
    }
}
