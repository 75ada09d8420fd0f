//! Core fetcher implementation.
//!
//! A fetch resolves the archive metadata, compares the remote length with any
//! local file, then streams the missing bytes to disk:
//!
//! 1. `GET {root}/archive/{id}/info` gives the remote length (404 means the
//!    identifier is unknown, 401 or 403 a rejected key; nothing is written).
//! 2. The existing file, if any, is handled according to [`IfExists`].
//! 3. `GET {root}/archive/{id}`, with `Range: bytes={offset}-` when resuming,
//!    is streamed to `{destination}/{id}.tar.gz`.
//! 4. The final length must equal the remote length.
//!
//! Network failures leave the partial file in place; calling `fetch` again with
//! [`IfExists::Resume`] continues from where it stopped. Two concurrent fetches
//! of the same identifier into the same directory are not coordinated and
//! must be serialized by the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mlhub_archive::{FetcherBuilder, IfExists};
//! use std::path::Path;
//!
//! # async fn example() -> mlhub_archive::Result<()> {
//! let fetcher = FetcherBuilder::new().api_key("my-api-key").build()?;
//! let path = fetcher
//!     .fetch("sn1_AOI_1_RIO", Path::new("./archives"), IfExists::Resume)
//!     .await?;
//! println!("archive at {}", path.display());
//! # Ok(())
//! # }
//! ```

use super::config::FetcherConfig;
use crate::archive::{
    archive_filename, local_length, validate_identifier, ArchiveInfo, ArchiveReference, IfExists,
    Status, Summary, TransferState,
};
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig};
use crate::progress::{NoProgress, Progress, ProgressBarObserver, ProgressObserver};
use crate::utils::{content_range_start, content_range_total};

use futures::stream::{self, StreamExt};
use reqwest::{
    header::{ACCEPT, RANGE},
    Response, StatusCode, Url,
};
use reqwest_middleware::ClientWithMiddleware;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::{fs, fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, warn};

/// Fetches collection archives from the catalog API.
///
/// A fetcher is created via its builder:
///
/// ```rust
/// # fn main() -> mlhub_archive::Result<()> {
/// use mlhub_archive::FetcherBuilder;
///
/// let fetcher = FetcherBuilder::new().build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Fetcher {
    config: FetcherConfig,
    root_url: Url,
    client: ClientWithMiddleware,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .finish()
    }
}

impl Fetcher {
    /// Creates a new Fetcher with the given configuration.
    pub(crate) fn new(config: FetcherConfig) -> Result<Self> {
        let mut root = config.root_url.clone();
        if !root.ends_with('/') {
            root.push('/');
        }
        let root_url = Url::parse(&root)
            .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", root, e)))?;
        if root_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!(
                "The url \"{}\" cannot be used as a base",
                root
            )));
        }

        let client = create_http_client(HttpClientConfig {
            retries: config.retries,
            proxy: config.proxy.clone(),
            headers: config.headers.clone(),
            api_key: config.api_key.clone(),
        })?;

        Ok(Self {
            config,
            root_url,
            client,
        })
    }

    /// Gets the root URL of the catalog API.
    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    /// Gets the number of retries per HTTP request.
    pub fn retries(&self) -> u32 {
        self.config.retries
    }

    /// Gets the largest slice written between two progress notifications.
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Gets the number of archives `fetch_all` transfers at once.
    pub fn concurrent_fetches(&self) -> usize {
        self.config.concurrent_fetches
    }

    /// Whether requests carry an API key.
    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Fetch the archive of `identifier` into `destination` and return its path.
    pub async fn fetch(
        &self,
        identifier: &str,
        destination: &Path,
        if_exists: IfExists,
    ) -> Result<PathBuf> {
        self.fetch_with_summary(identifier, destination, if_exists)
            .await
            .map(|summary| summary.path().to_path_buf())
    }

    /// Fetch the archive of `identifier` and report how the file was obtained.
    pub async fn fetch_with_summary(
        &self,
        identifier: &str,
        destination: &Path,
        if_exists: IfExists,
    ) -> Result<Summary> {
        let bars = self
            .config
            .observer
            .is_none()
            .then(|| ProgressBarObserver::new(self.config.style_options.clone(), 1));
        let observer = self.observer_or(bars.as_ref());

        let result = self
            .fetch_observed(identifier, destination, if_exists, observer)
            .await;

        if let Some(bars) = bars {
            bars.finish();
        }
        result
    }

    /// Fetch several archives concurrently.
    ///
    /// Duplicate identifiers are fetched once. One [`Summary`] is returned per
    /// distinct identifier, in completion order; failures are reported as
    /// [`Status::Fail`] instead of stopping the other transfers.
    pub async fn fetch_all<S: AsRef<str>>(
        &self,
        identifiers: &[S],
        destination: &Path,
        if_exists: IfExists,
    ) -> Vec<Summary> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = identifiers
            .iter()
            .map(AsRef::as_ref)
            .filter(|identifier| seen.insert(*identifier))
            .collect();

        let bars = self
            .config
            .observer
            .is_none()
            .then(|| ProgressBarObserver::new(self.config.style_options.clone(), unique.len()));
        let observer = self.observer_or(bars.as_ref());

        let summaries = stream::iter(unique)
            .map(|identifier| self.fetch_reported(identifier, destination, if_exists, observer))
            .buffer_unordered(self.config.concurrent_fetches)
            .collect::<Vec<_>>()
            .await;

        if let Some(bars) = bars {
            bars.finish();
        }
        summaries
    }

    /// Resolve `identifier` to its download URL and remote length.
    pub async fn resolve(&self, identifier: &str) -> Result<ArchiveReference> {
        let info = self.archive_info(identifier).await?;
        let url = self.endpoint(&["archive", identifier])?;
        Ok(ArchiveReference::new(identifier, url, info))
    }

    /// Retrieve the metadata the service holds for the archive of `identifier`.
    pub async fn archive_info(&self, identifier: &str) -> Result<ArchiveInfo> {
        validate_identifier(identifier)?;
        let url = self.endpoint(&["archive", identifier, "info"])?;

        debug!("Resolving archive {} via {}", identifier, url);
        let res = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let body = check_status(res, identifier)?.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| {
            Error::InvalidResponse(format!("archive info for {}: {}", identifier, e))
        })
    }

    /// Classify the local archive of `identifier` without transferring anything.
    pub async fn transfer_state(
        &self,
        identifier: &str,
        destination: &Path,
    ) -> Result<TransferState> {
        let reference = self.resolve(identifier).await?;
        let local = local_length(&reference.target_path(destination)).await?;
        Ok(TransferState::classify(local, reference.size))
    }

    fn observer_or<'a>(&'a self, bars: Option<&'a ProgressBarObserver>) -> &'a dyn ProgressObserver {
        match (&self.config.observer, bars) {
            (Some(observer), _) => observer.as_ref(),
            (None, Some(bars)) => bars as &dyn ProgressObserver,
            (None, None) => &NoProgress,
        }
    }

    /// Build `{root}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.root_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::InvalidUrl(format!("The url \"{}\" cannot be used as a base", self.root_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Run a fetch for `fetch_all`, turning errors into a failed summary.
    async fn fetch_reported(
        &self,
        identifier: &str,
        destination: &Path,
        if_exists: IfExists,
        observer: &dyn ProgressObserver,
    ) -> Summary {
        let summary = match self
            .fetch_observed(identifier, destination, if_exists, observer)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                let path = destination.join(archive_filename(identifier));
                let size = local_length(&path).await.ok().flatten().unwrap_or(0);
                Summary::new(identifier, path, size).fail(e)
            }
        };

        if let Some(ref callback) = self.config.on_complete {
            callback(&summary);
        }

        summary
    }

    async fn fetch_observed(
        &self,
        identifier: &str,
        destination: &Path,
        if_exists: IfExists,
        observer: &dyn ProgressObserver,
    ) -> Result<Summary> {
        let result = self
            .fetch_inner(identifier, destination, if_exists, observer)
            .await;
        observer.on_finish(identifier);
        result
    }

    async fn fetch_inner(
        &self,
        identifier: &str,
        destination: &Path,
        if_exists: IfExists,
        observer: &dyn ProgressObserver,
    ) -> Result<Summary> {
        let reference = self.resolve(identifier).await?;

        debug!("Creating destination directory {:?}", destination);
        fs::create_dir_all(destination)
            .await
            .map_err(|e| Error::storage(destination, e))?;

        let path = reference.target_path(destination);
        let local = local_length(&path).await?;

        let offset = match (local, if_exists) {
            (None, _) => 0,
            (Some(len), IfExists::Skip) => {
                debug!("{:?} already exists, skipping", path);
                return Ok(Summary::new(identifier, path, len).with_status(Status::Skipped));
            }
            (Some(_), IfExists::Overwrite) => {
                debug!("Overwriting {:?}", path);
                0
            }
            (Some(len), IfExists::Resume) => match TransferState::classify(Some(len), reference.size) {
                TransferState::Complete => {
                    debug!("{:?} is already complete", path);
                    return Ok(
                        Summary::new(identifier, path, len).with_status(Status::AlreadyComplete)
                    );
                }
                TransferState::Oversized { local } => {
                    warn!(
                        "{:?} has {} bytes but the archive has {}, downloading it again",
                        path, local, reference.size
                    );
                    0
                }
                state => state.resume_offset(),
            },
        };

        let offset = self.transfer(&reference, &path, offset, observer).await?;
        let status = match offset {
            0 => Status::Fetched,
            _ => Status::Resumed,
        };

        Ok(Summary::new(identifier, path, reference.size).with_status(status))
    }

    /// Stream the archive into `path` starting at `offset`.
    ///
    /// Returns the offset the transfer actually started from, which is 0 when
    /// the server ignored the range request.
    async fn transfer(
        &self,
        reference: &ArchiveReference,
        path: &Path,
        offset: u64,
        observer: &dyn ProgressObserver,
    ) -> Result<u64> {
        debug!("Fetching {} from byte {}", reference.url, offset);
        let mut req = self.client.get(reference.url.clone());
        if offset > 0 {
            req = req.header(RANGE, format!("bytes={}-", offset));
        }

        let res = check_status(req.send().await?, &reference.identifier)?;

        let offset = match (offset, res.status()) {
            (0, _) => 0,
            (offset, StatusCode::PARTIAL_CONTENT) => match content_range_start(&res) {
                Some(start) if start == offset => match content_range_total(&res) {
                    Some(total) if total != reference.size => {
                        return Err(Error::InvalidResponse(format!(
                            "partial response for {} announces {} bytes but the archive has {}",
                            reference.identifier, total, reference.size
                        )))
                    }
                    _ => offset,
                },
                Some(start) => {
                    return Err(Error::InvalidResponse(format!(
                        "requested {} from byte {} but the server sent bytes from {}",
                        reference.identifier, offset, start
                    )))
                }
                None => {
                    return Err(Error::InvalidResponse(format!(
                        "partial response for {} without a Content-Range header",
                        reference.identifier
                    )))
                }
            },
            (_, status) => {
                warn!(
                    "Range request for {} answered with {}, downloading from byte 0",
                    reference.identifier, status
                );
                0
            }
        };

        debug!("Opening destination file {:?}", path);
        let opened = if offset > 0 {
            OpenOptions::new().append(true).open(path).await
        } else {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await
        };
        let mut file = opened.map_err(|e| Error::storage(path, e))?;

        let total = reference.size;
        let mut transferred = offset;
        observer.on_start(&Progress {
            identifier: &reference.identifier,
            transferred,
            total,
        });

        debug!("Retrieving chunks...");
        let mut stream = res.bytes_stream();
        while let Some(item) = stream.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    // Keep what was received so far for the next resume.
                    if let Err(flush) = file.flush().await {
                        warn!("Failed to flush partial file {:?}: {}", path, flush);
                    }
                    return Err(e.into());
                }
            };

            for piece in chunk.chunks(self.config.chunk_size) {
                file.write_all(piece)
                    .await
                    .map_err(|e| Error::storage(path, e))?;
                transferred += piece.len() as u64;
                observer.on_chunk(&Progress {
                    identifier: &reference.identifier,
                    transferred,
                    total,
                });
            }
        }

        file.flush().await.map_err(|e| Error::storage(path, e))?;
        file.sync_all().await.map_err(|e| Error::storage(path, e))?;
        drop(file);

        let actual = local_length(path).await?.unwrap_or(0);
        if actual != total {
            return Err(Error::IncompleteTransfer {
                path: path.to_path_buf(),
                expected: total,
                actual,
            });
        }

        debug!("Fetched {} ({} bytes)", reference.identifier, actual);
        Ok(offset)
    }
}

/// Map the statuses the catalog uses for unknown archives and rejected keys.
fn check_status(res: Response, identifier: &str) -> Result<Response> {
    match res.status() {
        StatusCode::NOT_FOUND => Err(Error::ResourceNotFound {
            identifier: identifier.to_string(),
        }),
        status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => Err(Error::Unauthorized {
            identifier: identifier.to_string(),
            status: status.as_u16(),
        }),
        _ => Ok(res.error_for_status()?),
    }
}
