//! Conversion job resource.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::instrument;

use crate::client::RequestExecutor;
use crate::errors::{DocCloudError, DocCloudResult};
use crate::resources::ApiObject;
use crate::transport::ByteStream;
use crate::types::{ConvertState, OutputFile, RemoteFile, RequestContent};

/// Characters escaped in file names appended to a download URL (RFC 3986
/// unreserved characters pass through).
const FILE_NAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One conversion job.
///
/// Created by [`ConvertService::create`](crate::services::ConvertService::create).
/// Call [`refresh`](Convert::refresh) or [`wait`](Convert::wait) to fetch the
/// job status; downloads need the `output` the service reports once the job
/// has completed.
///
/// # Example
///
/// ```rust,no_run
/// use integrations_doccloud::{DocCloudClient, RequestContent};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = DocCloudClient::from_access_token("dc_your_token")?;
///
///     let mut job = client
///         .create_convert(RequestContent::files(["report.docx"]))
///         .await?;
///     job.wait(Duration::from_secs(1), 60).await?;
///     let path = job.download(None, None).await?;
///     println!("Saved {}", path.display());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Convert {
    object: ApiObject,
    deleted: bool,
}

impl Convert {
    /// Wraps the creation result of a conversion job.
    pub fn new(executor: Arc<RequestExecutor>, result: Value) -> DocCloudResult<Self> {
        Ok(Self {
            object: ApiObject::new(executor, result)?,
            deleted: false,
        })
    }

    /// The creation result.
    pub fn result(&self) -> &Value {
        self.object.result()
    }

    /// The job data fetched by the last refresh.
    pub fn data(&self) -> &Map<String, Value> {
        self.object.data()
    }

    /// Returns a top-level attribute of the job data.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.object.get(name)
    }

    /// Follows a dotted path through the job data.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        self.object.lookup(path)
    }

    /// URL of the job itself.
    ///
    /// Unlike the other attributes this falls back to the creation result, so
    /// a job can be deleted without a prior refresh.
    pub fn url(&self) -> Option<&str> {
        self.object
            .get_str("url")
            .or_else(|| self.result().get("url").and_then(Value::as_str))
    }

    /// The `output` section of the job data, absent until a refresh reports
    /// the job as completed.
    pub fn output(&self) -> Option<&Value> {
        self.object.get("output").filter(|output| !output.is_null())
    }

    /// Base download URL of the output.
    pub fn output_url(&self) -> Option<&str> {
        self.output()?.get("url").and_then(Value::as_str)
    }

    /// Output files reported for the job.
    ///
    /// Read from `output.files` when present, else the `output` descriptor
    /// itself, else the `files` list of the creation result. The last source
    /// only names the files; downloading still needs the output URL.
    pub fn output_files(&self) -> Vec<OutputFile> {
        if let Some(output) = self.output() {
            return match output.get("files") {
                Some(Value::Array(files)) => {
                    files.iter().filter_map(OutputFile::from_value).collect()
                }
                _ => OutputFile::from_value(output).into_iter().collect(),
            };
        }

        match self.result().get("files") {
            Some(Value::Array(files)) => files.iter().filter_map(OutputFile::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// Lifecycle state of the job.
    pub fn state(&self) -> ConvertState {
        if self.deleted {
            ConvertState::Deleted
        } else if self.output().is_some() {
            ConvertState::Completed
        } else if self.data().is_empty() {
            ConvertState::Created
        } else {
            ConvertState::Processing
        }
    }

    /// Re-fetches the job and replaces its data.
    pub async fn refresh(&mut self, parameters: Option<Map<String, Value>>) -> DocCloudResult<()> {
        self.object.refresh(parameters).await
    }

    /// Polls the job every `interval` until its output is available.
    ///
    /// Fails with [`DocCloudError::InvalidParameter`] when the job is still
    /// processing after `max_attempts` refreshes. Request errors end the
    /// polling immediately.
    #[instrument(skip(self), fields(url = ?self.url()))]
    pub async fn wait(&mut self, interval: Duration, max_attempts: u32) -> DocCloudResult<()> {
        for attempt in 1..=max_attempts {
            if self.state() == ConvertState::Completed {
                return Ok(());
            }
            if attempt > 1 {
                tokio::time::sleep(interval).await;
            }
            self.refresh(None).await?;
            tracing::debug!(attempt, state = ?self.state(), "Polled conversion");
        }

        if self.state() == ConvertState::Completed {
            return Ok(());
        }

        Err(DocCloudError::invalid_parameter(format!(
            "Conversion not completed after {} attempts",
            max_attempts
        )))
    }

    /// Downloads one output file to disk and returns the written path.
    ///
    /// Destination resolution:
    /// 1. `localfile` is an existing directory and the job has exactly one
    ///    output: the directory joined with the remote file name, else the
    ///    output's filename, else the directory's own name.
    /// 2. `localfile` is `None` and the job has exactly one named output: the
    ///    remote file name, else that filename, relative to the current
    ///    directory.
    /// 3. Otherwise `localfile` is used as is; a missing or directory target is
    ///    an [`DocCloudError::InvalidParameter`].
    ///
    /// Names reported by the service are reduced to their last path component;
    /// absolute names and names containing `..` are rejected.
    ///
    /// Without `remotefile`, a single-output job downloads that output.
    /// [`RemoteFile::Inline`] content is decoded and written directly. The
    /// target file is only created once the service has answered.
    #[instrument(skip(self, localfile, remotefile))]
    pub async fn download(
        &self,
        localfile: Option<&Path>,
        remotefile: Option<RemoteFile>,
    ) -> DocCloudResult<PathBuf> {
        let outputs = self.output_files();
        let single = match outputs.as_slice() {
            [output] => Some(output),
            _ => None,
        };

        let mut target = localfile.map(Path::to_path_buf);
        let local_is_dir = match localfile {
            Some(path) => is_dir(path).await,
            None => false,
        };

        match (localfile, single) {
            (Some(dir), Some(output)) if local_is_dir => {
                let dir = tokio::fs::canonicalize(dir)
                    .await
                    .unwrap_or_else(|_| dir.to_path_buf());
                let name = remotefile
                    .as_ref()
                    .and_then(RemoteFile::file_name)
                    .or(output.filename.as_deref());
                let name = match name {
                    Some(name) => local_file_name(name)?,
                    None => match dir.file_name() {
                        Some(name) => PathBuf::from(name),
                        None => return Err(unresolved_target()),
                    },
                };
                target = Some(dir.join(name));
            }
            (None, Some(OutputFile {
                filename: Some(filename),
                ..
            })) => {
                let name = remotefile
                    .as_ref()
                    .and_then(RemoteFile::file_name)
                    .unwrap_or(filename.as_str());
                target = Some(local_file_name(name)?);
            }
            _ => {}
        }

        let target = match target {
            Some(path) => path,
            None => return Err(unresolved_target()),
        };
        if is_dir(&target).await {
            return Err(unresolved_target());
        }

        let remotefile = remotefile.or_else(|| single.cloned().map(RemoteFile::Output));

        if let Some(RemoteFile::Inline(encoded)) = &remotefile {
            let content = STANDARD.decode(encoded.trim()).map_err(|e| {
                DocCloudError::invalid_parameter(format!("Inline file content is not base64: {}", e))
            })?;
            tokio::fs::write(&target, content).await.map_err(|e| {
                DocCloudError::invalid_parameter(format!(
                    "put contents of remotefile into localfile failed: {}",
                    e
                ))
            })?;
            tracing::debug!(path = %target.display(), "Wrote inline file");
            return Ok(target);
        }

        let source = match &remotefile {
            Some(RemoteFile::Output(output)) => self.output_source(output)?,
            Some(RemoteFile::Named(name)) => self.stream_source(Some(name))?,
            _ => self.stream_source(None)?,
        };
        let stream = self.open_stream(&source).await?;

        let mut file = tokio::fs::File::create(&target).await.map_err(|e| {
            DocCloudError::invalid_parameter(format!(
                "Cannot open {} for writing: {}",
                target.display(),
                e
            ))
        })?;

        let written = match copy_stream(stream, &mut file).await {
            Ok(written) => written,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(&target).await;
                return Err(e);
            }
        };

        tracing::debug!(path = %target.display(), bytes = written, "Downloaded file");
        Ok(target)
    }

    /// Streams one output file into `writer` and returns the bytes written.
    ///
    /// The file is fetched from the output URL, with `/<remotefile>` appended
    /// (percent-encoded) when given. Fails with status 400 while the job has
    /// no output.
    #[instrument(skip(self, writer))]
    pub async fn download_stream<W>(
        &self,
        writer: &mut W,
        remotefile: Option<&str>,
    ) -> DocCloudResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let source = self.stream_source(remotefile)?;
        let stream = self.open_stream(&source).await?;
        copy_stream(stream, writer).await
    }

    /// Downloads every output file into `directory` and returns the written
    /// paths.
    ///
    /// With an `output.files` list each file lands at
    /// `directory/<its filename>`; otherwise this is a single
    /// [`download`](Convert::download).
    #[instrument(skip(self))]
    pub async fn download_all(&self, directory: Option<&Path>) -> DocCloudResult<Vec<PathBuf>> {
        let listed = self
            .output()
            .map(|output| matches!(output.get("files"), Some(Value::Array(_))))
            .unwrap_or(false);

        if !listed {
            return Ok(vec![self.download(directory, None).await?]);
        }

        let mut paths = Vec::new();
        for file in self.output_files() {
            let name = match file.filename.as_deref() {
                Some(filename) => local_file_name(filename)?,
                None => return Err(DocCloudError::invalid_parameter("Output file has no filename")),
            };
            let target = match directory {
                Some(directory) => directory.join(name),
                None => name,
            };
            paths.push(self.download(Some(&target), Some(RemoteFile::Output(file))).await?);
        }

        Ok(paths)
    }

    /// Deletes the job on the service.
    #[instrument(skip(self))]
    pub async fn delete(&mut self) -> DocCloudResult<()> {
        let url = self
            .url()
            .map(str::to_owned)
            .ok_or_else(|| DocCloudError::invalid_parameter("Conversion has no url"))?;

        self.object
            .executor()
            .delete(&url, RequestContent::Empty, false)
            .await?;

        self.deleted = true;
        Ok(())
    }

    fn require_output_url(&self) -> DocCloudResult<&str> {
        self.output_url()
            .ok_or_else(|| DocCloudError::api(400, "There is no output file available (yet)"))
    }

    /// Output URL, with `/<remotefile>` appended when given.
    fn stream_source(&self, remotefile: Option<&str>) -> DocCloudResult<String> {
        let output_url = self.require_output_url()?;
        Ok(match remotefile {
            Some(name) => format!(
                "{}/{}",
                output_url,
                utf8_percent_encode(name, FILE_NAME_ESCAPE)
            ),
            None => output_url.to_string(),
        })
    }

    fn output_source(&self, output: &OutputFile) -> DocCloudResult<String> {
        self.require_output_url()?;
        match &output.url {
            Some(url) => Ok(url.clone()),
            None => self.stream_source(output.filename.as_deref()),
        }
    }

    async fn open_stream(&self, path: &str) -> DocCloudResult<ByteStream> {
        self.object
            .executor()
            .get(path, RequestContent::Empty, false)
            .await?
            .into_stream()
    }
}

async fn copy_stream<W>(mut stream: ByteStream, writer: &mut W) -> DocCloudResult<u64>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;

    Ok(written)
}

/// Reduces a service-reported file name to a single path component.
fn local_file_name(name: &str) -> DocCloudResult<PathBuf> {
    let path = Path::new(name);
    let escapes = path.has_root()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(DocCloudError::invalid_parameter(format!(
            "Unsafe output file name: {}",
            name
        )));
    }

    path.file_name()
        .map(PathBuf::from)
        .ok_or_else(|| DocCloudError::invalid_parameter("Output file name is empty"))
}

fn unresolved_target() -> DocCloudError {
    DocCloudError::invalid_parameter("localfile parameter is not set correctly")
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
