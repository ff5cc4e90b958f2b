//! Client side of media uploads: pre-flight checks, streamed transfer with
//! progress, and the preview/error state shown next to the picker.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use jonco_common::upload_policy::{self, PreflightError};
use jonco_common::MediaType;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Size of the chunks the request body is streamed in. Progress is reported
/// once per chunk.
const CHUNK_SIZE: usize = 64 * 1024;

/// A file chosen by the user, read into memory.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// What the widget renders: current preview, inline error, progress bar.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploaderState {
    pub preview: Option<String>,
    pub error: Option<String>,
    pub uploading: bool,
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please select an image or video file")]
    PickerType,
    #[error("Please upload an image or video file")]
    DropType,
    #[error("File size must be less than 50MB")]
    TooLarge,
    #[error("Upload failed")]
    Failed,
    /// The server answered but refused the file.
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Raw HTTP answer of the upload endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Called with a whole percentage every time the transport makes progress.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Called with the stored URL after an upload, or `""` after a removal.
pub type OnUpload = Arc<dyn Fn(String) + Send + Sync>;

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Send `file` to the upload endpoint as a multipart form with `folder`.
    async fn send(
        &self,
        file: SelectedFile,
        folder: &str,
        on_progress: ProgressFn,
    ) -> Result<TransportResponse, TransportError>;
}

/// Multipart upload over HTTP with a streamed file part.
pub struct HttpUploadTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploadTransport {
    /// `endpoint` is the full URL of `POST /api/upload`.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn send(
        &self,
        file: SelectedFile,
        folder: &str,
        on_progress: ProgressFn,
    ) -> Result<TransportResponse, TransportError> {
        let total = file.size();
        let chunks: Vec<Vec<u8>> = file.data.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();

        let mut sent = 0u64;
        let body = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            on_progress(upload_policy::progress_percent(sent, total));
            Ok::<_, std::io::Error>(chunk)
        });

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(body),
            total,
        )
        .file_name(file.name)
        .mime_str(&file.content_type)?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        let resp = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(TransportResponse { status, body })
    }
}

#[derive(Deserialize)]
struct UploadReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// State machine behind one upload widget.
///
/// Each widget targets a single folder. The caller learns about new URLs only
/// through `on_upload`; everything else is local state.
pub struct Uploader {
    folder: String,
    transport: Arc<dyn UploadTransport>,
    on_upload: OnUpload,
    state: Arc<watch::Sender<UploaderState>>,
}

impl Uploader {
    /// `current` is the URL already stored for this slot, shown as preview.
    pub fn new(
        folder: impl Into<String>,
        transport: Arc<dyn UploadTransport>,
        current: Option<String>,
        on_upload: OnUpload,
    ) -> Self {
        let initial = UploaderState {
            preview: current.filter(|url| !url.is_empty()),
            ..UploaderState::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            folder: folder.into(),
            transport,
            on_upload,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploaderState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> UploaderState {
        self.state.borrow().clone()
    }

    /// Upload the file chosen in the file picker.
    pub async fn select_file(&self, file: SelectedFile) -> Result<String, UploadError> {
        self.check_and_upload(file, UploadError::PickerType).await
    }

    /// Upload the first dropped file with an allowed type.
    pub async fn drop_files(&self, files: Vec<SelectedFile>) -> Result<String, UploadError> {
        let Some(file) = files
            .into_iter()
            .find(|f| MediaType::from_mime(&f.content_type).is_some())
        else {
            return Err(self.fail(UploadError::DropType));
        };
        self.check_and_upload(file, UploadError::DropType).await
    }

    /// Clear the preview and tell the caller the slot is now empty.
    pub fn remove(&self) {
        self.state.send_modify(|s| {
            s.preview = None;
            s.error = None;
        });
        (self.on_upload)(String::new());
    }

    async fn check_and_upload(
        &self,
        file: SelectedFile,
        type_error: UploadError,
    ) -> Result<String, UploadError> {
        if let Err(e) = upload_policy::preflight(&file.content_type, file.size()) {
            debug!("Rejected {} before upload: {e}", file.name);
            return Err(self.fail(match e {
                PreflightError::UnsupportedType(_) => type_error,
                PreflightError::TooLarge { .. } => UploadError::TooLarge,
            }));
        }

        self.state.send_modify(|s| {
            s.error = None;
            s.uploading = true;
            s.progress = 0;
        });

        let progress_state = self.state.clone();
        let on_progress: ProgressFn = Arc::new(move |percent| {
            progress_state.send_if_modified(|s| {
                let changed = s.progress != percent;
                s.progress = percent;
                changed
            });
        });

        let result = self.transport.send(file, &self.folder, on_progress).await;
        self.state.send_modify(|s| s.uploading = false);

        let outcome = match result {
            Ok(resp) => Self::interpret(resp),
            Err(e) => {
                warn!("Upload to {} failed: {e}", self.folder);
                Err(UploadError::Failed)
            }
        };

        match outcome {
            Ok(url) => {
                self.state.send_modify(|s| {
                    s.preview = Some(url.clone());
                    s.progress = 100;
                });
                (self.on_upload)(url.clone());
                Ok(url)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Turn the endpoint's answer into the stored URL or a user-facing error.
    fn interpret(resp: TransportResponse) -> Result<String, UploadError> {
        if !resp.is_success() {
            warn!("Upload endpoint answered {}", resp.status);
            return Err(UploadError::Failed);
        }
        let reply: UploadReply = serde_json::from_slice(&resp.body).map_err(|e| {
            warn!("Unreadable upload response: {e}");
            UploadError::Failed
        })?;
        match (reply.success, reply.url) {
            (true, Some(url)) => Ok(url),
            _ => Err(reply
                .error
                .map(UploadError::Rejected)
                .unwrap_or(UploadError::Failed)),
        }
    }

    fn fail(&self, error: UploadError) -> UploadError {
        let message = error.to_string();
        self.state.send_modify(|s| s.error = Some(message));
        error
    }
}
