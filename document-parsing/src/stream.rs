use common::error::AppError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// Reads the whole stream into memory, giving up as soon as `cancel` fires.
pub async fn read_stream(
    reader: &mut (dyn AsyncRead + Send + Unpin),
    cancel: &CancellationToken,
) -> Result<Vec<u8>, AppError> {
    let read = async {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        Ok::<_, std::io::Error>(buffer)
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(AppError::Cancelled),
        result = read => Ok(result?),
    }
}

/// Runs a synchronous extractor on the blocking pool.
///
/// The extractor itself cannot be interrupted; cancellation only stops us
/// waiting on it. A panic inside the extractor is reported as an extraction
/// failure for `file_type`.
pub(crate) async fn extract_blocking<F>(
    file_type: &'static str,
    cancel: &CancellationToken,
    extract: F,
) -> Result<String, AppError>
where
    F: FnOnce() -> Result<String, String> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(extract);

    let joined = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(AppError::Cancelled),
        joined = task => joined,
    };

    joined
        .map_err(|err| format!("extraction task failed: {err}"))
        .and_then(|result| result)
        .map_err(|message| AppError::Extraction {
            file_type: file_type.to_string(),
            message,
        })
}
