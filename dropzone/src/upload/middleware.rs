use super::{FormField, StoredFile, UploadedFiles, Uploader};
use crate::errors::{Error, Result};
use crate::storage::{FileDescriptor, FileSink, RequestContext, remove_stored_file};
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, trace};

/// Store the files of a multipart request, then run the rest of the stack.
pub async fn upload_middleware(State(uploader): State<Uploader>, request: Request, next: Next) -> Result<Response> {
    let request = store_multipart(&uploader, request).await?;
    Ok(next.run(request).await)
}

/// Implementation for [`upload_middleware`].
///
/// Non-multipart requests are returned unchanged. For multipart requests the body is consumed:
/// the returned request has an empty body and carries an [`UploadedFiles`] extension. If anything
/// fails part-way, files already written for this request are removed before the error is
/// returned.
pub async fn store_multipart(uploader: &Uploader, request: Request) -> Result<Request> {
    let Some(boundary) = multipart_boundary(&request)? else {
        trace!("Not a multipart request, passing through");
        return Ok(request);
    };

    let (mut parts, body) = request.into_parts();
    let ctx = RequestContext::from_parts(&parts);
    let mut multipart = multer::Multipart::new(body.into_data_stream(), boundary);
    let mut uploaded = UploadedFiles::default();

    if let Err(e) = read_parts(uploader, &ctx, &mut multipart, &mut uploaded).await {
        for file in &uploaded.files {
            remove_stored_file(&file.path).await;
        }
        return Err(e);
    }

    debug!(
        files = uploaded.files.len(),
        fields = uploaded.fields.len(),
        "Completed multipart processing"
    );

    parts.headers.remove(CONTENT_LENGTH);
    parts.extensions.insert(uploaded);
    Ok(Request::from_parts(parts, Body::empty()))
}

/// Boundary of a `multipart/form-data` request, `None` for any other content type
fn multipart_boundary(request: &Request) -> Result<Option<String>> {
    let Some(content_type) = request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()) else {
        return Ok(None);
    };

    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case("multipart/form-data") {
        return Ok(None);
    }

    multer::parse_boundary(content_type).map(Some).map_err(|e| Error::BadRequest {
        message: format!("Invalid multipart content type: {}", e),
    })
}

fn malformed(e: multer::Error) -> Error {
    Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", e),
    }
}

async fn read_parts(
    uploader: &Uploader,
    ctx: &RequestContext,
    multipart: &mut multer::Multipart<'static>,
    uploaded: &mut UploadedFiles,
) -> Result<()> {
    let mut admission = uploader.selector().admission();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let field_name = field.name().unwrap_or_default().to_string();

        // Parts without a filename are plain form fields
        let Some(original_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(malformed)?;
            trace!(field = %field_name, "Received text field");
            uploaded.fields.push(FormField { name: field_name, value });
            continue;
        };

        admission.admit(&field_name)?;

        let file = FileDescriptor {
            field_name,
            original_name,
            content_type: field.content_type().map(|mime| mime.to_string()),
        };

        let stored = store_file(uploader, ctx, file, field).await?;
        uploaded.files.push(stored);
    }

    Ok(())
}

async fn store_file(
    uploader: &Uploader,
    ctx: &RequestContext,
    file: FileDescriptor,
    mut field: multer::Field<'static>,
) -> Result<StoredFile> {
    let target = uploader.resolver().resolve(ctx, &file)?;
    let path = target.path();

    debug!(
        field = %file.field_name,
        original_name = %file.original_name,
        path = ?path,
        "Starting file upload stream"
    );

    let sink = FileSink::create(&target).await?;
    let size = match copy_field(&mut field, sink).await {
        Ok(size) => size,
        Err(e) => {
            remove_stored_file(&path).await;
            return Err(e);
        }
    };

    info!(
        field = %file.field_name,
        original_name = %file.original_name,
        filename = %target.filename,
        size,
        "Stored uploaded file"
    );

    Ok(StoredFile {
        field_name: file.field_name,
        original_name: file.original_name,
        content_type: file.content_type,
        destination: target.directory,
        filename: target.filename,
        path,
        size,
    })
}

async fn copy_field(field: &mut multer::Field<'static>, mut sink: FileSink) -> Result<u64> {
    let mut chunk_number = 0u64;

    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        chunk_number += 1;
        trace!(path = ?sink.path(), chunk_number, chunk_size = chunk.len(), "Writing chunk");
        sink.write(&chunk).await?;
    }

    Ok(sink.finish().await?)
}
