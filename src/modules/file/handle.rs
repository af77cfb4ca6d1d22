use actix_multipart::Multipart;
use actix_web::{
    HttpRequest, HttpResponse,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use futures_util::TryStreamExt;

use crate::api::{error, success::Success};
use crate::middlewares::get_extensions;
use crate::modules::file::{
    model::{AddTagsModel, Requester},
    repository::FileRepository,
    schema::{FileBodyResponse, FileEntity, FileResponse, FileStatsResponse},
    service::FileService,
    storage::BlobStorage,
};
use crate::utils::{Claims, ValidatedJson};

fn requester(req: &HttpRequest) -> Result<Requester, error::Error> {
    let claims = get_extensions::<Claims>(req)?;
    Ok(Requester::from(&claims))
}

fn multipart_error(e: actix_multipart::MultipartError) -> error::Error {
    log::debug!("Rejected multipart payload: {}", e);
    error::Error::bad_request("Invalid multipart payload")
}

fn content_response(file: &FileEntity, bytes: Vec<u8>) -> HttpResponse {
    let mime = mime_guess::from_path(&file.original_name).first_or_octet_stream();
    HttpResponse::Ok()
        .content_type(mime.to_string())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(file.original_name.clone())],
        })
        .body(bytes)
}

/// Upload file handler. The first part carrying a filename is stored; plain
/// form fields are skipped.
pub async fn upload_file<R, S>(
    mut payload: Multipart,
    req: HttpRequest,
    service: web::Data<FileService<R, S>>,
) -> Result<Success<FileBodyResponse>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
    S: BlobStorage + Send + Sync + 'static,
{
    let owner_id = get_extensions::<Claims>(&req)?.sub;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let Some(original_name) = original_name else {
            while field.try_next().await.map_err(multipart_error)?.is_some() {}
            continue;
        };
        let field_name = field.name().unwrap_or("file").to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            bytes.extend_from_slice(&chunk);
        }

        let base_url = {
            let info = req.connection_info();
            format!("{}://{}", info.scheme(), info.host())
        };

        let file = service
            .upload_file(owner_id, &field_name, original_name, &bytes, &base_url)
            .await?;

        return Ok(Success::ok(Some(FileBodyResponse { file: file.into() }))
            .message("File uploaded successfully"));
    }

    Err(error::Error::bad_request("No file uploaded"))
}

/// Serves the stored content and counts one view. Used by both the direct
/// and the share link.
pub async fn view_file<R, S>(
    filename: web::Path<String>,
    service: web::Data<FileService<R, S>>,
) -> Result<HttpResponse, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
    S: BlobStorage + Send + Sync + 'static,
{
    let (file, bytes) = service.record_access(&filename).await?;
    Ok(content_response(&file, bytes))
}

pub async fn get_stats<R, S>(
    filename: web::Path<String>,
    service: web::Data<FileService<R, S>>,
) -> Result<Success<FileStatsResponse>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
    S: BlobStorage + Send + Sync + 'static,
{
    let file = service.get_stats(&filename).await?;
    Ok(Success::ok(Some(FileStatsResponse::from(file))))
}

pub async fn add_tags<R, S>(
    body: ValidatedJson<AddTagsModel>,
    req: HttpRequest,
    service: web::Data<FileService<R, S>>,
) -> Result<Success<FileBodyResponse>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
    S: BlobStorage + Send + Sync + 'static,
{
    let requester = requester(&req)?;
    let body = body.0;

    // Unknown filenames are reported as bad input on this route.
    let file = service.set_tags(&requester, &body.filename, &body.tags).await.map_err(|e| match e {
        error::SystemError::NotFound(msg) => error::Error::BadRequest(msg),
        e => error::Error::from(e),
    })?;

    Ok(Success::ok(Some(FileBodyResponse { file: file.into() }))
        .message("Tags added successfully"))
}

pub async fn list_files<R, S>(
    req: HttpRequest,
    service: web::Data<FileService<R, S>>,
) -> Result<Success<Vec<FileResponse>>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
    S: BlobStorage + Send + Sync + 'static,
{
    let requester = requester(&req)?;
    let files = service.list_files(&requester).await?;
    Ok(Success::ok(Some(files.into_iter().map(FileResponse::from).collect())))
}

pub async fn delete_file<R, S>(
    filename: web::Path<String>,
    req: HttpRequest,
    service: web::Data<FileService<R, S>>,
) -> Result<Success<()>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
    S: BlobStorage + Send + Sync + 'static,
{
    let requester = requester(&req)?;
    service.delete_file(&requester, &filename).await?;
    Ok(Success::ok(None).message("File deleted successfully"))
}
