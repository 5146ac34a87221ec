use utoipa::OpenApi;

use crate::routes;
use crate::schema::{
    CommentRequest, CutRequest, DivideRequest, DivideResponse, DownloadRequest, DownloadResponse,
    EditResponse, ExportRequest, FormatInfo, UploadResponse, VideoInfo,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::get_health,
        routes::formats::get_formats,
        routes::download::post_download,
        routes::file::get_file,
        routes::edit::post_cut,
        routes::edit::post_divide,
        routes::edit::post_comment,
        routes::edit::post_export,
        routes::upload::post_upload,
    ),
    components(schemas(
        DownloadRequest,
        DownloadResponse,
        FormatInfo,
        VideoInfo,
        CutRequest,
        DivideRequest,
        CommentRequest,
        ExportRequest,
        EditResponse,
        DivideResponse,
        UploadResponse,
    )),
    tags((name = "vidl"))
)]
pub struct ApiDoc;
