use crate::{
    auth::auth::AuthUser,
    model::{attendance::Attendance, status::AttendanceStatus},
    photo::{PhotoError, PhotoPipeline, PhotoUploadRequest},
    utils::db_utils::{DateRangeQuery, FilterValue, bind_filters, internal_error, is_duplicate_key},
};
use actix_multipart::Multipart;
use actix_web::{
    HttpResponse, Responder,
    error::ErrorBadRequest,
    http::header::{CONTENT_DISPOSITION, ContentDisposition, DispositionParam, DispositionType},
    web,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct AttendanceRequest {
    #[schema(example = "EMP-001")]
    pub emp_id: String,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "Warehouse Clerk")]
    pub role: String,
    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub attendance_date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub time_in: NaiveTime,
    #[schema(example = "17:30:00", value_type = String)]
    pub time_out: NaiveTime,
    #[serde(default = "default_status")]
    pub status: AttendanceStatus,
}

fn default_status() -> AttendanceStatus {
    AttendanceStatus::Present
}

impl AttendanceRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if self.emp_id.trim().is_empty() || self.emp_id.len() > 50 {
            return Err("emp_id must be 1-50 characters");
        }
        if self.first_name.trim().is_empty() || self.first_name.len() > 50 {
            return Err("first_name must be 1-50 characters");
        }
        if self.last_name.trim().is_empty() || self.last_name.len() > 50 {
            return Err("last_name must be 1-50 characters");
        }
        if self.role.trim().is_empty() || self.role.len() > 50 {
            return Err("role must be 1-50 characters");
        }
        Ok(())
    }
}

/// Attendance as returned by the API. The photo fields appear only once a
/// photo has been uploaded.
#[derive(Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: u64,
    pub emp_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[schema(value_type = String, format = "date")]
    pub attendance_date: NaiveDate,
    #[schema(value_type = String)]
    pub time_in: NaiveTime,
    #[schema(value_type = String)]
    pub time_out: NaiveTime,
    #[schema(example = "PRESENT")]
    pub status: String,
    /// Stamped JPEG, standard base64
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub photo_timestamp: Option<NaiveDateTime>,
}

impl From<Attendance> for AttendanceResponse {
    fn from(a: Attendance) -> Self {
        // blob and timestamp are written together; show neither unless both exist
        let (photo_base64, photo_timestamp) = match (a.photo_data, a.photo_timestamp) {
            (Some(data), Some(ts)) => (Some(STANDARD.encode(data)), Some(ts)),
            _ => (None, None),
        };

        Self {
            id: a.id,
            emp_id: a.emp_id,
            first_name: a.first_name,
            last_name: a.last_name,
            role: a.role,
            attendance_date: a.attendance_date,
            time_in: a.time_in,
            time_out: a.time_out,
            status: a.status,
            photo_base64,
            photo_timestamp,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceStatusQuery {
    pub status: AttendanceStatus,
}

/// Multipart body of the photo upload.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct PhotoUpload {
    #[schema(value_type = String, format = Binary)]
    photo: Vec<u8>,
}

const SELECT_ATTENDANCE: &str = r#"
    SELECT id, emp_id, first_name, last_name, role, attendance_date,
           time_in, time_out, status, photo_data, photo_timestamp
    FROM attendance
"#;

async fn find_attendance(
    pool: &MySqlPool,
    filter: &str,
    args: &[FilterValue],
) -> Result<Vec<AttendanceResponse>, sqlx::Error> {
    let sql = format!("{SELECT_ATTENDANCE} {filter} ORDER BY attendance_date, id");
    let rows = bind_filters(sqlx::query_as::<_, Attendance>(&sql), args)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(AttendanceResponse::from).collect())
}

async fn find_by_id(pool: &MySqlPool, id: u64) -> Result<Option<AttendanceResponse>, sqlx::Error> {
    Ok(find_attendance(pool, "WHERE id = ?", &[FilterValue::U64(id)])
        .await?
        .into_iter()
        .next())
}

async fn attendance_exists(pool: &MySqlPool, id: u64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM attendance WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await
        .map(|found| found > 0)
}

/// True when another record already covers `emp_id` on `date`.
async fn exists_for_employee_on_date(
    pool: &MySqlPool,
    emp_id: &str,
    date: NaiveDate,
    excluding: Option<u64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM attendance
            WHERE emp_id = ? AND attendance_date = ? AND (? IS NULL OR id <> ?)
        )
        "#,
    )
    .bind(emp_id)
    .bind(date)
    .bind(excluding)
    .bind(excluding)
    .fetch_one(pool)
    .await
    .map(|found| found > 0)
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Attendance record not found" }))
}

fn duplicate_day() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "message": "Error: Attendance already recorded for this employee on this date!"
    }))
}

fn one_or_404(record: Option<AttendanceResponse>) -> HttpResponse {
    match record {
        Some(r) => HttpResponse::Ok().json(r),
        None => not_found(),
    }
}

/// `<emp_id>_<uuid>.jpg`, with anything outside `[A-Za-z0-9_-]` in the
/// employee id replaced so the header value stays a plain token.
fn photo_filename(emp_id: &str) -> String {
    let emp: String = emp_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}.jpg", emp, Uuid::new_v4())
}

/// Pull the `photo` part out of the multipart body, refusing to buffer more
/// than `max_size` bytes.
async fn read_photo_field(
    mut payload: Multipart,
    max_size: u64,
) -> actix_web::Result<(Vec<u8>, Option<String>)> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some("photo") {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let content_type = field.content_type().map(|m| m.to_string());
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            let size = (bytes.len() + chunk.len()) as u64;
            if size > max_size {
                return Err(PhotoError::PhotoTooLarge {
                    size,
                    max: max_size,
                }
                .into());
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok((bytes, content_type));
    }

    Err(ErrorBadRequest("Missing multipart field `photo`"))
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses((status = 200, description = "All attendance records", body = [AttendanceResponse])),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let records = find_attendance(pool.get_ref(), "", &[])
        .await
        .map_err(|e| internal_error(e, "Failed to list attendance"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// Get attendance record by id
#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(("id" = u64, Path, description = "Attendance id")),
    responses(
        (status = 200, description = "Attendance found", body = AttendanceResponse),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let record = find_by_id(pool.get_ref(), path.into_inner())
        .await
        .map_err(|e| internal_error(e, "Failed to fetch attendance"))?;

    Ok(one_or_404(record))
}

/// Attendance history of one employee
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{emp_id}",
    params(("emp_id" = String, Path, description = "Employee id")),
    responses((status = 200, description = "Employee attendance", body = [AttendanceResponse])),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_by_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let records = find_attendance(
        pool.get_ref(),
        "WHERE emp_id = ?",
        &[FilterValue::Str(path.into_inner())],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list attendance by employee"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// Attendance records with a given status
#[utoipa::path(
    get,
    path = "/api/attendance/status/{status}",
    params(("status" = AttendanceStatus, Path, description = "Attendance status")),
    responses((status = 200, description = "Matching records", body = [AttendanceResponse])),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_by_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<AttendanceStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let records = find_attendance(
        pool.get_ref(),
        "WHERE status = ?",
        &[FilterValue::Str(path.into_inner().to_string())],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list attendance by status"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// Attendance records inside the date range (inclusive)
#[utoipa::path(
    get,
    path = "/api/attendance/date-range",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Matching records", body = [AttendanceResponse]),
        (status = 400, description = "start_date after end_date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_by_date_range(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let (start, end) = query.validate()?;
    let records = find_attendance(
        pool.get_ref(),
        "WHERE attendance_date BETWEEN ? AND ?",
        &[FilterValue::Date(start), FilterValue::Date(end)],
    )
    .await
    .map_err(|e| internal_error(e, "Failed to list attendance by date range"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// Record attendance
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 400, description = "Invalid payload or already recorded for that day"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let pool = pool.get_ref();
    let emp_id = payload.emp_id.trim();

    if exists_for_employee_on_date(pool, emp_id, payload.attendance_date, None)
        .await
        .map_err(|e| internal_error(e, "Failed to check attendance"))?
    {
        return Ok(duplicate_day());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (emp_id, first_name, last_name, role, attendance_date, time_in, time_out, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(emp_id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.role)
    .bind(payload.attendance_date)
    .bind(payload.time_in)
    .bind(payload.time_out)
    .bind(payload.status.as_ref())
    .execute(pool)
    .await;

    let id = match result {
        Ok(r) => r.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => return Ok(duplicate_day()),
        Err(e) => return Err(internal_error(e, "Failed to create attendance")),
    };

    info!(id, emp_id, date = %payload.attendance_date, "Attendance recorded");

    let record = find_by_id(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload attendance"))?;

    Ok(match record {
        Some(r) => HttpResponse::Created().json(r),
        None => not_found(),
    })
}

/// Update attendance record. The stored photo is left untouched.
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(("id" = u64, Path, description = "Attendance id")),
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "Attendance updated", body = AttendanceResponse),
        (status = 400, description = "Invalid payload or clashes with another record"),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    if let Err(msg) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let id = path.into_inner();
    let pool = pool.get_ref();
    let emp_id = payload.emp_id.trim();

    if !attendance_exists(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch attendance"))?
    {
        return Ok(not_found());
    }

    if exists_for_employee_on_date(pool, emp_id, payload.attendance_date, Some(id))
        .await
        .map_err(|e| internal_error(e, "Failed to check attendance"))?
    {
        return Ok(duplicate_day());
    }

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET emp_id = ?, first_name = ?, last_name = ?, role = ?,
            attendance_date = ?, time_in = ?, time_out = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(emp_id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.role)
    .bind(payload.attendance_date)
    .bind(payload.time_in)
    .bind(payload.time_out)
    .bind(payload.status.as_ref())
    .bind(id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(e) if is_duplicate_key(&e) => return Ok(duplicate_day()),
        Err(e) => return Err(internal_error(e, "Failed to update attendance")),
    }

    let record = find_by_id(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload attendance"))?;

    Ok(one_or_404(record))
}

/// Change the status of an attendance record
#[utoipa::path(
    patch,
    path = "/api/attendance/{id}/status",
    params(("id" = u64, Path, description = "Attendance id"), AttendanceStatusQuery),
    responses(
        (status = 200, description = "Status updated", body = AttendanceResponse),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_attendance_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<AttendanceStatusQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    let id = path.into_inner();

    sqlx::query("UPDATE attendance SET status = ? WHERE id = ?")
        .bind(query.status.as_ref())
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to update attendance status"))?;

    let record = find_by_id(pool.get_ref(), id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload attendance"))?;

    Ok(one_or_404(record))
}

/// Delete attendance record (admin only)
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id" = u64, Path, description = "Attendance id")),
    responses(
        (status = 200, description = "Attendance deleted", body = Object, example = json!({
            "message": "Attendance deleted successfully"
        })),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to delete attendance"))?;

    if result.rows_affected() == 0 {
        return Ok(not_found());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance deleted successfully"
    })))
}

/// Upload an attendance photo
///
/// The image is bounded to 1024px, stamped with the upload time in a white
/// band along the bottom and stored as JPEG. A previous photo is replaced.
#[utoipa::path(
    post,
    path = "/api/attendance/{id}/photo",
    params(("id" = u64, Path, description = "Attendance id")),
    request_body(content = PhotoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo stored", body = AttendanceResponse),
        (status = 400, description = "Empty, oversized, non-image or undecodable upload", body = Object, example = json!({
            "message": "Error: File must be an image (got text/plain)"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance not found"),
        (status = 500, description = "Photo could not be processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn upload_photo(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    pipeline: web::Data<PhotoPipeline>,
    path: web::Path<u64>,
    payload: Multipart,
) -> actix_web::Result<impl Responder> {
    auth.require_moderator_or_admin()?;

    let id = path.into_inner();
    let pipeline = *pipeline.get_ref();

    let (bytes, content_type) = read_photo_field(payload, pipeline.max_photo_size()).await?;
    let captured_at = Local::now().naive_local().trunc_subsecs(0);
    let upload = PhotoUploadRequest::new(bytes, content_type, captured_at);

    if let Err(e) = pipeline.check(&upload) {
        warn!(id, error = %e, "Rejected attendance photo");
        return Err(e.into());
    }

    let pool = pool.get_ref();

    // no decode work for a record that is not there
    if !attendance_exists(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch attendance"))?
    {
        return Ok(not_found());
    }

    let processed = match web::block(move || pipeline.process(&upload)).await? {
        Ok(p) => p,
        Err(e) if e.is_input_error() => {
            warn!(id, error = %e, "Rejected attendance photo");
            return Err(e.into());
        }
        Err(e) => {
            error!(id, error = %e, "Failed to process attendance photo");
            return Err(e.into());
        }
    };

    let result = sqlx::query("UPDATE attendance SET photo_data = ?, photo_timestamp = ? WHERE id = ?")
        .bind(&processed.bytes)
        .bind(captured_at)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| internal_error(e, "Failed to store attendance photo"))?;

    // deleted while the photo was processed
    if result.rows_affected() == 0
        && !attendance_exists(pool, id)
            .await
            .map_err(|e| internal_error(e, "Failed to fetch attendance"))?
    {
        return Ok(not_found());
    }

    info!(
        id,
        width = processed.width,
        height = processed.height,
        bytes = processed.bytes.len(),
        user = %auth.username,
        "Attendance photo stored"
    );

    let record = find_by_id(pool, id)
        .await
        .map_err(|e| internal_error(e, "Failed to reload attendance"))?;

    Ok(one_or_404(record))
}

/// Download the stored attendance photo
#[utoipa::path(
    get,
    path = "/api/attendance/{id}/photo",
    params(("id" = u64, Path, description = "Attendance id")),
    responses(
        (status = 200, description = "Stamped JPEG (image/jpeg)"),
        (status = 404, description = "Attendance or photo not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn download_photo(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_user()?;

    let id = path.into_inner();

    let row: Option<(String, Option<Vec<u8>>)> =
        sqlx::query_as("SELECT emp_id, photo_data FROM attendance WHERE id = ?")
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| internal_error(e, "Failed to fetch attendance photo"))?;

    let Some((emp_id, photo)) = row else {
        return Ok(not_found());
    };
    let Some(photo) = photo else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No photo stored for this attendance record"
        })));
    };

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(photo_filename(&emp_id))],
    };

    Ok(HttpResponse::Ok()
        .content_type("image/jpeg")
        .insert_header((CONTENT_DISPOSITION, disposition))
        .body(photo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(photo: Option<Vec<u8>>, ts: Option<NaiveDateTime>) -> Attendance {
        Attendance {
            id: 7,
            emp_id: "EMP-001".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            role: "Clerk".into(),
            attendance_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            time_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            status: "PRESENT".into(),
            photo_data: photo,
            photo_timestamp: ts,
        }
    }

    #[test]
    fn response_omits_photo_fields_without_photo() {
        let body = serde_json::to_value(AttendanceResponse::from(record(None, None))).unwrap();
        assert!(body.get("photo_base64").is_none());
        assert!(body.get("photo_timestamp").is_none());
        assert_eq!(body["status"], "PRESENT");
    }

    #[test]
    fn response_carries_base64_photo_and_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        let body =
            serde_json::to_value(AttendanceResponse::from(record(Some(vec![0xFF, 0xD8, 0xFF]), Some(ts))))
                .unwrap();
        assert_eq!(body["photo_base64"], "/9j/");
        assert_eq!(body["photo_timestamp"], "2024-01-15T14:30:05");
    }

    #[test]
    fn filename_is_employee_id_plus_uuid() {
        let name = photo_filename("EMP-001");
        assert!(name.starts_with("EMP-001_"));
        assert!(name.ends_with(".jpg"));
        // "EMP-001_" + 36-char uuid + ".jpg"
        assert_eq!(name.len(), 8 + 36 + 4);
        assert_ne!(photo_filename("EMP-001"), name);
    }

    #[test]
    fn filename_replaces_header_unsafe_characters() {
        let name = photo_filename("a\"b/c d");
        assert!(name.starts_with("a_b_c_d_"));
    }

    #[test]
    fn status_defaults_to_present() {
        let req: AttendanceRequest = serde_json::from_value(json!({
            "emp_id": "EMP-1",
            "first_name": "Jane",
            "last_name": "Doe",
            "role": "Clerk",
            "attendance_date": "2024-01-15",
            "time_in": "09:00:00",
            "time_out": "17:00:00"
        }))
        .unwrap();
        assert_eq!(req.status, AttendanceStatus::Present);
        assert!(req.validate().is_ok());
    }
}
