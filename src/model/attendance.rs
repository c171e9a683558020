use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Attendance row as stored. `photo_data` and `photo_timestamp` are written
/// together by the photo upload and are either both set or both null.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub emp_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub attendance_date: NaiveDate,
    pub time_in: NaiveTime,
    pub time_out: NaiveTime,
    pub status: String,
    #[serde(skip)]
    pub photo_data: Option<Vec<u8>>,
    pub photo_timestamp: Option<NaiveDateTime>,
}
