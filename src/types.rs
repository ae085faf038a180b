//! Backend resource types and request payloads.
//!
//! Timestamps are ISO-8601 strings as sent by the backend.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// `data` of a register/login response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: User,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Instructor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReviewAuthor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: ReviewAuthor,
    pub rating: f64,
    pub comment: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: String,
    pub level: Level,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub enrollment_count: u64,
    pub duration: f64,
    pub instructor: Instructor,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CourseList {
    pub courses: Vec<Course>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CourseDetail {
    pub course: Course,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Filters for `GET /courses`. Unset fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseListParams {
    pub category: Option<String>,
    pub level: Option<Level>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

impl CourseListParams {
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let level = self.level.map(|level| match level {
            Level::Beginner => "beginner".to_owned(),
            Level::Intermediate => "intermediate".to_owned(),
            Level::Advanced => "advanced".to_owned(),
        });

        [
            ("category", self.category.clone()),
            ("level", level),
            ("search", self.search.clone()),
            ("page", self.page.map(|page| page.to_string())),
            ("limit", self.limit.map(|limit| limit.to_string())),
            ("sort", self.sort.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_owned(), value)))
        .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateCoursePayload {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub duration: f64,
    pub level: Level,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewPayload {
    pub rating: u8,
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    pub duration: f64,
    pub order: u32,
    pub course: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonPayload {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub course: Course,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    pub enrolled_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct LessonList {
    pub lessons: Vec<Lesson>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct EnrollmentList {
    pub enrollments: Vec<Enrollment>,
}
