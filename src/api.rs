//! Typed wrappers over the backend route table.
//!
//! Every call goes through [`CoursewareClient::execute`], so retry and
//! session-expiry handling apply uniformly. Routes with a documented
//! response shape decode into [`crate::types`]; the rest return the raw
//! [`ApiResponse`].

use serde::Serialize;

use crate::{
    request::is_dot_segment,
    types::{
        AuthData, CourseDetail, CourseList, CourseListParams, CreateCoursePayload,
        CreateLessonPayload, Enrollment, EnrollmentList, Lesson, LessonList, LoginPayload,
        RegisterPayload, ReviewPayload,
    },
    ApiResponse, CoursewareClient, CoursewareError, RequestDescriptor, Result,
};

impl CoursewareClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn courses(&self) -> CoursesApi<'_> {
        CoursesApi { client: self }
    }

    pub fn enrollments(&self) -> EnrollmentsApi<'_> {
        EnrollmentsApi { client: self }
    }

    pub fn lessons(&self) -> LessonsApi<'_> {
        LessonsApi { client: self }
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }
}

/// Rejects ids that would alter the route they are spliced into.
fn segment(id: &str) -> Result<&str> {
    if id.is_empty() || id.contains(['/', '?', '#']) || is_dot_segment(id) {
        return Err(CoursewareError::InvalidRequest(format!(
            "invalid path segment: {id:?}"
        )));
    }
    Ok(id)
}

/// `/auth` routes.
#[derive(Clone, Copy, Debug)]
pub struct AuthApi<'a> {
    client: &'a CoursewareClient,
}

impl AuthApi<'_> {
    /// Creates an account and stores the returned access token.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthData> {
        let request = RequestDescriptor::post("/auth/register").with_json(payload)?;
        self.sign_in(&request).await
    }

    /// Signs in and stores the returned access token.
    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthData> {
        let request = RequestDescriptor::post("/auth/login").with_json(payload)?;
        self.sign_in(&request).await
    }

    pub async fn me(&self) -> Result<ApiResponse> {
        self.client.execute(&RequestDescriptor::get("/auth/me")).await
    }

    /// Drops the local session. No request is sent.
    pub fn logout(&self) {
        self.client.token_store().clear();
    }

    async fn sign_in(&self, request: &RequestDescriptor) -> Result<AuthData> {
        let data: AuthData = self.client.execute(request).await?.data()?;
        self.client.token_store().set(data.access_token.clone());
        Ok(data)
    }
}

/// `/courses` routes.
#[derive(Clone, Copy, Debug)]
pub struct CoursesApi<'a> {
    client: &'a CoursewareClient,
}

impl CoursesApi<'_> {
    pub async fn list(&self, params: &CourseListParams) -> Result<CourseList> {
        let mut request = RequestDescriptor::get("/courses");
        request.query = params.to_query();
        self.client.execute(&request).await?.data()
    }

    pub async fn get(&self, id: &str) -> Result<CourseDetail> {
        let request = RequestDescriptor::get(format!("/courses/{}", segment(id)?));
        self.client.execute(&request).await?.data()
    }

    pub async fn create(&self, payload: &CreateCoursePayload) -> Result<ApiResponse> {
        let request = RequestDescriptor::post("/courses").with_json(payload)?;
        self.client.execute(&request).await
    }

    /// Accepts a partial payload: only the fields to change.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: &str,
        payload: &T,
    ) -> Result<ApiResponse> {
        let request = RequestDescriptor::put(format!("/courses/{}", segment(id)?))
            .with_json(payload)?;
        self.client.execute(&request).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse> {
        let request = RequestDescriptor::delete(format!("/courses/{}", segment(id)?));
        self.client.execute(&request).await
    }

    pub async fn add_review(&self, id: &str, payload: &ReviewPayload) -> Result<ApiResponse> {
        let request = RequestDescriptor::post(format!("/courses/{}/reviews", segment(id)?))
            .with_json(payload)?;
        self.client.execute(&request).await
    }

    pub async fn toggle_publish(&self, id: &str) -> Result<ApiResponse> {
        let request = RequestDescriptor::patch(format!("/courses/{}/publish", segment(id)?));
        self.client.execute(&request).await
    }

    /// Courses owned by the signed-in instructor.
    pub async fn instructor_courses(&self) -> Result<CourseList> {
        let request = RequestDescriptor::get("/courses/instructor/my-courses");
        self.client.execute(&request).await?.data()
    }
}

/// `/enrollments` routes.
#[derive(Clone, Copy, Debug)]
pub struct EnrollmentsApi<'a> {
    client: &'a CoursewareClient,
}

impl EnrollmentsApi<'_> {
    pub async fn enroll(&self, course_id: &str) -> Result<ApiResponse> {
        let request =
            RequestDescriptor::post(format!("/enrollments/{}/enroll", segment(course_id)?));
        self.client.execute(&request).await
    }

    pub async fn my_enrollments(&self) -> Result<Vec<Enrollment>> {
        let request = RequestDescriptor::get("/enrollments/my-enrollments");
        let list: EnrollmentList = self.client.execute(&request).await?.data()?;
        Ok(list.enrollments)
    }

    pub async fn get(&self, course_id: &str) -> Result<Enrollment> {
        let request = RequestDescriptor::get(format!("/enrollments/{}", segment(course_id)?));
        self.client.execute(&request).await?.data()
    }

    pub async fn complete_lesson(&self, course_id: &str, lesson_id: &str) -> Result<ApiResponse> {
        let request = RequestDescriptor::post(format!(
            "/enrollments/{}/lessons/{}/complete",
            segment(course_id)?,
            segment(lesson_id)?
        ));
        self.client.execute(&request).await
    }

    pub async fn unenroll(&self, course_id: &str) -> Result<ApiResponse> {
        let request =
            RequestDescriptor::delete(format!("/enrollments/{}/unenroll", segment(course_id)?));
        self.client.execute(&request).await
    }
}

/// `/lessons` routes.
#[derive(Clone, Copy, Debug)]
pub struct LessonsApi<'a> {
    client: &'a CoursewareClient,
}

impl LessonsApi<'_> {
    pub async fn for_course(&self, course_id: &str) -> Result<Vec<Lesson>> {
        let request = RequestDescriptor::get(format!(
            "/lessons/courses/{}/lessons",
            segment(course_id)?
        ));
        let list: LessonList = self.client.execute(&request).await?.data()?;
        Ok(list.lessons)
    }

    pub async fn get(&self, id: &str) -> Result<ApiResponse> {
        let request = RequestDescriptor::get(format!("/lessons/{}", segment(id)?));
        self.client.execute(&request).await
    }

    pub async fn create(
        &self,
        course_id: &str,
        payload: &CreateLessonPayload,
    ) -> Result<ApiResponse> {
        let request =
            RequestDescriptor::post(format!("/lessons/courses/{}/lessons", segment(course_id)?))
                .with_json(payload)?;
        self.client.execute(&request).await
    }

    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: &str,
        payload: &T,
    ) -> Result<ApiResponse> {
        let request = RequestDescriptor::put(format!("/lessons/{}", segment(id)?))
            .with_json(payload)?;
        self.client.execute(&request).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse> {
        let request = RequestDescriptor::delete(format!("/lessons/{}", segment(id)?));
        self.client.execute(&request).await
    }
}

/// `/users` routes.
#[derive(Clone, Copy, Debug)]
pub struct UsersApi<'a> {
    client: &'a CoursewareClient,
}

impl UsersApi<'_> {
    pub async fn profile(&self, id: &str) -> Result<ApiResponse> {
        let request = RequestDescriptor::get(format!("/users/{}", segment(id)?));
        self.client.execute(&request).await
    }

    pub async fn update_profile<T: Serialize + ?Sized>(&self, payload: &T) -> Result<ApiResponse> {
        let request = RequestDescriptor::put("/users/profile").with_json(payload)?;
        self.client.execute(&request).await
    }
}
