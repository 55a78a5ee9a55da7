use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    model::{
        Repository, ResourceTyped, check_access,
        entity::{
            Assignment, AssignmentCreate, Group, MAX_SUBMISSION_GRADE, Student, Submission,
            SubmissionCreate, Teacher,
        },
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::assignments::{AssignmentCreateBody, GradeBody, SubmissionBody},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/",
            get(assignments_list_handler).post(assignments_create_handler),
        )
        .route(
            "/{id}/submissions",
            get(submissions_list_handler).post(submissions_create_handler),
        )
        .route("/submissions/{id}/grade", put(submissions_grade_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn find_assignment(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Assignment> {
    let user = ctx.user()?;
    Assignment::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Assignment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Assignment::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/",
    description = "Students get the assignments of their current group, teachers their own ones, admins all",
    responses(
        (status = 200, description = "Assignments collected", body = Vec<Assignment>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "assignments",
    security(
        ("cookie" = [])
    )
)]
pub async fn assignments_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let mm = state.pool();

    let assignments = match user.user_role() {
        UserRole::Student { student_id } => {
            let group_id = Student::find_by_id(mm, user, student_id)
                .await
                .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
                .and_then(|s| s.current_group_id());

            match group_id {
                Some(group_id) => Assignment::all_for_group(mm, user, group_id).await,
                None => Ok(Vec::new()),
            }
        }
        UserRole::Teacher { teacher_id } => Assignment::all_for_teacher(mm, user, teacher_id).await,
        // -1 is "no limit" for sqlite
        UserRole::Admin => Assignment::list(mm, user, -1, 0).await,
    }
    .map_err(|e| WebError::resource_fetch_error(Assignment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(assignments)))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/",
    description = "Creates an assignment for a group",
    request_body = AssignmentCreateBody,
    responses(
        (status = 200, description = "Assignment created", body = Assignment),
        (status = 400, description = "Admin did not name a teacher", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only teachers and admins can do this", body = ErrorResponse),
        (status = 404, description = "Group or teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "assignments",
    security(
        ("cookie" = [])
    )
)]
pub async fn assignments_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(body): Json<AssignmentCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;

    let teacher_id = user.teacher_id().or(body.teacher_id).ok_or_else(|| {
        WebError::resource_bad_request(Assignment::get_resource_type(), "teacher_id is required")
    })?;

    let group_exists = Group::find_by_id(state.pool(), user, body.group_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Group::get_resource_type(), e))?
        .is_some();
    if !group_exists {
        return Err(WebError::resource_not_found(Group::get_resource_type()));
    }

    // a teacher's own profile exists, an admin-supplied id may not
    if user.teacher_id().is_none() {
        let teacher_exists = Teacher::find_by_id(state.pool(), user, teacher_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(Teacher::get_resource_type(), e))?
            .is_some();
        if !teacher_exists {
            return Err(WebError::resource_not_found(Teacher::get_resource_type()));
        }
    }

    let data = AssignmentCreate {
        title: body.title,
        description: body.description,
        group_id: body.group_id,
        teacher_id,
        deadline: body.deadline,
    };
    let created = Assignment::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Assignment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{assignment_id}/submissions",
    description = "Submissions for an assignment. Teachers only see their own assignments",
    params(
        ("assignment_id" = Uuid, Path, description = "ID of the assignment")
    ),
    responses(
        (status = 200, description = "Submissions collected", body = Vec<Submission>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your assignment", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "assignments",
    security(
        ("cookie" = [])
    )
)]
pub async fn submissions_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    let assignment = find_assignment(&state, &ctx, id).await?;

    check_access(state.pool(), user, &assignment)
        .await
        .map_err(|e| WebError::from_database(Assignment::get_resource_type(), e))?;

    let submissions = Submission::all_for_assignment(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Submission::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(submissions)))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/{assignment_id}/submissions",
    description = "Submits an answer. Each student submits once per assignment",
    request_body = SubmissionBody,
    params(
        ("assignment_id" = Uuid, Path, description = "ID of the assignment")
    ),
    responses(
        (status = 200, description = "Submission stored", body = Submission),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Assignment is not for your group", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
        (status = 409, description = "Already submitted", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "assignments",
    security(
        ("cookie" = [])
    )
)]
pub async fn submissions_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmissionBody>,
) -> WebResult<impl IntoResponse> {
    let (user, student_id) = ctx.student()?;
    let assignment = find_assignment(&state, &ctx, id).await?;

    let group_id = Student::find_by_id(state.pool(), user, student_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .and_then(|s| s.current_group_id());
    if group_id != Some(assignment.group_id()) {
        return Err(WebError::resource_forbidden(Assignment::get_resource_type()));
    }

    let data = SubmissionCreate {
        assignment_id: assignment.id(),
        student_id,
        answer_text: body.answer_text,
    };
    let created = Submission::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::from_database(Submission::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/assignments/submissions/{submission_id}/grade",
    description = "Grades a submission with 0..=7 and an optional comment",
    request_body = GradeBody,
    params(
        ("submission_id" = Uuid, Path, description = "ID of the submission")
    ),
    responses(
        (status = 200, description = "Submission graded", body = Submission),
        (status = 400, description = "Grade out of range", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your assignment", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "assignments",
    security(
        ("cookie" = [])
    )
)]
pub async fn submissions_grade_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<GradeBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;

    if !(0..=MAX_SUBMISSION_GRADE).contains(&body.grade) {
        return Err(WebError::resource_bad_request(
            Submission::get_resource_type(),
            format!("grade must be within 0..={MAX_SUBMISSION_GRADE}"),
        ));
    }

    let submission = Submission::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Submission::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Submission::get_resource_type()))?;

    check_access(state.pool(), user, &submission)
        .await
        .map_err(|e| WebError::from_database(Submission::get_resource_type(), e))?;

    let graded = submission
        .set_grade(state.pool(), user, body.grade, body.comment.unwrap_or_default())
        .await
        .map_err(|e| WebError::resource_fetch_error(Submission::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(graded)))
}
