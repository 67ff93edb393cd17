use crate::lesson_file::{
    get_lesson_file_meta, list_lesson_files, read_lesson_file, write_lesson_file,
};
use crate::results::{grade, read_results_file, record_result};
use actix_web::{error, web, HttpResponse, Responder, Result};
use system::serde::Deserialize;
use system::serde_json::json;
use system::{AnswerValue, BlockId, Lesson, LessonId};

pub fn configure_lesson_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/lessons")
            .route(web::post().to(create_lesson))
            .route(web::get().to(list_lessons)),
    );
    cfg.service(
        web::resource("/lessons/{lesson_id}")
            .route(web::get().to(show_lesson))
            .route(web::put().to(update_lesson)),
    );
    cfg.service(
        web::resource("/lessons/{lesson_id}/results")
            .route(web::post().to(submit_result))
            .route(web::get().to(my_results)),
    );
}

#[derive(Deserialize)]
pub struct CreateLessonBody {
    title: String,
}

async fn create_lesson(body: web::Json<CreateLessonBody>) -> Result<impl Responder> {
    let lesson = Lesson::new(body.title.clone());
    write_lesson_file(&lesson)
        .await
        .map_err(|_| error::ErrorInternalServerError("failed to store lesson"))?;
    Ok(HttpResponse::Ok().json(json!({ "lessonId": lesson.id.to_string() })))
}

async fn list_lessons() -> Result<impl Responder> {
    let entries = list_lesson_files().await;
    Ok(HttpResponse::Ok().json(json!(entries)))
}

#[derive(Deserialize)]
pub struct LessonParam {
    lesson_id: String,
}

fn parse_lesson_id(path: &LessonParam) -> Result<LessonId> {
    path.lesson_id
        .parse::<LessonId>()
        .map_err(|_| error::ErrorBadRequest("invalid format"))
}

async fn show_lesson(path: web::Path<LessonParam>) -> Result<impl Responder> {
    let lesson_id = parse_lesson_id(&path)?;
    let lesson = read_lesson_file(&lesson_id)
        .await
        .map_err(|_| error::ErrorNotFound("no such lesson"))?;
    // Answer keys stay on the server; grading happens through the result
    // store, never in the client.
    Ok(HttpResponse::Ok().json(lesson.without_answer_keys()))
}

async fn update_lesson(
    path: web::Path<LessonParam>,
    body: web::Json<Lesson>,
) -> Result<impl Responder> {
    let lesson_id = parse_lesson_id(&path)?;
    if body.id != lesson_id {
        return Err(error::ErrorBadRequest("lesson id mismatch"));
    }
    get_lesson_file_meta(&lesson_id)
        .await
        .map_err(|_| error::ErrorNotFound("no such lesson"))?;
    write_lesson_file(&body)
        .await
        .map_err(|_| error::ErrorInternalServerError("failed to store lesson"))?;
    Ok(HttpResponse::Ok().json(json!({ "lessonId": lesson_id.to_string() })))
}

#[derive(Deserialize)]
pub struct SubmitResultBody {
    block_id: BlockId,
    answer: AnswerValue,
}

async fn submit_result(
    path: web::Path<LessonParam>,
    body: web::Json<SubmitResultBody>,
) -> Result<impl Responder> {
    let lesson_id = parse_lesson_id(&path)?;
    let lesson = read_lesson_file(&lesson_id)
        .await
        .map_err(|_| error::ErrorNotFound("no such lesson"))?;
    let block = lesson
        .find_block(&body.block_id)
        .ok_or_else(|| error::ErrorNotFound("no such block"))?;

    let result = grade(block, body.answer.clone());
    record_result(&lesson_id, result.clone())
        .await
        .map_err(|_| error::ErrorInternalServerError("failed to store result"))?;
    Ok(HttpResponse::Ok().json(json!({
        "is_correct": result.is_correct,
        "details": result.details,
    })))
}

async fn my_results(path: web::Path<LessonParam>) -> Result<impl Responder> {
    let lesson_id = parse_lesson_id(&path)?;
    let results = read_results_file(&lesson_id).await;
    Ok(HttpResponse::Ok().json(results))
}
