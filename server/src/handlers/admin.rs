use crate::admin::{AdminCommand, LessonLiveDescription};
use crate::lesson_file::{list_lesson_files, read_lesson_file, write_lesson_file};
use crate::server::{ServerCommand, ServerTx};
use actix_web::error;
use actix_web::web::{self, HttpRequest, HttpResponse};
use actix_web::Responder;
use actix_web::Result;
use askama_actix::Template;
use system::serde::Deserialize;
use system::{Lesson, LessonId, PageIndex};

#[derive(Template)]
#[template(path = "admin-index.html")]
pub struct AdminIndexTemplate {
    lessons_url: String,
}

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("").route(web::get().to(admin_index)))
            .service(
                web::resource("/lessons")
                    .name("admin_lessons")
                    .route(web::post().to(create_lesson))
                    .route(web::get().to(list_lessons)),
            )
            .service(
                web::resource("/lessons/{lesson_id}")
                    .name("admin_lesson")
                    .route(web::get().to(show_lesson)),
            )
            .service(
                web::resource("/lessons/{lesson_id}/open_live_session")
                    .name("admin_lesson_open_live_session")
                    .route(web::post().to(open_live_session)),
            )
            .service(
                web::resource("/lessons/{lesson_id}/close_live_session")
                    .name("admin_lesson_close_live_session")
                    .route(web::post().to(close_live_session)),
            ),
    );
}

pub async fn admin_index(req: HttpRequest) -> Result<impl Responder> {
    let lessons_url = req
        .url_for("admin_lessons", &[""])
        .expect("must match")
        .to_string();
    Ok(AdminIndexTemplate { lessons_url })
}

pub async fn create_lesson(req: HttpRequest) -> Result<impl Responder> {
    let lesson = Lesson::new("Untitled lesson".into());
    write_lesson_file(&lesson)
        .await
        .map_err(|_| error::ErrorInternalServerError("failed to store lesson"))?;
    Ok(HttpResponse::Found()
        .header(
            "Location",
            req.url_for("admin_lesson", &[lesson.id.to_string()])?
                .into_string(),
        )
        .finish())
}

struct SimpleListItem {
    title: String,
    href: String,
}

#[derive(Template)]
#[template(path = "simple-list.html")]
pub struct SimpleListTemplate {
    items: Vec<SimpleListItem>,
}

pub async fn list_lessons(req: HttpRequest) -> Result<impl Responder> {
    let entries = list_lesson_files().await;
    Ok(SimpleListTemplate {
        items: entries
            .iter()
            .map(|lesson_id| SimpleListItem {
                title: lesson_id.to_string(),
                href: req
                    .url_for("admin_lesson", &[lesson_id.to_string()])
                    .unwrap()
                    .to_string(),
            })
            .collect(),
    })
}

#[derive(Template)]
#[template(path = "admin/show-lesson.html")]
pub struct AdminShowLessonTemplate {
    title: String,
    total_pages: PageIndex,
    online: bool,
    live_session_id: String,
    teacher_present: bool,
    student_present: bool,
    open_live_session_action: String,
    close_live_session_action: String,
}

#[derive(Deserialize)]
pub struct ShowLessonParam {
    lesson_id: String,
}

pub async fn show_lesson(
    req: HttpRequest,
    path: web::Path<ShowLessonParam>,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let lesson_id = path
        .lesson_id
        .parse::<LessonId>()
        .map_err(|_| error::ErrorBadRequest("invalid format"))?;
    let lesson = read_lesson_file(&lesson_id)
        .await
        .map_err(|_| error::ErrorNotFound("no such lesson"))?;

    let (tx, rx) = tokio::sync::oneshot::channel::<LessonLiveDescription>();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::AdminCommand(AdminCommand::GetSessionState {
            lesson_id,
            tx,
        }))
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let description = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    let (online, live_session_id, teacher_present, student_present) = match description {
        LessonLiveDescription::Live {
            live_session_id,
            teacher_present,
            student_present,
        } => (true, live_session_id.to_string(), teacher_present, student_present),
        LessonLiveDescription::Offline => (false, String::new(), false, false),
    };

    Ok(AdminShowLessonTemplate {
        title: lesson.title.clone(),
        total_pages: lesson.total_pages(),
        online,
        live_session_id,
        teacher_present,
        student_present,
        open_live_session_action: req
            .url_for("admin_lesson_open_live_session", &[lesson_id.to_string()])
            .unwrap()
            .to_string(),
        close_live_session_action: req
            .url_for("admin_lesson_close_live_session", &[lesson_id.to_string()])
            .unwrap()
            .to_string(),
    })
}

pub async fn open_live_session(
    req: HttpRequest,
    path: web::Path<ShowLessonParam>,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let lesson_id = path
        .lesson_id
        .parse::<LessonId>()
        .map_err(|_| error::ErrorBadRequest("invalid format"))?;
    let lesson = read_lesson_file(&lesson_id)
        .await
        .map_err(|_| error::ErrorNotFound("no such lesson"))?;

    let (tx, rx) = tokio::sync::oneshot::channel();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::AdminCommand(AdminCommand::OpenLiveSession {
            lesson_id,
            total_pages: lesson.total_pages(),
            tx,
        }))
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let _live_session_id = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    let redirect_to = req
        .url_for("admin_lesson", &[lesson_id.to_string()])
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?
        .to_string();

    Ok(HttpResponse::Found()
        .header("Location", redirect_to)
        .finish())
}

pub async fn close_live_session(
    req: HttpRequest,
    path: web::Path<ShowLessonParam>,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let lesson_id = path
        .lesson_id
        .parse::<LessonId>()
        .map_err(|_| error::ErrorBadRequest("invalid format"))?;

    let (tx, rx) = tokio::sync::oneshot::channel();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::AdminCommand(
            AdminCommand::CloseLiveSession { lesson_id, tx },
        ))
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    rx.await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    let redirect_to = req
        .url_for("admin_lesson", &[lesson_id.to_string()])
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?
        .to_string();

    Ok(HttpResponse::Found()
        .header("Location", redirect_to)
        .finish())
}
