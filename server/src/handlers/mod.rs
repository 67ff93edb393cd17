use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;
use crate::handlers::lessons::configure_lesson_handlers;
use actix_web::web;

mod admin;
mod lessons;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/{lesson_id}").route(web::get().to(ws_index)));

    configure_lesson_handlers(cfg);
    configure_admin_handlers(cfg);
}
