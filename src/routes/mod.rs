pub mod auth;
pub mod health;
pub mod todos;

use actix_web::web;

use crate::auth::AuthGate;

/// Mounts every route. `AppState` must be registered as `web::Data` on the app.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(health::landing)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::logout),
        )
        .service(
            web::scope(todos::TODOS_PATH)
                .wrap(AuthGate::default())
                .service(todos::list_todos)
                .service(todos::add_todo)
                .service(todos::update_todo)
                .service(todos::toggle_todo)
                .service(todos::delete_todo)
                .service(todos::get_todo),
        );
}
