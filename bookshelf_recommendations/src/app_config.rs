use paperclip::actix::web;

use crate::handlers::{get_recommendations_for_user, health};

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(
            web::resource("/api/recommendations/{user_id}")
                .route(web::get().to(get_recommendations_for_user)),
        );
}
