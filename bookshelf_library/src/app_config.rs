use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(web::resource("/books").route(web::get().to(handlers::get_catalog)))
                .service(web::resource("/book").route(web::post().to(handlers::add_book)))
                .service(
                    web::resource("/book/{book_id}").route(web::get().to(handlers::get_book)),
                )
                .service(
                    web::scope("/user/{user_id}")
                        .service(
                            web::resource("/shelves").route(web::get().to(handlers::get_shelves)),
                        )
                        .service(
                            web::resource("/interactions")
                                .route(web::get().to(handlers::get_interactions)),
                        )
                        .service(
                            web::resource("/book/{book_id}")
                                .route(web::post().to(handlers::add_to_shelf))
                                .route(web::delete().to(handlers::remove_book)),
                        )
                        .service(
                            web::resource("/book/{book_id}/status")
                                .route(web::put().to(handlers::move_book)),
                        )
                        .service(
                            web::resource("/book/{book_id}/rating")
                                .route(web::put().to(handlers::rate_book)),
                        ),
                ),
        );
}
