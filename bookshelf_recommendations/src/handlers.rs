use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self, Json},
};

use bookshelf_library::api::UserId;

use crate::api::{Recommendations, RecommendationsQuery};
use crate::recommendations_service::RecommendationsService;

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_recommendations_for_user(
    service: Data<RecommendationsService>,
    user_id: web::Path<UserId>,
    query: web::Query<RecommendationsQuery>,
) -> Result<Json<Recommendations>, Error> {
    let books = service
        .recommendations_for_user(user_id.into_inner(), query.into_inner().n)
        .await;
    Ok(Json(Recommendations { books }))
}
