use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
    Apiv2Schema,
};
use serde::Deserialize;

use crate::api::{
    AddToShelfRequest, BookDetails, BookId, GetCatalogResponse, MoveRequest, RateRequest,
    Rating, UserId,
};
use crate::library_store::{LibraryStore, LibraryStoreError};

type Store = Data<Arc<dyn LibraryStore>>;

#[derive(Debug, Deserialize, Apiv2Schema)]
pub struct UserBookPath {
    user_id: UserId,
    book_id: BookId,
}

/// Expected errors are returned to the caller as json string, others are only logged
fn store_error_response(operation: &str, err: LibraryStoreError) -> HttpResponse {
    match err {
        LibraryStoreError::BookNotFound(_) | LibraryStoreError::NotOnShelf(..) => {
            HttpResponse::NotFound().json(err.to_string())
        }
        LibraryStoreError::AlreadyOnShelf(..) => HttpResponse::Conflict().json(err.to_string()),
        err => {
            tracing::error!("{} failed {}", operation, err);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_catalog(store: Store) -> Result<HttpResponse, Error> {
    Ok(match store.list_catalog().await {
        Ok(books) => HttpResponse::Ok().json(GetCatalogResponse { books }),
        Err(err) => store_error_response("Get catalog", err),
    })
}

#[api_v2_operation]
pub async fn add_book(store: Store, details: web::Json<BookDetails>) -> Result<HttpResponse, Error> {
    Ok(match store.add_book(details.into_inner()).await {
        Ok(book_id) => HttpResponse::Ok()
            .append_header((LOCATION, format!("/api/book/{}", book_id)))
            .finish(),
        Err(err) => store_error_response("Add book", err),
    })
}

#[api_v2_operation]
pub async fn get_book(store: Store, book_id: web::Path<BookId>) -> Result<HttpResponse, Error> {
    Ok(match store.get_book(book_id.into_inner()).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => store_error_response("Get book", err),
    })
}

#[api_v2_operation]
pub async fn get_shelves(store: Store, user_id: web::Path<UserId>) -> Result<HttpResponse, Error> {
    Ok(match store.shelves(user_id.into_inner()).await {
        Ok(shelves) => HttpResponse::Ok().json(shelves),
        Err(err) => store_error_response("Get shelves", err),
    })
}

#[api_v2_operation]
pub async fn get_interactions(
    store: Store,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(match store.list_interactions(user_id.into_inner()).await {
        Ok(interactions) => HttpResponse::Ok().json(interactions),
        Err(err) => store_error_response("Get interactions", err),
    })
}

#[api_v2_operation]
pub async fn add_to_shelf(
    store: Store,
    path: web::Path<UserBookPath>,
    request: web::Json<AddToShelfRequest>,
) -> Result<HttpResponse, Error> {
    let UserBookPath { user_id, book_id } = path.into_inner();
    Ok(
        match store
            .add_to_shelf(user_id, book_id, request.into_inner().status)
            .await
        {
            Ok(()) => HttpResponse::Ok().finish(),
            Err(err) => store_error_response("Add to shelf", err),
        },
    )
}

#[api_v2_operation]
pub async fn move_book(
    store: Store,
    path: web::Path<UserBookPath>,
    request: web::Json<MoveRequest>,
) -> Result<HttpResponse, Error> {
    let UserBookPath { user_id, book_id } = path.into_inner();
    Ok(
        match store
            .move_book(user_id, book_id, request.into_inner().status)
            .await
        {
            Ok(()) => HttpResponse::Ok().finish(),
            Err(err) => store_error_response("Move book", err),
        },
    )
}

#[api_v2_operation]
pub async fn rate_book(
    store: Store,
    path: web::Path<UserBookPath>,
    request: web::Json<RateRequest>,
) -> Result<HttpResponse, Error> {
    let UserBookPath { user_id, book_id } = path.into_inner();
    let rating = match Rating::new(request.into_inner().rating) {
        Ok(rating) => rating,
        Err(err) => return Ok(HttpResponse::BadRequest().json(err.to_string())),
    };
    Ok(match store.rate_book(user_id, book_id, rating).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => store_error_response("Rate book", err),
    })
}

#[api_v2_operation]
pub async fn remove_book(
    store: Store,
    path: web::Path<UserBookPath>,
) -> Result<HttpResponse, Error> {
    let UserBookPath { user_id, book_id } = path.into_inner();
    Ok(match store.remove_book(user_id, book_id).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => store_error_response("Remove book", err),
    })
}
