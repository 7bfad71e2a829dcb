use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::address::{AddressChanges, AddressView, NewAddress};
use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    pub user_id: Uuid,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub is_primary: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AddressView> for AddressResponse {
    fn from(address: AddressView) -> Self {
        AddressResponse {
            id: address.id,
            user_id: address.user_id,
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: address.country,
            is_primary: address.is_primary,
            created_at: address.created_at.to_rfc3339(),
            updated_at: address.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListAddressesResponse {
    pub items: Vec<AddressResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListAddressesParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Restrict results to one user's addresses.
    pub user_id: Option<Uuid>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /addresses
#[utoipa::path(
    post,
    path = "/addresses",
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created", body = AddressResponse),
        (status = 404, description = "Owning user not found"),
    ),
    tag = "addresses"
)]
pub async fn create_address(
    state: web::Data<AppState>,
    body: web::Json<CreateAddressRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let addresses = state.addresses.clone();

    let address = web::block(move || {
        addresses.create(NewAddress {
            user_id: body.user_id,
            street: body.street,
            city: body.city,
            state: body.state,
            zip_code: body.zip_code,
            country: body.country,
            is_primary: body.is_primary,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(AddressResponse::from(address)))
}

/// GET /addresses/{id}
#[utoipa::path(
    get,
    path = "/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address UUID")),
    responses(
        (status = 200, description = "Address found", body = AddressResponse),
        (status = 404, description = "Address not found"),
    ),
    tag = "addresses"
)]
pub async fn get_address(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let addresses = state.addresses.clone();

    let address = web::block(move || addresses.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match address {
        Some(address) => Ok(HttpResponse::Ok().json(AddressResponse::from(address))),
        None => Err(DomainError::not_found("address", id).into()),
    }
}

/// GET /addresses
#[utoipa::path(
    get,
    path = "/addresses",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("user_id" = Option<Uuid>, Query, description = "Only this user's addresses"),
    ),
    responses(
        (status = 200, description = "Paginated list of addresses", body = ListAddressesResponse),
    ),
    tag = "addresses"
)]
pub async fn list_addresses(
    state: web::Data<AppState>,
    query: web::Query<ListAddressesParams>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let page = crate::domain::page::Page::new(query.page.max(1), query.limit.clamp(1, 100));
    let addresses = state.addresses.clone();

    let result = web::block(move || addresses.list(query.user_id, page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListAddressesResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// PUT /addresses/{id}
#[utoipa::path(
    put,
    path = "/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address UUID")),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = AddressResponse),
        (status = 404, description = "Address not found"),
    ),
    tag = "addresses"
)]
pub async fn update_address(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAddressRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let addresses = state.addresses.clone();

    let address = web::block(move || {
        addresses.update(
            id,
            AddressChanges {
                street: body.street,
                city: body.city,
                state: body.state,
                zip_code: body.zip_code,
                country: body.country,
                is_primary: body.is_primary,
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match address {
        Some(address) => Ok(HttpResponse::Ok().json(AddressResponse::from(address))),
        None => Err(DomainError::not_found("address", id).into()),
    }
}

/// DELETE /addresses/{id}
#[utoipa::path(
    delete,
    path = "/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address UUID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 404, description = "Address not found"),
    ),
    tag = "addresses"
)]
pub async fn delete_address(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let addresses = state.addresses.clone();

    let deleted = web::block(move || addresses.delete(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(DomainError::not_found("address", id).into())
    }
}
