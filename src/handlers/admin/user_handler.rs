use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::common::ApiResponse;
use crate::models::user::UpdateRoleRequest;
use crate::services::{Actor, IdentityDirectory};

#[tracing::instrument(
    name = "Admin: update user role",
    skip(identity, actor, body),
    fields(actor = %actor.user_id, role = %body.role)
)]
pub async fn update_user_role(
    identity: web::Data<IdentityDirectory>,
    actor: web::ReqData<Actor>,
    user_id: web::Path<Uuid>,
    body: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let user = identity.set_role(&actor, user_id.into_inner(), body.role)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("{} is now {}", user.name, user.role),
        user,
    )))
}
