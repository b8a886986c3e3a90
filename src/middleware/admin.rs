use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    web, Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;

use crate::errors::AppError;
use crate::middleware::auth::validate_jwt_from_request;
use crate::services::IdentityDirectory;

/// Access layer in front of every mutating route. The caller's role is read
/// from the store on each request and the resolved
/// [`Actor`](crate::services::Actor) is handed to the handler.
pub struct AdminMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AdminMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AdminMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        let claims = match validate_jwt_from_request(&req) {
            Ok(claims) => claims,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        let Some(identity) = req.app_data::<web::Data<IdentityDirectory>>() else {
            return Box::pin(async move { Err(ErrorInternalServerError("Identity directory not configured")) });
        };

        let actor = match claims.user_id().ok_or(AppError::Unauthorized).and_then(|id| identity.actor(id)) {
            Ok(actor) => actor,
            Err(e) => return Box::pin(async move { Err(e.into()) }),
        };
        if !actor.is_privileged() {
            tracing::warn!("Non-privileged user attempted admin access: {} ({})", claims.name, actor.user_id);
            return Box::pin(async move { Err(AppError::Unauthorized.into()) });
        }

        req.extensions_mut().insert(claims);
        req.extensions_mut().insert(actor);

        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res)
        })
    }
}
