use actix_web::{
  Error, HttpMessage, ResponseError,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
};

use crate::adapters::http::errors::ApiError;
use crate::domain::user::value_objects::UserId;
use crate::infrastructure::security::ServiceTokenVerifier;

/// Header carrying the id of the end user the calling service acts for
pub const ACTING_USER_HEADER: &str = "X-Equater-User-Id";

/// Authenticates calls from the API gateway.
///
/// Requests must carry `Authorization: Bearer <service token>` matching the
/// configured digest and an `X-Equater-User-Id` header naming the signed-in
/// user. The user id is stored in request extensions as [`ActingUser`].
pub struct ServiceAuthMiddleware {
  verifier: ServiceTokenVerifier,
}

impl ServiceAuthMiddleware {
  pub fn new(verifier: ServiceTokenVerifier) -> Self {
    Self { verifier }
  }
}

impl<S, B> Transform<S, ServiceRequest> for ServiceAuthMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = ServiceAuthMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(ServiceAuthMiddlewareService {
      service: Rc::new(service),
      verifier: self.verifier.clone(),
    }))
  }
}

pub struct ServiceAuthMiddlewareService<S> {
  service: Rc<S>,
  verifier: ServiceTokenVerifier,
}

impl<S, B> Service<ServiceRequest> for ServiceAuthMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let authenticated = authenticate(&req, &self.verifier);

    Box::pin(async move {
      let acting_user = match authenticated {
        Ok(acting_user) => acting_user,
        Err(e) => {
          tracing::warn!("Rejected request to {}: {}", req.path(), e);
          let (request, _) = req.into_parts();
          let response = e.error_response().map_into_right_body();
          return Ok(ServiceResponse::new(request, response));
        }
      };

      req.extensions_mut().insert(acting_user);

      let res = service.call(req).await?;
      Ok(res.map_into_left_body())
    })
  }
}

fn authenticate(req: &ServiceRequest, verifier: &ServiceTokenVerifier) -> Result<ActingUser, ApiError> {
  let token = req
    .headers()
    .get("Authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
    .ok_or_else(|| ApiError::Unauthorized("Missing or invalid Authorization header".to_string()))?;

  if !verifier.verify(token) {
    return Err(ApiError::Unauthorized("Invalid service token".to_string()));
  }

  req
    .headers()
    .get(ACTING_USER_HEADER)
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.trim().parse::<i64>().ok())
    .and_then(|id| UserId::new(id).ok())
    .map(ActingUser)
    .ok_or_else(|| ApiError::Unauthorized(format!("Missing or invalid {} header", ACTING_USER_HEADER)))
}

/// The end user a request was made on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

/// Extension trait to read the acting user set by [`ServiceAuthMiddleware`]
pub trait ActingUserExt {
  fn acting_user(&self) -> Result<UserId, ApiError>;
}

impl ActingUserExt for actix_web::HttpRequest {
  fn acting_user(&self) -> Result<UserId, ApiError> {
    self
      .extensions()
      .get::<ActingUser>()
      .map(|acting| acting.0)
      .ok_or_else(|| ApiError::Unauthorized("Request is not authenticated".to_string()))
  }
}
