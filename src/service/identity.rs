use std::future::{ready, Ready};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::errors::AppError;

/// The authenticated identity for one request. The token is minted by the
/// external identity system; this service only verifies the signature and
/// expiry, it never sees credentials.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::AccessDenied)
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| AppError::AccessDenied.into()),
        )
    }
}

pub struct Identity {
    secret: Vec<u8>,
}

impl Identity {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Identity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = IdentityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct IdentityService<S> {
    service: S,
    secret: Vec<u8>,
}

impl<S, B> Service<ServiceRequest> for IdentityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match jwt::authenticate(&req, &self.secret) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(err) => Box::pin(async move { Err(err.into()) }),
        }
    }
}

pub mod jwt {
    use actix_web::dev::ServiceRequest;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    use super::CurrentUser;
    use crate::dto::Claims;
    use crate::errors::AppError;

    pub fn authenticate(req: &ServiceRequest, secret: &[u8]) -> Result<CurrentUser, AppError> {
        let token = parse_bearer(req)?;
        let claims = decode_claims(&token, secret)?;
        Ok(CurrentUser {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
        })
    }

    pub fn decode_claims(token: &str, secret: &[u8]) -> Result<Claims, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::AccessDenied)?;
        Ok(data.claims)
    }

    pub fn parse_bearer(req: &ServiceRequest) -> Result<String, AppError> {
        req.headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.to_string())
            .ok_or(AppError::AccessDenied)
    }

    #[cfg(test)]
    pub fn issue(claims: &Claims, secret: &[u8]) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .expect("token encoding")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Service;
    use actix_web::error::ResponseError;
    use actix_web::{test, web, App, HttpResponse};
    use chrono::Utc;

    use crate::dto::Claims;

    const SECRET: &[u8] = b"unit-test-secret";

    fn token(is_admin: bool, ttl_secs: i64) -> String {
        let claims = Claims::new(
            Uuid::new_v4(),
            "jordan",
            is_admin,
            (Utc::now().timestamp() + ttl_secs) as usize,
        );
        jwt::issue(&claims, SECRET)
    }

    async fn whoami(user: CurrentUser) -> HttpResponse {
        HttpResponse::Ok().body(user.username)
    }

    #[actix_web::test]
    async fn valid_token_reaches_the_handler() {
        let srv = test::init_service(
            App::new()
                .wrap(Identity::new(SECRET))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token(false, 3600))))
            .to_request();
        let res = srv.call(req).await.expect("authenticated request");
        assert!(res.status().is_success());
        let body = test::read_body(res).await;
        assert_eq!(body, "jordan");
    }

    #[actix_web::test]
    async fn missing_token_is_rejected() {
        let srv = test::init_service(
            App::new()
                .wrap(Identity::new(SECRET))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get().uri("/whoami").to_request();
        let err = srv.call(req).await.err().expect("rejection");
        assert_eq!(
            err.as_response_error().status_code(),
            AppError::AccessDenied.status_code()
        );
    }

    #[actix_web::test]
    async fn expired_token_is_rejected() {
        let srv = test::init_service(
            App::new()
                .wrap(Identity::new(SECRET))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token(false, -3600))))
            .to_request();
        assert!(srv.call(req).await.is_err());
    }

    #[::core::prelude::v1::test]
    fn claims_survive_a_round_trip() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "sam",
            true,
            (Utc::now().timestamp() + 600) as usize,
        );
        let decoded = jwt::decode_claims(&jwt::issue(&claims, SECRET), SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.username, "sam");
        assert!(decoded.is_admin);
    }

    #[::core::prelude::v1::test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "sam",
            false,
            (Utc::now().timestamp() + 600) as usize,
        );
        let token = jwt::issue(&claims, SECRET);
        assert!(jwt::decode_claims(&token, b"other-secret").is_err());
    }

    #[::core::prelude::v1::test]
    fn admin_gate() {
        let user = CurrentUser {
            user_id: Uuid::new_v4(),
            username: "sam".to_string(),
            is_admin: false,
        };
        assert_eq!(user.require_admin(), Err(AppError::AccessDenied));
    }
}
