//! Rate limiting middleware.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use futures::future::LocalBoxFuture;

use folio_core::ports::RateLimiter;

use super::client::client_address;
use super::error::{AppError, whole_seconds};

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Rate limiting middleware factory, keyed by client address.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    message: &'static str,
    trust_proxy: bool,
}

impl RateLimitMiddleware {
    /// `message` starts the 429 body; the retry hint is appended.
    pub fn new(limiter: Arc<dyn RateLimiter>, message: &'static str) -> Self {
        Self {
            limiter,
            message,
            trust_proxy: false,
        }
    }

    /// Key on forwarding headers rather than the socket peer.
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            message: self.message,
            trust_proxy: self.trust_proxy,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    message: &'static str,
    trust_proxy: bool,
}

/// "5 seconds", "1 minute", "15 minutes".
fn retry_hint(wait: Duration) -> String {
    let secs = whole_seconds(wait);
    if secs < 60 {
        return format!("{secs} second{}", if secs == 1 { "" } else { "s" });
    }
    let minutes = secs.div_ceil(60);
    format!("{minutes} minute{}", if minutes == 1 { "" } else { "s" })
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();
        let message = self.message;
        let trust_proxy = self.trust_proxy;

        Box::pin(async move {
            let key = client_address(req.request(), trust_proxy)
                .unwrap_or_else(|| "unknown".to_string());

            let result = match limiter.check(&key).await {
                Ok(result) => result,
                Err(e) => {
                    // Fail open: a broken limiter must not take the route down.
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    let res = service.call(req).await?;
                    return Ok(res.map_into_left_body());
                }
            };

            if !result.allowed {
                tracing::warn!(client = %key, path = %req.path(), "Rate limit exceeded");

                let error = AppError::RateLimited {
                    message: format!(
                        "{message}. Please try again in {}.",
                        retry_hint(result.reset_after)
                    ),
                    retry_after: result.reset_after,
                };
                let mut response = error.error_response();
                let headers = response.headers_mut();
                headers.insert(HeaderName::from_static(LIMIT_HEADER), HeaderValue::from(limiter.limit()));
                headers.insert(HeaderName::from_static(REMAINING_HEADER), HeaderValue::from(0u32));

                let (http_req, _payload) = req.into_parts();
                return Ok(ServiceResponse::new(http_req, response).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            let headers = res.headers_mut();
            headers.insert(HeaderName::from_static(LIMIT_HEADER), HeaderValue::from(limiter.limit()));
            headers.insert(HeaderName::from_static(REMAINING_HEADER), HeaderValue::from(result.remaining));
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::retry_hint;
    use std::time::Duration;

    #[test]
    fn retry_hint_rounds_up_to_minutes() {
        assert_eq!(retry_hint(Duration::from_millis(200)), "1 second");
        assert_eq!(retry_hint(Duration::from_secs(45)), "45 seconds");
        assert_eq!(retry_hint(Duration::from_secs(61)), "2 minutes");
        assert_eq!(retry_hint(Duration::from_secs(900)), "15 minutes");
    }
}
