use actix_web::HttpResponse;
use std::borrow::Cow;

#[derive(serde::Serialize)]
struct MessageBody {
    message: Cow<'static, str>,
}

/// An object payload with a `message` key merged in. Only struct or map
/// payloads can carry a message.
#[derive(serde::Serialize)]
struct WithMessage<T: serde::Serialize> {
    message: Cow<'static, str>,
    #[serde(flatten)]
    data: T,
}

/// Success response. The payload is written as the top level JSON body.
pub struct Success<T: serde::Serialize> {
    pub status: actix_web::http::StatusCode,
    pub data: Option<T>,
    pub message: Option<Cow<'static, str>>,
}

impl<T: serde::Serialize> Success<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self { status: actix_web::http::StatusCode::OK, data, message: None }
    }

    pub fn message<M>(mut self, msg: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        self.message = Some(msg.into());
        self
    }

    pub fn created(data: Option<T>) -> Self {
        Self { status: actix_web::http::StatusCode::CREATED, data, message: None }
    }
}

impl<T: serde::Serialize> actix_web::Responder for Success<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        let mut response = HttpResponse::build(self.status);

        match (self.data, self.message) {
            (Some(data), Some(message)) => response.json(WithMessage { message, data }),
            (Some(data), None) => response.json(data),
            (None, Some(message)) => response.json(MessageBody { message }),
            (None, None) => response.finish(),
        }
    }
}
