//! handlers/session.rs
//! Sesión del navegador: cookie `session_id` con un UUID v4.

use std::future::{ready, Ready};

use actix_web::cookie::Cookie;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponseBuilder};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    is_new: bool,
}

impl Session {
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, self.id.clone())
            .path("/")
            .http_only(true)
            .finish()
    }

    /// Si la sesión es nueva, agrega el Set-Cookie a la respuesta.
    pub fn attach<'a>(&self, builder: &'a mut HttpResponseBuilder) -> &'a mut HttpResponseBuilder {
        if self.is_new {
            builder.cookie(self.cookie());
        }
        builder
    }
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = match req.cookie(SESSION_COOKIE) {
            Some(c) if !c.value().is_empty() => Session {
                id: c.value().to_string(),
                is_new: false,
            },
            _ => Session {
                id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        };
        ready(Ok(session))
    }
}
