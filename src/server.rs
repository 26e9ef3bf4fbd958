//! HTTP/1.1 server exposing the JSON API.

use crate::api::{self, Endpoint, Service};
use http_body_util::{BodyExt as _, Full, LengthLimitError, Limited};
use hyper::{
    body::{Bytes, Incoming},
    header::{self, HeaderValue},
    server::conn::http1,
    service::service_fn,
    Method, Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::{convert::Infallible, io, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

/// Binds a listener and serves the API until an unrecoverable error occurs.
pub async fn run(addr: SocketAddr, service: Service) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    serve(listener, service).await
}

/// Serves the API on an already bound listener. Each connection is handled
/// on its own task.
pub async fn serve(listener: TcpListener, service: Service) -> io::Result<()> {
    let service = Arc::new(service);
    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(connection) => connection,
            Err(err) => {
                log::warn!("failed to accept connection: {err}");
                continue;
            }
        };

        let service = service.clone();
        tokio::spawn(async move {
            let handler = service_fn(move |request| {
                let service = service.clone();
                async move { Ok::<_, Infallible>(handle(&service, request).await) }
            });
            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), handler)
                .await
            {
                log::debug!("connection from {remote} failed: {err}");
            }
        });
    }
}

async fn handle(service: &Service, request: Request<Incoming>) -> Response<Full<Bytes>> {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let (status, body) = match dispatch(service, request).await {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => (
            StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            err.body(),
        ),
    };
    log::debug!("{method} {path} {}", status.as_u16());
    json(status, &body)
}

async fn dispatch(service: &Service, request: Request<Incoming>) -> Result<Value, api::Error> {
    let path = request.uri().path();
    let endpoint =
        Endpoint::from_path(path).ok_or_else(|| api::Error::NotFound(path.to_owned()))?;
    if request.method() != Method::POST {
        return Err(api::Error::MethodNotAllowed(request.method().to_string()));
    }

    let body = Limited::new(request.into_body(), api::MAX_BODY_SIZE)
        .collect()
        .await
        .map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                api::Error::TooLarge
            } else {
                api::Error::Invalid(format!("failed to read request body: {err}"))
            }
        })?
        .to_bytes();
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| api::Error::Invalid(format!("invalid JSON body: {err}")))?
    };

    service.handle(endpoint, body).await
}

fn json(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
