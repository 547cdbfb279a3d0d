use crate::queue::manager as qm;
use crate::Context;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use log::error;
use serde::Serialize;
use std::convert::Infallible;

pub(crate) async fn route(req: Request<Incoming>, context: Context) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/stats") => json(&context.stats.snapshot()),
        (&Method::GET, "/queues") => {
            let queues = qm::get_queues(&context.queue_manager).await;

            json(&queues)
        }
        (&Method::DELETE, _) if path.starts_with("/queues/") => {
            let name = &path["/queues/".len()..];

            match qm::delete_queue(&context.queue_manager, name).await {
                Ok(()) => status(StatusCode::NO_CONTENT),
                Err(e) => {
                    error!("Cannot delete queue {name} {:?}", e);

                    status(StatusCode::NOT_FOUND)
                }
            }
        }
        _ => status(StatusCode::NOT_FOUND),
    };

    Ok(response)
}

fn json<T: Serialize>(value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string(value) {
        Ok(body) => {
            let mut response = Response::new(Full::new(Bytes::from(body)));

            response.headers_mut().insert(
                hyper::header::CONTENT_TYPE,
                hyper::header::HeaderValue::from_static("application/json"),
            );

            response
        }
        Err(e) => {
            error!("Cannot serialize response {:?}", e);

            status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn status(code: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));

    *response.status_mut() = code;

    response
}
