#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::sync::Arc;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use tracing_subscriber::EnvFilter;

    use acorn::config;
    use acorn::core::store::MemStore;
    use acorn::mail::delivery::{LogTransport, QueueMailer, SmtpMailTransport, Transport};
    use acorn::mail::Mailer;

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request, Response};

        pub fn to_spin_request(
            req: &HttpRequest,
            body: actix_web::web::Bytes,
        ) -> anyhow::Result<Request> {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let uri = req.uri().to_string();

            let mut builder = Request::builder();
            let mut partial = builder.method(method).uri(&uri);
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    partial = partial.header(name.as_str(), val_str);
                }
            }

            Ok(partial.body(body.to_vec()).build())
        }

        pub fn to_actix_response(spin_resp: Response) -> actix_web::HttpResponse {
            let status = *spin_resp.status();
            let body = spin_resp.body().to_vec();

            actix_web::HttpResponse::build(
                actix_web::http::StatusCode::from_u16(status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
            )
            .body(body)
        }
    }

    struct AppState {
        store: MemStore,
        mailer: Arc<QueueMailer>,
    }

    async fn handle_all(
        state: web::Data<AppState>,
        req: HttpRequest,
        body: web::Bytes,
    ) -> HttpResponse {
        let spin_req = match adapter::to_spin_request(&req, body) {
            Ok(r) => r,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": "Invalid request" }))
            }
        };

        match acorn::route(&state.store, state.mailer.as_ref() as &dyn Mailer, spin_req) {
            Ok(spin_resp) => adapter::to_actix_response(spin_resp),
            Err(err) => {
                tracing::error!(error = %err, path = %req.path(), "request handling failed");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "Internal server error" }))
            }
        }
    }

    pub async fn run() -> std::io::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let transport: Arc<dyn Transport> = match SmtpMailTransport::from_env() {
            Some(smtp) => Arc::new(smtp),
            None => Arc::new(LogTransport),
        };
        let mailer = Arc::new(QueueMailer::start(
            transport,
            config::mail_queue_capacity(),
            config::mail_workers(),
        ));

        let state = web::Data::new(AppState {
            store: MemStore::new(),
            mailer,
        });

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        tracing::info!(%bind_addr, "server listening");

        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .default_service(web::route().to(handle_all))
        })
        .bind(bind_addr)?
        .run()
        .await
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
