use crate::domain::error::AppError;
use crate::domain::generation::{GenerationOutcome, GenerationRequest};
use crate::domain::testcase::{NewTestcase, TestcaseRecord};
use crate::infrastructure::db::connection::ping;
use crate::interfaces::state::AppState;
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::{
    dev::Server, error::JsonPayloadError, get, post, web, App, HttpRequest, HttpResponse,
    HttpServer, Responder, ResponseError,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Debug, Deserialize)]
pub struct TestcaseFilter {
    pub api_name: Option<String>,
    pub testcase_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveTestcasesResponse {
    pub message: String,
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListTestcasesResponse {
    pub testcases: Vec<TestcaseRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub generated_testcase: GenerationOutcome,
    pub saved_id: Option<i64>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LLMError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

#[post("/testcases")]
async fn save_testcases(
    data: web::Data<HttpState>,
    req: web::Json<Vec<NewTestcase>>,
) -> Result<HttpResponse, AppError> {
    let testcases = req.into_inner();
    let count = testcases.len();

    match data.app_state.testcase_use_case.save_testcases(testcases).await {
        Ok(ids) => {
            add_log(
                &data.logs,
                "INFO",
                "HttpApi",
                &format!("Saved {} testcases", ids.len()),
            );
            Ok(HttpResponse::Ok().json(SaveTestcasesResponse {
                message: format!("{} testcases saved successfully.", count),
                ids,
            }))
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Saving testcases failed: {}", e),
            );
            Err(e)
        }
    }
}

#[get("/testcases")]
async fn list_testcases(
    data: web::Data<HttpState>,
    filter: web::Query<TestcaseFilter>,
) -> Result<HttpResponse, AppError> {
    let testcases = data
        .app_state
        .testcase_use_case
        .list_testcases(filter.api_name.as_deref(), filter.testcase_type.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ListTestcasesResponse { testcases }))
}

#[post("/generate")]
async fn generate_testcase(
    data: web::Data<HttpState>,
    params: web::Query<GenerateParams>,
    req: web::Json<GenerationRequest>,
) -> Result<HttpResponse, AppError> {
    let request = req.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Generating testcase (api_name={} request_type={} testcase_type={})",
            request.api_name, request.request_type, request.testcase_type
        ),
    );

    let outcome = data
        .app_state
        .generation_use_case
        .generate_testcase(request)
        .await?;

    if let GenerationOutcome::Failed {
        error_kind,
        message,
        ..
    } = &outcome
    {
        add_log(
            &data.logs,
            "ERROR",
            "HttpApi",
            &format!("Generation failed ({}): {}", error_kind, message),
        );
        return Ok(HttpResponse::BadGateway().json(GenerateResponse {
            generated_testcase: outcome,
            saved_id: None,
        }));
    }

    let saved_id = if params.persist {
        data.app_state.testcase_use_case.save_outcome(&outcome).await?
    } else {
        None
    };

    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Generation finished with {} outcome", outcome.label()),
    );

    Ok(HttpResponse::Ok().json(GenerateResponse {
        generated_testcase: outcome,
        saved_id,
    }))
}

#[get("/models")]
async fn list_models(data: web::Data<HttpState>) -> impl Responder {
    let config = data.app_state.generation_use_case.invoker().config();

    match data.app_state.llm_client.list_models(config).await {
        Ok(models) => HttpResponse::Ok().json(models),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Failed to list models: {}", e),
            );
            e.error_response()
        }
    }
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> Result<HttpResponse, AppError> {
    ping(&data.app_state.pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    match data.logs.lock() {
        Ok(logs) => HttpResponse::Ok().json(&*logs),
        Err(_) => AppError::Internal("Log buffer is unavailable".to_string()).error_response(),
    }
}

/// Malformed or incomplete bodies are reported like any other validation
/// failure.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(save_testcases)
            .service(list_testcases)
            .service(generate_testcase)
            .service(list_models)
            .service(health)
            .service(get_logs),
    );
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    match level {
        "ERROR" => error!(source, "{}", message),
        "WARN" => warn!(source, "{}", message),
        _ => info!(source, "{}", message),
    }

    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };

    if let Ok(mut logs) = logs.lock() {
        logs.push(entry);
        if logs.len() > MAX_LOG_ENTRIES {
            logs.remove(0);
        }
    }
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { app_state, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(NormalizePath::trim())
            .app_data(state.clone())
            .app_data(json_config())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}
