use std::{env, sync::Arc};

use anyhow::Result;
use ledgersum::{
    event::StorageEvent,
    process::process_object,
    store::{gcs::GcsStore, ObjectStore},
};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use warp::{http::StatusCode, reject::Rejection, reply::Reply, Filter};

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "csv-summary-processor"
    })))
}

/// Turn one storage event into the invocation result: 200 with the
/// JSON-encoded summary, 400 for an invalid descriptor, 500 for any
/// pipeline failure with a short fixed body.
async fn run_event<S: ObjectStore>(store: &S, event: StorageEvent) -> (StatusCode, String) {
    match serde_json::to_string(&event) {
        Ok(dump) => info!(event = %dump, "received storage event"),
        Err(e) => info!("could not dump event: {}", e),
    }

    let object = match event.object_ref() {
        Ok(object) => object,
        Err(e) => {
            error!("{}", e);
            return (StatusCode::BAD_REQUEST, e.public_message().to_string());
        }
    };
    info!("triggered by gs://{}/{}", object.bucket, object.key);

    match process_object(store, &object).await {
        Ok(document) => {
            if let Ok(pretty) = serde_json::to_string_pretty(&document.summary) {
                info!("summary:\n{}", pretty);
            }
            let body = serde_json::to_string(&document.summary).unwrap_or_default();
            (StatusCode::OK, body)
        }
        Err(e) => {
            error!("{}", e);
            let status =
                StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, e.public_message().to_string())
        }
    }
}

async fn process_event(
    store: Arc<GcsStore>,
    event: StorageEvent,
) -> Result<impl Reply, Rejection> {
    let (status, body) = run_event(store.as_ref(), event).await;
    Ok(warp::reply::with_status(body, status))
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();

    info!("Starting CSV summary processor service");

    let store = Arc::new(GcsStore::new().await?);
    let store_filter = warp::any().map(move || store.clone());

    let health = warp::path("health").and(warp::get()).and_then(health_check);

    let event = warp::path("event")
        .and(warp::post())
        .and(store_filter)
        .and(warp::body::json())
        .and_then(process_event);

    let routes = health.or(event);

    // Cloud Run style: bind whatever PORT the runtime hands us.
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    info!("Server starting on port {}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Event endpoint: POST http://localhost:{}/event", port);

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgersum::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_health_check() {
        assert!(health_check().await.is_ok());
    }

    #[tokio::test]
    async fn invalid_event_returns_400() {
        let store = MemoryStore::default();
        let event = StorageEvent {
            bucket: None,
            name: Some("a.csv".into()),
        };

        let (status, body) = run_event(&store, event).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid storage event");
    }

    #[tokio::test]
    async fn success_returns_200_with_summary_body() {
        let store = MemoryStore::default();
        store.seed(
            "uploads",
            "statement.csv",
            b"description,category,amount\nsalary,Income,\"1.000,00\"\nrent,Rent,\"-400,00\"\n"
                .to_vec(),
        );
        let event = StorageEvent {
            bucket: Some("uploads".into()),
            name: Some("statement.csv".into()),
        };

        let (status, body) = run_event(&store, event).await;
        assert_eq!(status, StatusCode::OK);

        let summary: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["file"], "statement.csv");
        assert_eq!(summary["total_income"].as_f64(), Some(1000.0));
        assert_eq!(summary["total_expenses"].as_f64(), Some(400.0));
        assert_eq!(summary["net"].as_f64(), Some(600.0));
    }

    #[tokio::test]
    async fn row_failure_returns_500() {
        let store = MemoryStore::default();
        store.seed(
            "uploads",
            "bad.csv",
            b"description,category,amount\na,b,1,EXTRA\n".to_vec(),
        );
        let event = StorageEvent {
            bucket: Some("uploads".into()),
            name: Some("bad.csv".into()),
        };

        let (status, body) = run_event(&store, event).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error processing CSV rows");
        assert!(store
            .get("uploads", "processed/errors/bad.csv.error.txt")
            .is_some());
    }

    #[tokio::test]
    async fn missing_object_returns_500() {
        let store = MemoryStore::default();
        let event = StorageEvent {
            bucket: Some("uploads".into()),
            name: Some("ghost.csv".into()),
        };

        let (status, body) = run_event(&store, event).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error reading source object");
    }
}
