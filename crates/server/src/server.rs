use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{deferred, expense_types, funds, ledger, projects, transactions, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/projects", post(projects::create).get(projects::list))
        .route("/projects/{id}/archive", post(projects::archive))
        .route(
            "/transactions",
            post(transactions::record).get(transactions::list),
        )
        .route("/transactions/{id}", delete(transactions::remove))
        .route(
            "/expenseTypes",
            post(expense_types::create).get(expense_types::list),
        )
        .route("/expenseTypes/{id}", patch(expense_types::update))
        .route(
            "/deferredPayments",
            post(deferred::create).get(deferred::list),
        )
        .route("/deferredPayments/{id}", get(deferred::detail))
        .route("/deferredPayments/{id}/pay", post(deferred::pay))
        .route(
            "/ledger/transferReceivables",
            post(ledger::transfer_receivables),
        )
        .route(
            "/ledger/reclassifyTransactions",
            post(ledger::reclassify),
        )
        .route("/ledger/summary", get(ledger::summary))
        .route(
            "/ledger/beneficiaries/{name}",
            get(ledger::beneficiary_statement),
        )
        .route("/adminFunds", get(funds::get_balance))
        .route("/adminFunds/deposit", post(funds::deposit))
        .route("/balances/recompute", post(funds::recompute))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header};
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Statement};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn state_with_users() -> ServerState {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let backend = db.get_database_backend();
        for (username, role) in [("alice", "admin"), ("basem", "accountant")] {
            db.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
                vec![username.into(), "password".into(), role.into()],
            ))
            .await
            .unwrap();
        }

        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();
        ServerState {
            engine: Arc::new(engine),
            db,
        }
    }

    fn basic_auth(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }

    fn request(method: &str, uri: &str, user: &str, body: Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, basic_auth(user, "password"))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rejects_missing_or_wrong_credentials() {
        let state = state_with_users().await;

        let no_auth = HttpRequest::builder()
            .method("GET")
            .uri("/adminFunds")
            .body(Body::empty())
            .unwrap();
        let res = router(state.clone()).oneshot(no_auth).await.unwrap();
        assert!(res.status().is_client_error());

        let wrong = HttpRequest::builder()
            .method("GET")
            .uri("/adminFunds")
            .header(header::AUTHORIZATION, basic_auth("alice", "wrong"))
            .body(Body::empty())
            .unwrap();
        let res = router(state).oneshot(wrong).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deposit_requires_admin_role() {
        let state = state_with_users().await;
        let payload = json!({
            "amount_minor": 1_000_000,
            "occurred_at": Utc::now().to_rfc3339(),
        });

        let res = router(state.clone())
            .oneshot(request("POST", "/adminFunds/deposit", "basem", payload.clone()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = router(state)
            .oneshot(request("POST", "/adminFunds/deposit", "alice", payload))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn records_transaction_and_returns_updated_balances() {
        let state = state_with_users().await;

        let res = router(state.clone())
            .oneshot(request(
                "POST",
                "/adminFunds/deposit",
                "alice",
                json!({
                    "amount_minor": 1_000_000,
                    "occurred_at": Utc::now().to_rfc3339(),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = router(state.clone())
            .oneshot(request(
                "POST",
                "/projects",
                "alice",
                json!({ "name": "Project A" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let project = body_json(res).await;
        let project_id = project["id"].as_str().unwrap().to_string();

        let res = router(state.clone())
            .oneshot(request(
                "POST",
                "/transactions",
                "basem",
                json!({
                    "kind": "income",
                    "project_id": project_id,
                    "amount_minor": 200_000,
                    "description": "initial funding",
                    "occurred_at": Utc::now().to_rfc3339(),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let recorded = body_json(res).await;
        assert_eq!(
            recorded["updated_balances"]["admin_balance_minor"].as_i64(),
            Some(800_000)
        );
        assert_eq!(
            recorded["updated_balances"]["project"]["balance_minor"].as_i64(),
            Some(200_000)
        );

        // Spending more than the project holds surfaces as a validation error.
        let res = router(state)
            .oneshot(request(
                "POST",
                "/transactions",
                "basem",
                json!({
                    "kind": "expense",
                    "project_id": recorded["transaction"]["project_id"],
                    "amount_minor": 300_000,
                    "description": "overrun",
                    "occurred_at": Utc::now().to_rfc3339(),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
