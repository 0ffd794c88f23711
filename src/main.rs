use axum::Router;
use inkpress::core::auth::{AuthApiState, AuthService, auth_api_router, session_middleware};
use inkpress::core::comments::{CommentService, CommentsApiState, comments_api_router};
use inkpress::core::config::Config;
use inkpress::core::db::pool::{DbConfig, create_pool_with_migrations};
use inkpress::core::db::repositories::{
    CommentRepository, CommentVoteRepository, PostLikeRepository, PostRepository,
    SessionRepository, UserRepository,
};
use inkpress::core::posts::{PostService, PostsApiState, posts_api_router};
use std::time::Duration;
use tower_http::compression::{CompressionLayer, CompressionLevel};

/// How often the expired-session sweep runs
const SESSION_SWEEP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load application config from environment variables
    let config = Config::from_env();

    tracing::info!("Config loaded: database={}", config.has_database());

    let db_config = DbConfig::new(config.database_url_or_panic());
    let pool = create_pool_with_migrations(&db_config)
        .await
        .expect("Failed to connect to database");

    let session_repo = SessionRepository::new(pool.clone());
    let auth_service = AuthService::new(UserRepository::new(pool.clone()), session_repo.clone());
    let comment_service = CommentService::new(
        CommentRepository::new(pool.clone()),
        CommentVoteRepository::new(pool.clone()),
    );
    let post_service = PostService::new(
        PostRepository::new(pool.clone()),
        PostLikeRepository::new(pool.clone()),
    );

    // Expired sessions are dropped during validation anyway; the sweep
    // just keeps rows for long-absent clients from piling up.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match session_repo.cleanup_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Removed {} expired sessions", removed),
                Err(e) => tracing::error!("Session sweep failed: {}", e),
            }
        }
    });

    // Every route sits behind the session middleware so handlers can
    // pick up the validated identity from request extensions.
    let app = Router::new()
        .merge(auth_api_router(AuthApiState {
            auth_service: auth_service.clone(),
        }))
        .merge(comments_api_router(CommentsApiState { comment_service }))
        .merge(posts_api_router(PostsApiState { post_service }))
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            session_middleware,
        ))
        .layer(
            CompressionLayer::new()
                .br(true)
                .gzip(true)
                .quality(CompressionLevel::Best),
        );

    let addr = config.listen_addr_or_default();
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
