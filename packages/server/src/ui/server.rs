//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    domain::MemberRegistry,
    usecase::{JoinMemberUseCase, LeaveMemberUseCase, RelayMessageUseCase},
};

use super::{
    handler::{debug_members, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// This struct encapsulates the server's dependencies and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(registry, join_usecase, relay_usecase, leave_usecase);
/// server.run("0.0.0.0".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// MemberRegistry（接続中メンバーの管理）
    registry: Arc<dyn MemberRegistry>,
    /// JoinMemberUseCase（メンバー参加のユースケース）
    join_member_usecase: Arc<JoinMemberUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    relay_message_usecase: Arc<RelayMessageUseCase>,
    /// LeaveMemberUseCase（メンバー退出のユースケース）
    leave_member_usecase: Arc<LeaveMemberUseCase>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry shared with the broadcast dispatcher
    /// * `join_member_usecase` - UseCase for members joining
    /// * `relay_message_usecase` - UseCase for relaying inbound frames
    /// * `leave_member_usecase` - UseCase for members leaving
    pub fn new(
        registry: Arc<dyn MemberRegistry>,
        join_member_usecase: Arc<JoinMemberUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        leave_member_usecase: Arc<LeaveMemberUseCase>,
    ) -> Self {
        Self {
            registry,
            join_member_usecase,
            relay_message_usecase,
            leave_member_usecase,
        }
    }

    /// Build the router with all endpoints
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            registry: self.registry,
            join_member_usecase: self.join_member_usecase,
            relay_message_usecase: self.relay_message_usecase,
            leave_member_usecase: self.leave_member_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/debug/members", get(debug_members))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server until Ctrl+C or SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "0.0.0.0")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            "WebSocket relay server listening on {}",
            listener.local_addr()?
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
