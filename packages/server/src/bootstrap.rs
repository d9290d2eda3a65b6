//! Dependency wiring.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::{MemberRegistry, OutboundQueue},
    infrastructure::{
        dispatcher::{BroadcastDispatcher, dispatch_channel},
        registry::InMemoryMemberRegistry,
    },
    ui::Server,
    usecase::{JoinMemberUseCase, LeaveMemberUseCase, RelayMessageUseCase},
};

/// Wire the registry, dispatcher, use cases and server for `config`.
///
/// The dispatcher is returned unstarted; the caller spawns
/// [`BroadcastDispatcher::run`] before serving.
pub fn bootstrap(config: &ServerConfig) -> (Server, BroadcastDispatcher) {
    // Initialize dependencies in order:
    // 1. Registry
    // 2. Dispatcher (queue + worker)
    // 3. UseCases
    // 4. Server

    // 1. Create Registry (in-memory)
    let registry: Arc<dyn MemberRegistry> = Arc::new(InMemoryMemberRegistry::new());

    // 2. Create Dispatcher sharing the registry
    let (queue, dispatcher) = dispatch_channel(registry.clone(), config.dispatcher);
    let queue: Arc<dyn OutboundQueue> = Arc::new(queue);

    // 3. Create UseCases
    let join_member_usecase = Arc::new(JoinMemberUseCase::new(registry.clone(), queue.clone()));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        queue.clone(),
        config.payload_mode,
    ));
    let leave_member_usecase = Arc::new(LeaveMemberUseCase::new(registry.clone(), queue));

    // 4. Create the server
    let server = Server::new(
        registry,
        join_member_usecase,
        relay_message_usecase,
        leave_member_usecase,
    );

    (server, dispatcher)
}
