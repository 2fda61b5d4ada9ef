//! Full session and CRUD lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `SessionContext`
//! over real HTTP through `UreqTransport`. Validates header attachment,
//! status mapping and the session-clearing policy end to end.

use std::net::SocketAddr;

use catalog_core::{
    ApiClient, ApiError, Credentials, FileSessionStore, ItemPayload, MemorySessionStore,
    Operation, SessionContext, SessionStore, UreqTransport,
};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn context<S: SessionStore>(addr: SocketAddr, store: S) -> SessionContext<S, UreqTransport> {
    SessionContext::new(
        ApiClient::new(&format!("http://{addr}")),
        store,
        UreqTransport::new(),
    )
}

#[test]
fn session_and_crud_lifecycle() {
    let addr = start_server();
    let ctx = context(addr, MemorySessionStore::new());
    let creds = Credentials::new("owner@example.com", "secret");

    // Step 1: no token yet, the server rejects the list.
    let err = ctx.list_items().unwrap_err();
    assert!(err.is_unauthorized());

    // Step 2: register, then the same email again surfaces the detail verbatim.
    let user = ctx.register(&creds).unwrap();
    assert_eq!(user.email, "owner@example.com");
    let err = ctx.register(&creds).unwrap_err();
    assert!(matches!(&err, ApiError::ValidationFailed(m) if m == "Email already registered"));

    // Step 3: bad password keeps us logged out.
    let err = ctx
        .login(&Credentials::new("owner@example.com", "wrong"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!ctx.is_logged_in());

    // Step 4: login stores the token.
    ctx.login(&creds).unwrap();
    assert!(ctx.require_session().is_ok());
    assert!(ctx.list_items().unwrap().is_empty());

    // Step 5: create, then list includes it.
    let created = ctx.create_item(&ItemPayload::new("Widget", "")).unwrap();
    assert_eq!(created.name, "Widget");
    let items = ctx.list_items().unwrap();
    assert!(items.iter().any(|i| i.name == "Widget"));

    // Step 6: update, then list reflects it.
    let updated = ctx
        .update_item(created.id, &ItemPayload::new("New", "D"))
        .unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(updated.description.as_deref(), Some("D"));
    assert_eq!(ctx.get_item(created.id).unwrap(), updated);
    let items = ctx.list_items().unwrap();
    assert_eq!(items, vec![updated]);

    // Step 7: delete, then the id is gone.
    let deleted = ctx.delete_item(created.id).unwrap();
    assert_eq!(deleted.map(|i| i.id), Some(created.id));
    assert!(ctx.list_items().unwrap().iter().all(|i| i.id != created.id));

    // Step 8: repeated delete and update of a missing id fail.
    let err = ctx.delete_item(created.id).unwrap_err();
    assert!(matches!(
        err,
        ApiError::NotFound {
            operation: Operation::DeleteItem
        }
    ));
    let err = ctx
        .update_item(created.id, &ItemPayload::new("Again", ""))
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to update item");

    // Step 9: logout, then item calls are unauthorized.
    ctx.logout().unwrap();
    assert!(ctx.require_session().unwrap_err().is_unauthorized());
    assert!(ctx.list_items().unwrap_err().is_unauthorized());
}

#[test]
fn rejected_token_is_cleared_from_the_store() {
    let addr = start_server();
    let ctx = context(addr, MemorySessionStore::with_token("forged"));

    let err = ctx.create_item(&ItemPayload::new("Widget", "")).unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(ctx.store().get(), None);
}

#[test]
fn file_store_session_survives_a_new_context() {
    let addr = start_server();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("access_token");
    let creds = Credentials::new("file@example.com", "secret");

    let first = context(addr, FileSessionStore::new(&path));
    first.register(&creds).unwrap();
    first.login(&creds).unwrap();
    first.create_item(&ItemPayload::new("Persisted", "")).unwrap();

    let second = context(addr, FileSessionStore::new(&path));
    assert!(second.is_logged_in());
    let items = second.list_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Persisted");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let ctx = context(addr, MemorySessionStore::with_token("abc123"));

    assert!(matches!(ctx.list_items(), Err(ApiError::Transport(_))));
    assert!(ctx.is_logged_in());
}
