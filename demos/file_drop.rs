//! In-process walkthrough of the room lifecycle
//!
//! Run with: cargo run --example file_drop
//!
//! Simulates two clients sharing a file through a room: create, join, upload,
//! download, then both disconnect and the room is reaped. Events each client
//! would receive over its transport are printed as the JSON that a WebSocket
//! adapter would forward.

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedReceiver;

use roomdrop::{MemoryBlobStore, RoomEvent, RoomService};

fn print_events(who: &str, rx: &mut UnboundedReceiver<RoomEvent>) {
    while let Ok(event) = rx.try_recv() {
        println!("  {} <- {}", who, serde_json::to_string(&event).unwrap());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("roomdrop=debug".parse()?),
        )
        .init();

    let service = RoomService::new(MemoryBlobStore::new());

    println!("=== Create a room ===");
    let code = service.create_room().await;
    println!("  room code: {}", code);
    println!();

    println!("=== Alice and Bob join ===");
    let (alice, mut alice_rx) = service.connect().await;
    let (bob, mut bob_rx) = service.connect().await;
    service.join_as(alice, code.as_str(), "alice").await?;
    service.join_as(bob, code.as_str(), "bob").await?;
    print_events("alice", &mut alice_rx);
    print_events("bob", &mut bob_rx);
    println!();

    println!("=== Alice uploads a file ===");
    let record = service
        .upload(code.as_str(), "notes.txt", Bytes::from_static(b"meet at noon"))
        .await?;
    print_events("alice", &mut alice_rx);
    print_events("bob", &mut bob_rx);
    println!();

    println!("=== Bob downloads it ===");
    let bytes = service.download(&record.storage_key).await?;
    println!("  {} -> {:?}", record.storage_key, String::from_utf8_lossy(&bytes));
    println!();

    println!("=== Everyone leaves ===");
    service.disconnect(bob).await;
    print_events("alice", &mut alice_rx);
    service.disconnect(alice).await;

    println!(
        "  rooms left: {}, room {} exists: {}",
        service.registry().room_count().await,
        code,
        service.registry().room_exists(&code).await,
    );

    Ok(())
}
