//! Realtime change-feed client.
//!
//! One WebSocket connection carries all subscriptions; each subscription is a
//! named topic bound to a single equality filter and receives INSERT
//! notifications only. Notifications carry the row id alone — the data layer
//! re-fetches the joined row before merging it into the query cache.

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use uuid::Uuid;

use conecta_protocol::{ChangeFilter, ClientEvent, ServerEvent};

/// Insert notification delivered to a subscription's owner
#[derive(Debug, Clone)]
pub struct RowInserted {
    pub table: String,
    pub row_id: Uuid,
}

/// Owned by the subscribing screen; dropping the receiver ends the
/// corresponding sync loop.
pub struct RealtimeSubscription {
    pub topic: String,
    pub events: mpsc::Receiver<RowInserted>,
}

type Routes = Arc<RwLock<HashMap<String, mpsc::Sender<RowInserted>>>>;

pub struct RealtimeClient {
    sender: mpsc::Sender<ClientEvent>,
    routes: Routes,
}

impl RealtimeClient {
    pub async fn connect(url: &str, token: &str) -> Result<Self> {
        let (ws_stream, _) = connect_async(url).await?;

        let (mut write, mut read) = ws_stream.split();

        let (tx, mut rx) = mpsc::channel::<ClientEvent>(100);

        // Authenticate
        let auth = ClientEvent::Authenticate {
            token: token.to_string(),
        };
        let json = serde_json::to_string(&auth)?;
        write.send(WsMessage::Text(json.into())).await?;

        // Wait for the authentication response
        if let Some(Ok(WsMessage::Text(text))) = read.next().await {
            let response: ServerEvent = serde_json::from_str(&text)?;
            match response {
                ServerEvent::Authenticated { connection_id } => {
                    tracing::info!("realtime authenticated, connection {}", connection_id);
                }
                ServerEvent::Error { message } => {
                    anyhow::bail!("realtime authentication failed: {}", message);
                }
                _ => {
                    anyhow::bail!("unexpected response during realtime authentication");
                }
            }
        } else {
            anyhow::bail!("connection closed during realtime authentication");
        }

        let routes: Routes = Arc::new(RwLock::new(HashMap::new()));

        // Outgoing messages
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::error!("failed to serialize realtime event: {}", e);
                        continue;
                    }
                };

                if write.send(WsMessage::Text(json.into())).await.is_err() {
                    tracing::error!("failed to send realtime event");
                    break;
                }
            }
        });

        // Incoming messages
        let routes_clone = routes.clone();
        tokio::spawn(async move {
            while let Some(result) = read.next().await {
                match result {
                    Ok(WsMessage::Text(text)) => {
                        if let Ok(event) = serde_json::from_str::<ServerEvent>(&text) {
                            dispatch(&routes_clone, event).await;
                        }
                    }
                    Ok(WsMessage::Close(_)) => {
                        tracing::info!("realtime connection closed by server");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("realtime connection error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            // Drop every route so subscription receivers observe the close
            routes_clone.write().await.clear();
        });

        // Keep-alive pings
        let tx_ping = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
            loop {
                interval.tick().await;
                if tx_ping.send(ClientEvent::Ping).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self { sender: tx, routes })
    }

    /// Open a subscription. A topic already in use is replaced; the previous
    /// receiver observes a closed channel.
    pub async fn subscribe(
        &self,
        topic: &str,
        filter: ChangeFilter,
    ) -> Result<RealtimeSubscription> {
        let (tx, rx) = mpsc::channel(64);
        self.routes.write().await.insert(topic.to_string(), tx);

        self.sender
            .send(ClientEvent::Subscribe {
                topic: topic.to_string(),
                filter,
            })
            .await
            .map_err(|_| anyhow::anyhow!("realtime connection is gone"))?;

        Ok(RealtimeSubscription {
            topic: topic.to_string(),
            events: rx,
        })
    }

    pub async fn unsubscribe(&self, topic: &str) {
        self.routes.write().await.remove(topic);
        let _ = self
            .sender
            .send(ClientEvent::Unsubscribe {
                topic: topic.to_string(),
            })
            .await;
    }
}

async fn dispatch(routes: &Routes, event: ServerEvent) {
    match event {
        ServerEvent::RowInserted {
            topic,
            table,
            row_id,
        } => {
            let sender = routes.read().await.get(&topic).cloned();
            if let Some(tx) = sender {
                if tx.send(RowInserted { table, row_id }).await.is_err() {
                    // Receiver was dropped without unsubscribing
                    routes.write().await.remove(&topic);
                }
            }
        }
        ServerEvent::Subscribed { topic } => {
            tracing::debug!("subscribed to {}", topic);
        }
        ServerEvent::Error { message } => {
            tracing::error!("realtime error: {}", message);
        }
        ServerEvent::Pong | ServerEvent::Authenticated { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_routes_inserts_to_their_topic() {
        let routes: Routes = Arc::new(RwLock::new(HashMap::new()));
        let (tx, mut rx) = mpsc::channel(4);
        routes.write().await.insert("thread:1".to_string(), tx);

        let id = Uuid::new_v4();
        dispatch(
            &routes,
            ServerEvent::RowInserted {
                topic: "thread:1".into(),
                table: "messages".into(),
                row_id: id,
            },
        )
        .await;

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event.row_id, id);
        assert_eq!(event.table, "messages");
    }

    #[tokio::test]
    async fn dispatch_ignores_unknown_topics() {
        let routes: Routes = Arc::new(RwLock::new(HashMap::new()));
        dispatch(
            &routes,
            ServerEvent::RowInserted {
                topic: "nobody".into(),
                table: "messages".into(),
                row_id: Uuid::new_v4(),
            },
        )
        .await;
    }

    #[tokio::test]
    async fn dispatch_drops_routes_with_dead_receivers() {
        let routes: Routes = Arc::new(RwLock::new(HashMap::new()));
        let (tx, rx) = mpsc::channel(4);
        routes.write().await.insert("thread:2".to_string(), tx);
        drop(rx);

        dispatch(
            &routes,
            ServerEvent::RowInserted {
                topic: "thread:2".into(),
                table: "messages".into(),
                row_id: Uuid::new_v4(),
            },
        )
        .await;

        assert!(routes.read().await.is_empty());
    }
}
