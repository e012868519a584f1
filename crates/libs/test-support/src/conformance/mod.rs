use crate::RecordingTransport;
use std::sync::Arc;
use td_client::{Client, ClientConfig, UpdatePump};

mod session_tests;

struct Session {
    transport: Arc<RecordingTransport>,
    client: Client<Arc<RecordingTransport>>,
    pump: UpdatePump,
}

impl Session {
    fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    fn with_config(config: ClientConfig) -> Self {
        let transport = Arc::new(RecordingTransport::new());
        let client = Client::new(Arc::clone(&transport), config).expect("client");
        let (_tx, rx) = client.inbound_channel();
        let pump = client.pump(rx).expect("pump");
        Self { transport, client, pump }
    }

    fn feed(&mut self, value: serde_json::Value) {
        self.pump.process(value).expect("pump accepts inbound object");
    }
}
