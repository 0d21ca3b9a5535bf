//! High-level async client: one [`Rpc`] engine per endpoint behind a
//! shared handle, driven by a tokio task per connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, mpsc};

use mtp_tl::{Blob, Deserializable, RemoteCall, Serializable, enums, functions};

use crate::errors::InvocationError;
use crate::rpc::{Rpc, ServerEvent};
use crate::storage::{self, Storage};
use crate::transport::{Transport, TransportEvent};

/// Schema layer spoken by this client.
pub const LAYER: i32 = 158;

/// Client-identification fields attached to every call.
#[derive(Clone, Debug)]
pub struct ConnectionParams {
    /// Application identifier issued by the server operator.
    pub api_id: i32,
    /// Device model string.
    pub device_model: String,
    /// Operating system version string.
    pub system_version: String,
    /// Application version string.
    pub app_version: String,
    /// System language, e.g. `"en"`.
    pub system_lang_code: String,
    /// Language pack identifier.
    pub lang_pack: String,
    /// Language code.
    pub lang_code: String,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            api_id: 0,
            device_model: "unknown".into(),
            system_version: "1.0".into(),
            app_version: env!("CARGO_PKG_VERSION").into(),
            system_lang_code: "en".into(),
            lang_pack: String::new(),
            lang_code: "en".into(),
        }
    }
}

/// Multiplexes RPC traffic over one engine per endpoint.
///
/// Cheap to clone; all clones share the same engines and storage.
#[derive(Clone)]
pub struct Client {
    storage: Arc<dyn Storage>,
    params: Arc<StdMutex<ConnectionParams>>,
    endpoints: Arc<Mutex<HashMap<i32, Arc<Mutex<Rpc>>>>>,
}

impl Client {
    /// Create a client persisting its session state in `storage`.
    pub fn new(storage: Arc<dyn Storage>, params: ConnectionParams) -> Self {
        Self {
            storage,
            params: Arc::new(StdMutex::new(params)),
            endpoints: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Attach a transport for `endpoint_id` and start driving it.
    ///
    /// `transport_events` is the inbound half produced by the transport
    /// implementation; the returned receiver carries server pushes.
    /// Must be called from within a tokio runtime.
    pub async fn connect(
        &self,
        endpoint_id: i32,
        transport: Box<dyn Transport>,
        transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (rpc, events) = Rpc::new(endpoint_id, Arc::clone(&self.storage), transport);
        let rpc = Arc::new(Mutex::new(rpc));
        self.endpoints.lock().await.insert(endpoint_id, Arc::clone(&rpc));
        tokio::spawn(drive(rpc, transport_events));
        events
    }

    /// Invoke an RPC on the default endpoint.
    pub async fn invoke<R: RemoteCall>(&self, request: &R) -> Result<R::Return, InvocationError> {
        let endpoint_id = self.default_endpoint_id().await;
        self.invoke_on(endpoint_id, request).await
    }

    /// Invoke an RPC on a specific endpoint.
    ///
    /// Every call is wrapped in the client-identification envelope
    /// (`initConnection` inside `invokeWithLayer`), as the server expects
    /// on any connection.
    pub async fn invoke_on<R: RemoteCall>(
        &self,
        endpoint_id: i32,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        let body = self.wrap(request);
        let bytes = self.call_on(endpoint_id, body).await?;
        R::Return::from_bytes(&bytes).map_err(Into::into)
    }

    /// Send a pre-serialized body on a specific endpoint and await the raw
    /// response bytes.
    pub async fn call_on(
        &self,
        endpoint_id: i32,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, InvocationError> {
        let rpc = self
            .endpoints
            .lock()
            .await
            .get(&endpoint_id)
            .cloned()
            .ok_or(InvocationError::Dropped)?;
        let receiver = rpc.lock().await.call(body);
        receiver.await.map_err(|_| InvocationError::Dropped)?
    }

    fn wrap<R: RemoteCall>(&self, request: &R) -> Vec<u8> {
        let params = self.params.lock().unwrap().clone();
        functions::InvokeWithLayer {
            layer: LAYER,
            query: functions::InitConnection {
                api_id: params.api_id,
                device_model: params.device_model,
                system_version: params.system_version,
                app_version: params.app_version,
                system_lang_code: params.system_lang_code,
                lang_pack: params.lang_pack,
                lang_code: params.lang_code,
                query: Blob(request.to_bytes()),
            },
        }
        .to_bytes()
    }

    /// Replace the client-identification fields used on subsequent calls.
    pub fn update_connection_params(&self, params: ConnectionParams) {
        *self.params.lock().unwrap() = params;
    }

    /// Which endpoint `invoke` targets.
    pub async fn default_endpoint_id(&self) -> i32 {
        self.storage
            .get(storage::DEFAULT_ENDPOINT_KEY)
            .and_then(|v| v.try_into().ok())
            .map(i32::from_le_bytes)
            .unwrap_or(2)
    }

    /// Change and persist the default endpoint.
    pub fn set_default_endpoint(&self, endpoint_id: i32) {
        self.storage
            .set(storage::DEFAULT_ENDPOINT_KEY, endpoint_id.to_le_bytes().to_vec());
    }

    /// Copy the default endpoint's authorization to every other connected
    /// endpoint by issuing ordinary export/import calls.
    pub async fn sync_authorization(&self) -> Result<(), InvocationError> {
        let default_id = self.default_endpoint_id().await;
        let others: Vec<i32> = {
            let endpoints = self.endpoints.lock().await;
            endpoints.keys().copied().filter(|&id| id != default_id).collect()
        };
        for id in others {
            let enums::ExportedAuthorization::ExportedAuthorization(auth) = self
                .invoke_on(default_id, &functions::ExportAuthorization { dc_id: id })
                .await?;
            self.invoke_on(id, &functions::ImportAuthorization { id: auth.id, bytes: auth.bytes })
                .await?;
        }
        Ok(())
    }
}

/// Owns one engine: feeds it transport events and fires its ack deadline.
async fn drive(rpc: Arc<Mutex<Rpc>>, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
    loop {
        let deadline = rpc.lock().await.ack_deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => rpc.lock().await.handle_event(event),
                None => {
                    rpc.lock().await.teardown();
                    break;
                }
            },
            _ = async {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at.into()).await,
                    None => std::future::pending::<()>().await,
                }
            } => rpc.lock().await.flush_acks(),
        }
    }
}
