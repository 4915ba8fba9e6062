//! Fakes shared by the unit tests of this crate

use crate::device::Device;
use crate::repository::DeviceRepository;
use crate::session::{Connector, SessionCredentials};
use async_trait::async_trait;
use dlms_client::{
    AttributeAddress, Connection, DeviceSession, GetResult, MethodParameter, MethodResult, SetParameter,
};
use dlms_core::{AccessResultCode, DataObject, DlmsError, DlmsResult, MethodResultCode, ObisCode};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

type AddressKey = (u16, ObisCode, i8);

fn key(address: &AttributeAddress) -> AddressKey {
    (address.class_id, address.instance_id, address.attribute_id)
}

fn connection_lost() -> DlmsError {
    DlmsError::Connection(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by device"))
}

#[derive(Default)]
struct FakeState {
    responses: HashMap<AddressKey, GetResult>,
    set_results: HashMap<AddressKey, AccessResultCode>,
    action_results: VecDeque<MethodResult>,
    reads: Vec<AttributeAddress>,
    batched_reads: usize,
    truncate_batched_to: Option<usize>,
    writes: Vec<SetParameter>,
    actions: Vec<MethodParameter>,
    authentication_keys: Vec<Vec<u8>>,
    encryption_keys: Vec<Vec<u8>>,
    lost: bool,
    closed: bool,
}

/// Scripted device: answers from a table and records every request
#[derive(Clone, Default)]
pub struct FakeConnection {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> DeviceSession {
        DeviceSession::new(Box::new(self.clone()))
    }

    pub fn respond(&self, address: &AttributeAddress, data: DataObject) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(key(address), GetResult::success(data));
    }

    pub fn respond_with_code(&self, address: &AttributeAddress, code: AccessResultCode) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(key(address), GetResult::failure(code));
    }

    pub fn set_result(&self, address: &AttributeAddress, code: AccessResultCode) {
        self.state.lock().unwrap().set_results.insert(key(address), code);
    }

    pub fn push_action_result(&self, code: MethodResultCode) {
        self.state
            .lock()
            .unwrap()
            .action_results
            .push_back(MethodResult::new(code, None));
    }

    pub fn truncate_batched_results(&self, len: usize) {
        self.state.lock().unwrap().truncate_batched_to = Some(len);
    }

    /// Every following request fails with a connection error
    pub fn lose_connection(&self) {
        self.state.lock().unwrap().lost = true;
    }

    pub fn reads(&self) -> Vec<AttributeAddress> {
        self.state.lock().unwrap().reads.clone()
    }

    pub fn batched_reads(&self) -> usize {
        self.state.lock().unwrap().batched_reads
    }

    pub fn writes(&self) -> Vec<SetParameter> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn actions(&self) -> Vec<MethodParameter> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn authentication_keys(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().authentication_keys.clone()
    }

    pub fn encryption_keys(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().encryption_keys.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn read(state: &mut FakeState, address: &AttributeAddress) -> GetResult {
        state.reads.push(address.clone());
        state
            .responses
            .get(&key(address))
            .cloned()
            .unwrap_or_else(|| GetResult::failure(AccessResultCode::ObjectUndefined))
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn get(&mut self, address: &AttributeAddress) -> DlmsResult<GetResult> {
        let mut state = self.state.lock().unwrap();
        if state.lost {
            return Err(connection_lost());
        }
        Ok(Self::read(&mut state, address))
    }

    async fn get_with_list(&mut self, addresses: &[AttributeAddress]) -> DlmsResult<Vec<GetResult>> {
        let mut state = self.state.lock().unwrap();
        if state.lost {
            return Err(connection_lost());
        }
        state.batched_reads += 1;
        let mut results: Vec<GetResult> = addresses
            .iter()
            .map(|address| Self::read(&mut state, address))
            .collect();
        if let Some(len) = state.truncate_batched_to {
            results.truncate(len);
        }
        Ok(results)
    }

    async fn set(&mut self, parameter: &SetParameter) -> DlmsResult<AccessResultCode> {
        let mut state = self.state.lock().unwrap();
        if state.lost {
            return Err(connection_lost());
        }
        state.writes.push(parameter.clone());
        Ok(state
            .set_results
            .get(&key(&parameter.attribute_address))
            .copied()
            .unwrap_or(AccessResultCode::Success))
    }

    async fn action(&mut self, parameter: &MethodParameter) -> DlmsResult<MethodResult> {
        let mut state = self.state.lock().unwrap();
        if state.lost {
            return Err(connection_lost());
        }
        state.actions.push(parameter.clone());
        Ok(state
            .action_results
            .pop_front()
            .unwrap_or_else(|| MethodResult::new(MethodResultCode::Success, None)))
    }

    fn change_client_global_authentication_key(&mut self, key: &[u8]) -> DlmsResult<()> {
        self.state.lock().unwrap().authentication_keys.push(key.to_vec());
        Ok(())
    }

    fn change_client_global_encryption_key(&mut self, key: &[u8]) -> DlmsResult<()> {
        self.state.lock().unwrap().encryption_keys.push(key.to_vec());
        Ok(())
    }

    async fn close(&mut self) -> DlmsResult<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Repository keeping devices in memory
#[derive(Default)]
pub struct InMemoryDeviceRepository {
    devices: Mutex<HashMap<String, Device>>,
    saves: Mutex<usize>,
}

impl InMemoryDeviceRepository {
    pub fn with_device(device: Device) -> Self {
        let repository = Self::default();
        repository
            .devices
            .lock()
            .unwrap()
            .insert(device.device_identification.clone(), device);
        repository
    }

    pub fn device(&self, device_identification: &str) -> Option<Device> {
        self.devices.lock().unwrap().get(device_identification).cloned()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn load_device(&self, device_identification: &str) -> DlmsResult<Device> {
        self.device(device_identification).ok_or_else(|| {
            DlmsError::Configuration(format!("Unknown device {}", device_identification))
        })
    }

    async fn save(&self, device: &Device) -> DlmsResult<Device> {
        *self.saves.lock().unwrap() += 1;
        self.devices
            .lock()
            .unwrap()
            .insert(device.device_identification.clone(), device.clone());
        Ok(device.clone())
    }
}

/// Connector accepting only sessions authenticated with known key material
pub struct FakeConnector {
    connection: FakeConnection,
    accepted_authentication_keys: Mutex<Vec<String>>,
    attempts: Mutex<Vec<SessionCredentials>>,
}

impl FakeConnector {
    pub fn new(connection: FakeConnection, accepted_authentication_key: &str) -> Self {
        Self {
            connection,
            accepted_authentication_keys: Mutex::new(vec![accepted_authentication_key.to_string()]),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn accept(&self, authentication_key: &str) {
        self.accepted_authentication_keys
            .lock()
            .unwrap()
            .push(authentication_key.to_string());
    }

    /// Reject every key but `authentication_key` from now on
    pub fn accept_only(&self, authentication_key: &str) {
        *self.accepted_authentication_keys.lock().unwrap() = vec![authentication_key.to_string()];
    }

    pub fn attempts(&self) -> Vec<SessionCredentials> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _device: &Device, credentials: &SessionCredentials) -> DlmsResult<Box<dyn Connection>> {
        self.attempts.lock().unwrap().push(credentials.clone());
        let accepted = self
            .accepted_authentication_keys
            .lock()
            .unwrap()
            .contains(&credentials.authentication_key.key);
        if accepted {
            Ok(Box::new(self.connection.clone()))
        } else {
            Err(connection_lost())
        }
    }
}
