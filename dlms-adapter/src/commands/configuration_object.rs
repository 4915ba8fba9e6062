//! Configuration object `{1, 0-1:94.31.3.255}`
//!
//! Attribute 2 is a structure of the GPRS operation mode and a 16-bit flag
//! string. A write changes only what the request names: flags absent from
//! the request keep their value on the device, and so does the mode.
//! Flags selecting the security level of ports cannot be changed through
//! this command and are ignored when requested.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{describe_attributes, describe_value, read_bit_string, read_list, read_long};
use crate::command::{check_access_result, get_and_check, unexpected_request, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession, SetParameter};
use dlms_core::{AccessResultCode, BitString, DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

const CLASS_ID: u16 = 1;
const OBIS_CODE: ObisCode = ObisCode::new(0, 1, 94, 31, 3, 255);
const ATTRIBUTE_ID: i8 = 2;
const FLAG_BITS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GprsOperationMode {
    AlwaysOn,
    Triggered,
}

impl GprsOperationMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(GprsOperationMode::AlwaysOn),
            2 => Some(GprsOperationMode::Triggered),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            GprsOperationMode::AlwaysOn => 1,
            GprsOperationMode::Triggered => 2,
        }
    }
}

/// Flags of the configuration object, in bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationFlagType {
    DiscoverOnOpenCover,
    DiscoverOnPowerOn,
    DynamicMbusAddress,
    PoEnable,
    Hls3OnP3Enable,
    Hls4OnP3Enable,
    Hls5OnP3Enable,
    Hls3OnPoEnable,
    Hls4OnPoEnable,
    Hls5OnPoEnable,
}

impl ConfigurationFlagType {
    pub const ALL: [ConfigurationFlagType; 10] = [
        ConfigurationFlagType::DiscoverOnOpenCover,
        ConfigurationFlagType::DiscoverOnPowerOn,
        ConfigurationFlagType::DynamicMbusAddress,
        ConfigurationFlagType::PoEnable,
        ConfigurationFlagType::Hls3OnP3Enable,
        ConfigurationFlagType::Hls4OnP3Enable,
        ConfigurationFlagType::Hls5OnP3Enable,
        ConfigurationFlagType::Hls3OnPoEnable,
        ConfigurationFlagType::Hls4OnPoEnable,
        ConfigurationFlagType::Hls5OnPoEnable,
    ];

    /// Position in the flag string, most significant bit first
    pub fn bit_position(&self) -> usize {
        *self as usize
    }

    /// Whether a write may change this flag
    pub fn is_settable(&self) -> bool {
        matches!(
            self,
            ConfigurationFlagType::DiscoverOnOpenCover
                | ConfigurationFlagType::DiscoverOnPowerOn
                | ConfigurationFlagType::DynamicMbusAddress
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationFlag {
    pub flag_type: ConfigurationFlagType,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationObject {
    pub gprs_operation_mode: Option<GprsOperationMode>,
    pub flags: Vec<ConfigurationFlag>,
}

impl ConfigurationObject {
    fn flag(&self, flag_type: ConfigurationFlagType) -> Option<bool> {
        self.flags
            .iter()
            .find(|flag| flag.flag_type == flag_type)
            .map(|flag| flag.enabled)
    }
}

/// Decode attribute 2; an unknown operation mode reads as `None`
pub fn read_configuration_object(value: &DataObject) -> DlmsResult<ConfigurationObject> {
    let elements = read_list(value, "configuration object")?;
    let [mode, flags] = elements else {
        return Err(DlmsError::decode(
            "configuration object",
            format!("expected the operation mode and flags, got {}", describe_value(value)),
        ));
    };
    let gprs_operation_mode = read_long(mode, "GPRS operation mode")?.and_then(GprsOperationMode::from_code);
    let bits = read_bit_string(flags, "configuration flags")?;
    let flags = ConfigurationFlagType::ALL
        .into_iter()
        .filter(|flag_type| flag_type.bit_position() < bits.num_bits())
        .map(|flag_type| {
            Ok(ConfigurationFlag {
                flag_type,
                enabled: bits.get_bit(flag_type.bit_position())?,
            })
        })
        .collect::<DlmsResult<Vec<_>>>()?;
    Ok(ConfigurationObject {
        gprs_operation_mode,
        flags,
    })
}

/// Requested flags overrule the device, unless they are not settable
fn merged_flags(requested: &ConfigurationObject, on_device: &ConfigurationObject) -> DlmsResult<BitString> {
    let mut bytes = vec![0u8; FLAG_BITS / 8];
    for flag_type in ConfigurationFlagType::ALL {
        let requested_value = if flag_type.is_settable() {
            requested.flag(flag_type)
        } else {
            None
        };
        if requested_value.or_else(|| on_device.flag(flag_type)).unwrap_or(false) {
            let position = flag_type.bit_position();
            bytes[position / 8] |= 0x80 >> (position % 8);
        }
    }
    BitString::new(bytes, FLAG_BITS)
}

fn configuration_data(requested: &ConfigurationObject, on_device: &ConfigurationObject) -> DlmsResult<DataObject> {
    let mut elements = Vec::with_capacity(2);
    if let Some(mode) = requested.gprs_operation_mode.or(on_device.gprs_operation_mode) {
        elements.push(DataObject::Enumerate(mode.code()));
    }
    elements.push(DataObject::BitString(merged_flags(requested, on_device)?));
    Ok(DataObject::Structure(elements))
}

/// Change the GPRS operation mode and flags, keeping what the request leaves out
pub struct SetConfigurationObjectCommand;

#[async_trait]
impl Command for SetConfigurationObjectCommand {
    type Input = ConfigurationObject;
    type Output = AccessResultCode;

    fn name(&self) -> &'static str {
        "SetConfigurationObject"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::SetConfigurationObject)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        requested: ConfigurationObject,
    ) -> DlmsResult<AccessResultCode> {
        let address = AttributeAddress::new(CLASS_ID, OBIS_CODE, ATTRIBUTE_ID);
        session.set_description(&format!(
            "SetConfigurationObject, retrieve attribute: {}",
            describe_attributes(std::slice::from_ref(&address))
        ));
        let results = get_and_check(
            session,
            device,
            "current configuration object",
            std::slice::from_ref(&address),
        )
        .await?;
        let on_device = read_configuration_object(&results[0].result_data)?;

        let data = configuration_data(&requested, &on_device)?;
        log::info!(
            "Writing configuration object of {}: {}",
            device.device_identification,
            describe_value(&data)
        );
        session.set_description(&format!(
            "SetConfigurationObject, set attribute: {}",
            describe_attributes(std::slice::from_ref(&address))
        ));
        session.set(&SetParameter::new(address, data)).await
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<ConfigurationObject> {
        match request {
            ActionRequest::SetConfigurationObject(configuration) => Ok(configuration.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: AccessResultCode) -> DlmsResult<ActionResponse> {
        check_access_result(output, "set configuration object")?;
        Ok(ActionResponse::ok("Set configuration object was successful"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::BundleCommand;
    use crate::test_support::FakeConnection;

    fn address() -> AttributeAddress {
        AttributeAddress::new(CLASS_ID, OBIS_CODE, ATTRIBUTE_ID)
    }

    fn current(mode: DataObject, flags: [u8; 2]) -> DataObject {
        DataObject::Structure(vec![
            mode,
            DataObject::BitString(BitString::new(flags.to_vec(), FLAG_BITS).unwrap()),
        ])
    }

    fn written(connection: &FakeConnection) -> Vec<DataObject> {
        let writes = connection.writes();
        assert_eq!(writes.len(), 1);
        writes[0].data.as_list().unwrap().to_vec()
    }

    #[test]
    fn test_read_all_flags_enabled() {
        let configuration = read_configuration_object(&current(DataObject::Enumerate(2), [0xff, 0xc0])).unwrap();
        assert_eq!(configuration.gprs_operation_mode, Some(GprsOperationMode::Triggered));
        assert_eq!(configuration.flags.len(), ConfigurationFlagType::ALL.len());
        assert!(configuration.flags.iter().all(|flag| flag.enabled));

        let unknown_mode = read_configuration_object(&current(DataObject::Enumerate(0), [0, 0])).unwrap();
        assert_eq!(unknown_mode.gprs_operation_mode, None);
    }

    #[tokio::test]
    async fn test_forbidden_flags_keep_device_value() {
        let connection = FakeConnection::new();
        connection.respond(&address(), current(DataObject::Enumerate(1), [0xff, 0xc0]));
        let mut device = Device::new("E0026000059790003");
        let requested = ConfigurationObject {
            gprs_operation_mode: Some(GprsOperationMode::AlwaysOn),
            flags: ConfigurationFlagType::ALL
                .into_iter()
                .filter(|flag_type| !flag_type.is_settable())
                .map(|flag_type| ConfigurationFlag {
                    flag_type,
                    enabled: false,
                })
                .collect(),
        };

        let code = SetConfigurationObjectCommand
            .execute(&mut connection.session(), &mut device, requested)
            .await
            .unwrap();

        assert_eq!(code, AccessResultCode::Success);
        assert_eq!(
            written(&connection),
            vec![
                DataObject::Enumerate(1),
                DataObject::BitString(BitString::new(vec![0xff, 0xc0], FLAG_BITS).unwrap()),
            ]
        );
    }

    #[tokio::test]
    async fn test_requested_flags_overrule_device() {
        let connection = FakeConnection::new();
        // discover on power on and PO enable set on the device
        connection.respond(&address(), current(DataObject::Enumerate(1), [0b0101_0000, 0]));
        let mut device = Device::new("E0026000059790003");
        let request = ActionRequest::SetConfigurationObject(ConfigurationObject {
            gprs_operation_mode: Some(GprsOperationMode::Triggered),
            flags: vec![
                ConfigurationFlag {
                    flag_type: ConfigurationFlagType::DiscoverOnPowerOn,
                    enabled: false,
                },
                ConfigurationFlag {
                    flag_type: ConfigurationFlagType::DynamicMbusAddress,
                    enabled: true,
                },
            ],
        });

        let response = SetConfigurationObjectCommand
            .execute_bundle_action(&mut connection.session(), &mut device, &request)
            .await
            .unwrap();

        assert_eq!(response, ActionResponse::ok("Set configuration object was successful"));
        assert_eq!(
            written(&connection),
            vec![
                DataObject::Enumerate(2),
                DataObject::BitString(BitString::new(vec![0b0011_0000, 0], FLAG_BITS).unwrap()),
            ]
        );
    }

    #[tokio::test]
    async fn test_mode_is_left_out_when_unknown_everywhere() {
        let connection = FakeConnection::new();
        connection.respond(&address(), current(DataObject::Null, [0, 0]));
        let mut device = Device::new("E0026000059790003");

        SetConfigurationObjectCommand
            .execute(&mut connection.session(), &mut device, ConfigurationObject::default())
            .await
            .unwrap();

        assert_eq!(
            written(&connection),
            vec![DataObject::BitString(BitString::new(vec![0, 0], FLAG_BITS).unwrap())]
        );
    }

    #[tokio::test]
    async fn test_rejected_write_is_bundle_fault() {
        let connection = FakeConnection::new();
        connection.respond(&address(), current(DataObject::Enumerate(1), [0, 0]));
        connection.set_result(&address(), AccessResultCode::ReadWriteDenied);
        let mut device = Device::new("E0026000059790003");
        let error = SetConfigurationObjectCommand
            .execute_bundle_action(
                &mut connection.session(),
                &mut device,
                &ActionRequest::SetConfigurationObject(ConfigurationObject::default()),
            )
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "AccessResultError");
    }
}
