//! Command registry: bundle request kind to command

use crate::bundle::ActionRequestKind;
use crate::command::{BundleCommand, Command};
use crate::commands::{
    FindEventsCommand, GetAdministrativeStatusCommand, GetAssociationLnObjectsCommand, GetFirmwareVersionsCommand,
    GetPeriodicMeterReadsCommand, GetPeriodicMeterReadsGasCommand, GetPushSetupCommand, PushSetupKind,
    ReplaceKeyCommand, SetAlarmNotificationsCommand, SetClockConfigurationCommand, SetConfigurationObjectCommand,
    SetKeysCommand, SetPushSetupCommand, SetSpecialDaysCommand, SynchronizeTimeCommand,
};
use crate::repository::DeviceRepository;
use dlms_core::{DlmsError, DlmsResult};
use dlms_security::EncryptionService;
use std::collections::HashMap;
use std::sync::Arc;

/// Exactly one command per bundle request kind
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<ActionRequestKind, Arc<dyn BundleCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every bundle-capable command of the adapter
    pub fn with_default_commands(
        encryption: Arc<dyn EncryptionService>,
        repository: Arc<dyn DeviceRepository>,
    ) -> DlmsResult<Self> {
        let mut registry = Self::new();
        registry.register(GetAdministrativeStatusCommand)?;
        registry.register(SynchronizeTimeCommand)?;
        registry.register(SetClockConfigurationCommand)?;
        registry.register(SetSpecialDaysCommand)?;
        registry.register(SetAlarmNotificationsCommand)?;
        registry.register(GetPushSetupCommand::new(PushSetupKind::Alarm))?;
        registry.register(GetPushSetupCommand::new(PushSetupKind::Sms))?;
        registry.register(SetPushSetupCommand::new(PushSetupKind::Alarm))?;
        registry.register(SetPushSetupCommand::new(PushSetupKind::Sms))?;
        registry.register(FindEventsCommand)?;
        registry.register(GetPeriodicMeterReadsCommand)?;
        registry.register(GetPeriodicMeterReadsGasCommand)?;
        registry.register(GetAssociationLnObjectsCommand)?;
        registry.register(SetKeysCommand::new(ReplaceKeyCommand::new(encryption, repository)))?;
        registry.register(SetConfigurationObjectCommand)?;
        registry.register(GetFirmwareVersionsCommand)?;
        Ok(registry)
    }

    /// Register `command` under its request kind
    ///
    /// # Errors
    ///
    /// `DlmsError::Configuration` when the command cannot run in a bundle or
    /// another command already handles the same kind.
    pub fn register<C>(&mut self, command: C) -> DlmsResult<()>
    where
        C: Command + 'static,
    {
        let kind = Command::request_kind(&command).ok_or_else(|| {
            DlmsError::Configuration(format!(
                "{} cannot be registered, it does not handle bundle requests",
                Command::name(&command)
            ))
        })?;
        if let Some(existing) = self.commands.get(&kind) {
            return Err(DlmsError::Configuration(format!(
                "{} cannot be registered for {}, already handled by {}",
                Command::name(&command),
                kind,
                existing.name()
            )));
        }
        log::debug!("Registering {} for {}", Command::name(&command), kind);
        self.commands.insert(kind, Arc::new(command));
        Ok(())
    }

    pub fn get(&self, kind: ActionRequestKind) -> Option<Arc<dyn BundleCommand>> {
        self.commands.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ActivateActivityCalendarCommand;
    use crate::test_support::InMemoryDeviceRepository;
    use dlms_security::AesGcmEncryptionService;

    fn default_registry() -> CommandRegistry {
        let encryption = Arc::new(AesGcmEncryptionService::new(&[7u8; 16]).unwrap());
        let repository = Arc::new(InMemoryDeviceRepository::default());
        CommandRegistry::with_default_commands(encryption, repository).unwrap()
    }

    #[test]
    fn test_default_commands_cover_every_request() {
        let registry = default_registry();
        assert_eq!(registry.len(), 16);
        for kind in [
            ActionRequestKind::GetAdministrativeStatus,
            ActionRequestKind::GetPushSetupSms,
            ActionRequestKind::SetPushSetupAlarm,
            ActionRequestKind::GetPeriodicMeterReads,
            ActionRequestKind::GetPeriodicMeterReadsGas,
            ActionRequestKind::SetKeys,
            ActionRequestKind::SetConfigurationObject,
            ActionRequestKind::GetFirmwareVersions,
        ] {
            assert!(registry.get(kind).is_some(), "no command for {}", kind);
        }
        assert_eq!(
            registry.get(ActionRequestKind::GetPushSetupSms).unwrap().name(),
            "GetPushSetupSms"
        );
    }

    #[test]
    fn test_duplicate_kind_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(SynchronizeTimeCommand).unwrap();
        let error = registry.register(SynchronizeTimeCommand).unwrap_err();
        assert!(matches!(error, DlmsError::Configuration(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_standalone_command_is_rejected() {
        let mut registry = CommandRegistry::new();
        let error = registry.register(ActivateActivityCalendarCommand).unwrap_err();
        assert!(matches!(error, DlmsError::Configuration(_)));
        assert!(registry.is_empty());
    }
}
