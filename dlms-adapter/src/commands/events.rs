//! Event logs (profile generic, interface class 7)
//!
//! Each log is read with a range selection on the clock, so only entries
//! captured between the query bounds are returned. An entry is
//! `{clock, event code}`, followed by an event counter in the logs that
//! capture one.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{as_data_object, describe_attributes, describe_value, read_date_time, read_list, read_long, read_long_not_null};
use crate::command::{get_and_check, unexpected_request, Command};
use crate::commands::clock_capture_definition;
use crate::device::Device;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use dlms_client::{AttributeAddress, DeviceSession, SelectiveAccessDescription};
use dlms_core::{DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};
use std::fmt;

const CLASS_ID: u16 = 7;
const ATTRIBUTE_ID: i8 = 2;
const RANGE_DESCRIPTOR: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventLogCategory {
    StandardEventLog,
    FraudDetectionLog,
    CommunicationSessionLog,
    MBusEventLog,
}

impl EventLogCategory {
    pub fn logical_name(&self) -> ObisCode {
        match self {
            EventLogCategory::StandardEventLog => ObisCode::new(0, 0, 99, 98, 0, 255),
            EventLogCategory::FraudDetectionLog => ObisCode::new(0, 0, 99, 98, 1, 255),
            EventLogCategory::CommunicationSessionLog => ObisCode::new(0, 0, 99, 98, 4, 255),
            EventLogCategory::MBusEventLog => ObisCode::new(0, 0, 99, 98, 3, 255),
        }
    }
}

impl fmt::Display for EventLogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventLogCategory::StandardEventLog => "STANDARD_EVENT_LOG",
            EventLogCategory::FraudDetectionLog => "FRAUD_DETECTION_LOG",
            EventLogCategory::CommunicationSessionLog => "COMMUNICATION_SESSION_LOG",
            EventLogCategory::MBusEventLog => "M_BUS_EVENT_LOG",
        };
        f.write_str(name)
    }
}

/// Events of one log captured between `from` and `until`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindEventsQuery {
    pub category: EventLogCategory,
    pub from: DateTime<FixedOffset>,
    pub until: DateTime<FixedOffset>,
}

/// One log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<FixedOffset>,
    pub event_code: i64,
    /// Only present in logs that capture an event counter
    pub event_counter: Option<i64>,
    pub category: EventLogCategory,
}

/// Read the entries of one event log within a time range
pub struct FindEventsCommand;

fn range_selection(from: &DateTime<FixedOffset>, until: &DateTime<FixedOffset>) -> DlmsResult<SelectiveAccessDescription> {
    let parameter = DataObject::Structure(vec![
        clock_capture_definition(),
        as_data_object(from)?,
        as_data_object(until)?,
        // All captured objects
        DataObject::Array(Vec::new()),
    ]);
    Ok(SelectiveAccessDescription::new(RANGE_DESCRIPTOR, parameter))
}

fn read_events(buffer: &DataObject, category: EventLogCategory) -> DlmsResult<Vec<Event>> {
    let context = format!("{} buffer", category);
    let mut events = Vec::new();
    for entry in read_list(buffer, &context)? {
        let elements = match entry {
            DataObject::Structure(elements) if elements.len() >= 2 => elements,
            other => {
                return Err(DlmsError::decode(
                    context.as_str(),
                    format!("expected an event structure, got {}", describe_value(other)),
                ));
            }
        };
        let Some(timestamp) = read_date_time(&elements[0], &format!("Clock from {}", context))? else {
            log::warn!(
                "Skipping event from {} without usable time: {}",
                category,
                describe_value(&elements[0])
            );
            continue;
        };
        let event_code = read_long_not_null(&elements[1], &format!("Event code from {}", context))?;
        let event_counter = match elements.get(2) {
            Some(counter) => read_long(counter, &format!("Event counter from {}", context))?,
            None => None,
        };
        events.push(Event {
            timestamp,
            event_code,
            event_counter,
            category,
        });
    }
    Ok(events)
}

#[async_trait]
impl Command for FindEventsCommand {
    type Input = FindEventsQuery;
    type Output = Vec<Event>;

    fn name(&self) -> &'static str {
        "FindEvents"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::FindEvents)
    }

    async fn execute(&self, session: &mut DeviceSession, device: &mut Device, query: FindEventsQuery) -> DlmsResult<Vec<Event>> {
        let address = AttributeAddress::new(CLASS_ID, query.category.logical_name(), ATTRIBUTE_ID)
            .with_selective_access(range_selection(&query.from, &query.until)?);
        session.set_description(&format!(
            "RetrieveEvents for {} from {} until {}, retrieve attribute: {}",
            query.category,
            query.from.to_rfc3339(),
            query.until.to_rfc3339(),
            describe_attributes(std::slice::from_ref(&address))
        ));

        let description = format!("events for {}", query.category);
        let results = get_and_check(session, device, &description, &[address]).await?;
        let events = read_events(&results[0].result_data, query.category)?;
        log::debug!(
            "Found {} events in {} of {}",
            events.len(),
            query.category,
            device.device_identification
        );
        Ok(events)
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<FindEventsQuery> {
        match request {
            ActionRequest::FindEvents(query) => Ok(query.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: Vec<Event>) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::Events(output))
    }
}
