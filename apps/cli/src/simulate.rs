use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use client_core::{
    location::{DeniedLocation, FixedLocation, LocationProvider},
    CommandRecorder, ControllerConfig, MapController,
};
use directory::DirectoryStore;
use shared::{
    domain::{CenterId, Coordinates},
    protocol::{MapCommand, MapEvent},
};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Event(MapEvent),
    Wait(Duration),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised step '{0}' (expected district:<name|all>, tap:<id>, card:<id>, locate, finish:<generation> or wait:<ms>)")]
pub struct StepParseError(String);

impl FromStr for Step {
    type Err = StepParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || StepParseError(raw.to_string());
        let (verb, arg) = match raw.split_once(':') {
            Some((verb, arg)) => (verb.trim(), Some(arg.trim())),
            None => (raw.trim(), None),
        };

        let step = match (verb, arg) {
            ("district", Some(name)) if name.eq_ignore_ascii_case("all") => {
                Step::Event(MapEvent::DistrictSelected { district: None })
            }
            ("district", Some(name)) if !name.is_empty() => Step::Event(MapEvent::DistrictSelected {
                district: Some(name.to_string()),
            }),
            ("tap", Some(id)) if !id.is_empty() => Step::Event(MapEvent::MarkerTapped {
                center_id: CenterId::from(id),
            }),
            ("card", Some(id)) if !id.is_empty() => Step::Event(MapEvent::CardTapped {
                center_id: CenterId::from(id),
            }),
            ("locate", None) => Step::Event(MapEvent::LocateMe),
            ("finish", Some(generation)) => Step::Event(MapEvent::AnimationFinished {
                generation: generation.parse().map_err(|_| invalid())?,
            }),
            ("wait", Some(ms)) => Step::Wait(Duration::from_millis(
                ms.parse().map_err(|_| invalid())?,
            )),
            _ => return Err(invalid()),
        };
        Ok(step)
    }
}

pub enum LocationScript {
    Fix(Coordinates),
    Denied,
}

/// Runs the script and returns every command in issue order.
pub async fn run(
    directory: Arc<DirectoryStore>,
    config: ControllerConfig,
    location: LocationScript,
    steps: Vec<Step>,
) -> anyhow::Result<Vec<MapCommand>> {
    let recorder = CommandRecorder::default();
    let mut controller = MapController::new(
        directory,
        Box::new(recorder.clone()),
        Box::new(recorder.clone()),
        config,
    );

    let provider: Box<dyn LocationProvider> = match location {
        LocationScript::Fix(point) => Box::new(FixedLocation(point)),
        LocationScript::Denied => Box::new(DeniedLocation),
    };
    controller.mount(provider.as_ref()).await;

    for step in steps {
        match step {
            Step::Wait(duration) => tokio::time::sleep(duration).await,
            Step::Event(event) => {
                let label = format!("{event:?}");
                if let Err(err) = controller.handle(event) {
                    warn!(error = %err, "event rejected");
                    return Err(err).with_context(|| format!("while handling {label}"));
                }
            }
        }
    }

    Ok(recorder.drain())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_step_kind() {
        assert_eq!(
            "district:Nashik".parse::<Step>(),
            Ok(Step::Event(MapEvent::DistrictSelected {
                district: Some("Nashik".into())
            }))
        );
        assert_eq!(
            "district:ALL".parse::<Step>(),
            Ok(Step::Event(MapEvent::DistrictSelected { district: None }))
        );
        assert_eq!(
            "card:16".parse::<Step>(),
            Ok(Step::Event(MapEvent::CardTapped {
                center_id: CenterId::from("16")
            }))
        );
        assert_eq!("locate".parse::<Step>(), Ok(Step::Event(MapEvent::LocateMe)));
        assert_eq!(
            "wait:1100".parse::<Step>(),
            Ok(Step::Wait(Duration::from_millis(1100)))
        );
        assert!("tap:".parse::<Step>().is_err());
        assert!("finish:x".parse::<Step>().is_err());
        assert!("zoom:3".parse::<Step>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn denied_location_then_district_frames_without_region_jump() {
        let directory = Arc::new(DirectoryStore::reference().expect("reference data"));
        let steps = vec![
            "district:Nashik".parse().expect("step"),
            "wait:1100".parse().expect("step"),
            "tap:16".parse().expect("step"),
        ];
        let commands = run(
            directory,
            ControllerConfig::default(),
            LocationScript::Denied,
            steps,
        )
        .await
        .expect("script runs");

        assert!(!commands
            .iter()
            .any(|c| matches!(c, MapCommand::AnimateToRegion { .. })));
        assert!(matches!(
            commands.last(),
            Some(MapCommand::ScrollToIndex { index: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_center_aborts_the_script() {
        let directory = Arc::new(DirectoryStore::reference().expect("reference data"));
        let err = run(
            directory,
            ControllerConfig::default(),
            LocationScript::Denied,
            vec!["tap:999".parse().expect("step")],
        )
        .await
        .expect_err("unknown center");
        assert!(err.to_string().contains("MarkerTapped"));
    }
}
