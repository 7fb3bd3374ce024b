//! Command interpreter: executes recognised commands against the store.
//!
//! Recognition is the domain grammar ([`relayhub_domain::command`]); this
//! service performs the matching side effects and phrases the reply. Store
//! failures never escape: they are logged and answered with an apology.

use std::sync::Arc;

use relayhub_domain::command::{self, Command, Intent};
use relayhub_domain::device::Device;
use relayhub_domain::timer::{TimerAction, TimerDuration, format_clock};

use crate::ports::{RelayStore, SensorSource, TimerRepository};
use crate::services::relay_service::RelayService;
use crate::services::status_service::StatusService;
use crate::services::timer_scheduler::TimerScheduler;

pub const ALL_OFF_REPLY: &str = "All devices have been turned off! 🔌";
pub const ALL_OFF_FAILED: &str = "Sorry, I couldn't turn off all devices. Please try again.";
pub const ALL_ON_REPLY: &str = "All lights and fan have been turned on! ✨";
pub const ALL_ON_FAILED: &str = "Sorry, I couldn't turn on all devices. Please try again.";
pub const NO_TIMERS_REPLY: &str = "No active timers right now. ⏰";
pub const TIMERS_FAILED: &str = "Sorry, I couldn't check the timers. Please try again.";
pub const CANCEL_WHICH_DEVICE: &str =
    "Which device's timer should I cancel? Try \"cancel fan timer\" or \"cancel light 1 timer\".";

pub struct CommandInterpreter<T, S, Z> {
    relays: RelayService<S>,
    scheduler: Arc<TimerScheduler<T, S>>,
    status: StatusService<Z>,
}

impl<T, S, Z> CommandInterpreter<T, S, Z>
where
    T: TimerRepository,
    S: RelayStore,
    Z: SensorSource,
{
    pub fn new(
        relays: RelayService<S>,
        scheduler: Arc<TimerScheduler<T, S>>,
        status: StatusService<Z>,
    ) -> Self {
        Self {
            relays,
            scheduler,
            status,
        }
    }

    #[must_use]
    pub fn relays(&self) -> &RelayService<S> {
        &self.relays
    }

    #[must_use]
    pub fn status(&self) -> &StatusService<Z> {
        &self.status
    }

    /// Interpret and execute `text`.
    ///
    /// Returns `None` when no rule matched; the caller should then ask the
    /// language model.
    #[tracing::instrument(skip(self))]
    pub async fn handle(&self, text: &str) -> Option<String> {
        let Some((rule, command)) = command::interpret_with_rule(text) else {
            tracing::debug!("no command matched");
            return None;
        };
        tracing::info!(rule = rule.name, ?command, "command matched");
        Some(self.execute(command).await)
    }

    /// Perform `command` and phrase the outcome.
    pub async fn execute(&self, command: Command) -> String {
        match command {
            Command::AllOff => match self.relays.turn_all_off().await {
                Ok(()) => ALL_OFF_REPLY.to_string(),
                Err(err) => {
                    tracing::error!(%err, "failed to turn off all devices");
                    ALL_OFF_FAILED.to_string()
                }
            },
            Command::AllOn => match self.relays.turn_all_on().await {
                Ok(()) => ALL_ON_REPLY.to_string(),
                Err(err) => {
                    tracing::error!(%err, "failed to turn on all devices");
                    ALL_ON_FAILED.to_string()
                }
            },
            Command::WaterStatus => self.status.water_status().await,
            Command::SystemStatus => self.status.system_status().await,
            Command::Timed {
                device,
                duration,
                switch_on_now,
            } => self.timed(device, duration, switch_on_now).await,
            Command::TimerStatus => self.timer_status().await,
            Command::CancelTimer { device: None } => CANCEL_WHICH_DEVICE.to_string(),
            Command::CancelTimer {
                device: Some(device),
            } => self.cancel(device).await,
            Command::BothLights(intent) => {
                match self.relays.set_many(&Device::LIGHTS, intent.is_on()).await {
                    Ok(()) => format!("Both lights turned {} 💡💡", intent.shout()),
                    Err(err) => {
                        tracing::error!(%err, "failed to switch both lights");
                        format!(
                            "Sorry, I couldn't turn {} the lights. Please try again.",
                            lower(intent)
                        )
                    }
                }
            }
            Command::Switch { device, intent } => {
                match self.relays.set(device, intent.is_on()).await {
                    Ok(()) => format!(
                        "{} turned {} {}",
                        device.display_name(),
                        intent.shout(),
                        device.emoji()
                    ),
                    Err(err) => {
                        tracing::error!(relay = device.relay_key(), %err, "failed to switch device");
                        format!(
                            "Sorry, I couldn't turn {} {}. Please try again.",
                            lower(intent),
                            device.display_name()
                        )
                    }
                }
            }
        }
    }

    async fn timed(&self, device: Device, duration: TimerDuration, switch_on_now: bool) -> String {
        let name = device.display_name();
        let clock = format_clock(duration.total_seconds());
        if switch_on_now {
            if let Err(err) = self.relays.set(device, true).await {
                tracing::error!(relay = device.relay_key(), %err, "failed to switch device");
                return format!("Sorry, I couldn't turn on {name}. Please try again.");
            }
        }
        match self
            .scheduler
            .set_timer(device, duration, TimerAction::Off)
            .await
        {
            Ok(_) if switch_on_now => format!(
                "{name} turned ON {} and will turn OFF in {clock} ⏰",
                device.emoji()
            ),
            Ok(_) => format!("{name} will turn OFF in {clock} ⏰"),
            Err(_) => format!("Sorry, I couldn't set the timer for {name}. Please try again."),
        }
    }

    async fn timer_status(&self) -> String {
        match self.scheduler.active_timers().await {
            Ok(timers) if timers.is_empty() => NO_TIMERS_REPLY.to_string(),
            Ok(timers) => {
                let lines: Vec<String> = timers
                    .iter()
                    .map(|t| {
                        format!(
                            "* {}: turns {} in {}",
                            t.timer.device().display_name(),
                            t.timer.action.to_string().to_uppercase(),
                            t.remaining_clock()
                        )
                    })
                    .collect();
                format!("Active timers ⏰\n\n{}", lines.join("\n"))
            }
            Err(err) => {
                tracing::error!(%err, "failed to list timers");
                TIMERS_FAILED.to_string()
            }
        }
    }

    async fn cancel(&self, device: Device) -> String {
        let name = device.display_name();
        match self.scheduler.cancel_timer(device).await {
            Ok(true) => format!("Timer cancelled for {name} ⏰"),
            Ok(false) => format!("No active timer for {name}, nothing to cancel. ⏰"),
            Err(_) => format!("Sorry, I couldn't cancel the timer for {name}. Please try again."),
        }
    }
}

fn lower(intent: Intent) -> &'static str {
    if intent.is_on() { "on" } else { "off" }
}
